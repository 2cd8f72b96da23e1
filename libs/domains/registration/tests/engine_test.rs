//! Engine tests for the registration/waitlist state machine.
//!
//! These run the real services against the in-memory repositories (which
//! share state across clones) and check the properties the engine guarantees:
//! the capacity invariant, FIFO promotion, single pair membership, and
//! position monotonicity - including under concurrent registration traffic.

use domain_registration::{
    CreateRegistrationEvent, CreateUser, EventService, InMemoryRegistrationEventRepository,
    InMemoryRegistrationRepository, InMemoryUserRepository, InMemoryWaitlistRepository,
    RegistrationError, RegistrationEventRepository, RegistrationRepository, RegistrationService,
    UserService, WaitlistRepository,
};

type Engine = RegistrationService<
    InMemoryUserRepository,
    InMemoryRegistrationEventRepository,
    InMemoryRegistrationRepository,
    InMemoryWaitlistRepository,
>;

/// Test fixture holding the services plus repository handles for assertions.
/// In-memory repositories share state across clones, so the handles observe
/// everything the services do.
struct Harness {
    users: UserService<InMemoryUserRepository>,
    events: EventService<InMemoryRegistrationEventRepository>,
    engine: Engine,
    event_repo: InMemoryRegistrationEventRepository,
    registration_repo: InMemoryRegistrationRepository,
    waitlist_repo: InMemoryWaitlistRepository,
}

impl Harness {
    fn new() -> Self {
        let users = InMemoryUserRepository::new();
        let events = InMemoryRegistrationEventRepository::new();
        let registrations = InMemoryRegistrationRepository::new();
        let waitlist = InMemoryWaitlistRepository::new();

        Self {
            users: UserService::new(users.clone()),
            events: EventService::new(events.clone()),
            engine: RegistrationService::new(
                users,
                events.clone(),
                registrations.clone(),
                waitlist.clone(),
            ),
            event_repo: events,
            registration_repo: registrations,
            waitlist_repo: waitlist,
        }
    }

    async fn add_user(&self, user_id: &str) {
        self.users
            .create_user(CreateUser {
                user_id: user_id.to_string(),
                name: format!("User {user_id}"),
            })
            .await
            .unwrap();
    }

    async fn add_event(&self, event_id: &str, capacity: i64, has_waitlist: bool) {
        self.events
            .create_event(CreateRegistrationEvent {
                event_id: Some(event_id.to_string()),
                name: Some("RustConf".to_string()),
                capacity,
                has_waitlist: Some(has_waitlist),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    async fn active_count(&self, event_id: &str) -> i64 {
        self.event_repo
            .active_count(event_id)
            .await
            .unwrap()
            .expect("event exists")
    }
}

#[tokio::test]
async fn test_active_registrations_never_exceed_capacity() {
    let h = Harness::new();
    h.add_event("e1", 3, true).await;
    for i in 0..6 {
        h.add_user(&format!("u{i}")).await;
    }

    for i in 0..6 {
        h.engine.register(&format!("u{i}"), "e1").await.unwrap();
    }

    assert_eq!(h.active_count("e1").await, 3);
    assert_eq!(
        h.registration_repo.count_active_by_event("e1").await.unwrap(),
        3
    );

    // Churn: every unregistration of an active user promotes a waiting one,
    // so the count stays pinned at capacity while anyone is queued.
    h.engine.unregister("u0", "e1").await.unwrap();
    h.engine.unregister("u1", "e1").await.unwrap();
    assert_eq!(h.active_count("e1").await, 3);

    // Queue drained: seats finally free up
    h.engine.unregister("u2", "e1").await.unwrap();
    h.engine.unregister("u3", "e1").await.unwrap();
    assert_eq!(h.active_count("e1").await, 2);
    assert_eq!(
        h.registration_repo.count_active_by_event("e1").await.unwrap(),
        2
    );
}

#[tokio::test]
async fn test_waitlist_promotes_in_fifo_order() {
    let h = Harness::new();
    h.add_event("e1", 1, true).await;
    for name in ["alice", "bob", "carol", "dave"] {
        h.add_user(name).await;
    }

    h.engine.register("alice", "e1").await.unwrap();
    let bob = h.engine.register("bob", "e1").await.unwrap();
    let carol = h.engine.register("carol", "e1").await.unwrap();
    let dave = h.engine.register("dave", "e1").await.unwrap();

    assert_eq!(bob.waitlist_entry.unwrap().position, 1);
    assert_eq!(carol.waitlist_entry.unwrap().position, 2);
    assert_eq!(dave.waitlist_entry.unwrap().position, 3);

    let result = h.engine.unregister("alice", "e1").await.unwrap();
    assert_eq!(result.promoted.unwrap().user_id, "bob");

    let result = h.engine.unregister("bob", "e1").await.unwrap();
    assert_eq!(result.promoted.unwrap().user_id, "carol");

    let result = h.engine.unregister("carol", "e1").await.unwrap();
    assert_eq!(result.promoted.unwrap().user_id, "dave");

    let result = h.engine.unregister("dave", "e1").await.unwrap();
    assert!(result.promoted.is_none());
    assert_eq!(h.active_count("e1").await, 0);
}

#[tokio::test]
async fn test_user_is_never_active_and_waitlisted_at_once() {
    let h = Harness::new();
    h.add_event("e1", 1, true).await;
    h.add_user("alice").await;
    h.add_user("bob").await;

    h.engine.register("alice", "e1").await.unwrap();
    h.engine.register("bob", "e1").await.unwrap();

    assert!(!h.engine.is_user_registered("bob", "e1").await.unwrap());
    assert!(h.engine.is_user_waitlisted("bob", "e1").await.unwrap());

    h.engine.unregister("alice", "e1").await.unwrap();

    assert!(h.engine.is_user_registered("bob", "e1").await.unwrap());
    assert!(!h.engine.is_user_waitlisted("bob", "e1").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let h = Harness::new();
    h.add_event("e1", 1, true).await;
    h.add_user("alice").await;
    h.add_user("bob").await;

    h.engine.register("alice", "e1").await.unwrap();
    let result = h.engine.register("alice", "e1").await;
    assert!(matches!(result, Err(RegistrationError::Duplicate(_))));

    // Same rule for a waitlisted pair
    h.engine.register("bob", "e1").await.unwrap();
    let result = h.engine.register("bob", "e1").await;
    assert!(matches!(result, Err(RegistrationError::Duplicate(_))));
}

#[tokio::test]
async fn test_full_event_without_waitlist_rejects_registration() {
    let h = Harness::new();
    h.add_event("e1", 1, false).await;
    h.add_user("alice").await;
    h.add_user("bob").await;

    h.engine.register("alice", "e1").await.unwrap();
    let result = h.engine.register("bob", "e1").await;
    assert!(matches!(result, Err(RegistrationError::Capacity(_))));

    // The rejection must leave no trace
    assert_eq!(h.waitlist_repo.max_position("e1").await.unwrap(), None);
    assert_eq!(h.active_count("e1").await, 1);
    assert!(!h.engine.is_user_waitlisted("bob", "e1").await.unwrap());
}

#[tokio::test]
async fn test_promotion_transfers_the_freed_seat() {
    let h = Harness::new();
    h.add_event("e1", 2, true).await;
    for name in ["alice", "bob", "carol"] {
        h.add_user(name).await;
    }

    h.engine.register("alice", "e1").await.unwrap();
    h.engine.register("bob", "e1").await.unwrap();
    h.engine.register("carol", "e1").await.unwrap();
    assert_eq!(h.active_count("e1").await, 2);

    let result = h.engine.unregister("alice", "e1").await.unwrap();
    assert_eq!(result.promoted.unwrap().user_id, "carol");

    // The seat moved, it was never freed
    assert_eq!(h.active_count("e1").await, 2);
    assert!(h.engine.is_user_registered("carol", "e1").await.unwrap());
    assert_eq!(h.waitlist_repo.max_position("e1").await.unwrap(), None);
}

#[tokio::test]
async fn test_unregister_unknown_pair_is_not_found() {
    let h = Harness::new();
    h.add_event("e1", 1, true).await;
    h.add_user("alice").await;

    let result = h.engine.unregister("alice", "e1").await;
    assert!(matches!(result, Err(RegistrationError::NotFound(_))));
}

#[tokio::test]
async fn test_leaving_the_waitlist_does_not_touch_seats() {
    let h = Harness::new();
    h.add_event("e1", 1, true).await;
    h.add_user("alice").await;
    h.add_user("bob").await;

    h.engine.register("alice", "e1").await.unwrap();
    h.engine.register("bob", "e1").await.unwrap();

    let result = h.engine.unregister("bob", "e1").await.unwrap();
    assert_eq!(result.message, "Successfully removed from waitlist");
    assert!(result.promoted.is_none());
    assert_eq!(h.active_count("e1").await, 1);

    // With the queue drained the next unregistration releases the seat
    let result = h.engine.unregister("alice", "e1").await.unwrap();
    assert!(result.promoted.is_none());
    assert_eq!(h.active_count("e1").await, 0);
}

#[tokio::test]
async fn test_waitlist_positions_are_never_reused() {
    let h = Harness::new();
    h.add_event("e1", 1, true).await;
    for name in ["alice", "bob", "carol", "dave"] {
        h.add_user(name).await;
    }

    h.engine.register("alice", "e1").await.unwrap();
    let bob = h.engine.register("bob", "e1").await.unwrap();
    let carol = h.engine.register("carol", "e1").await.unwrap();
    assert_eq!(bob.waitlist_entry.unwrap().position, 1);
    assert_eq!(carol.waitlist_entry.unwrap().position, 2);

    // Bob leaves; his position must not be handed out again
    h.engine.unregister("bob", "e1").await.unwrap();
    let dave = h.engine.register("dave", "e1").await.unwrap();
    assert_eq!(dave.waitlist_entry.unwrap().position, 3);

    // Promotion order across the gap: carol (2) before dave (3)
    let result = h.engine.unregister("alice", "e1").await.unwrap();
    assert_eq!(result.promoted.unwrap().user_id, "carol");
    let result = h.engine.unregister("carol", "e1").await.unwrap();
    assert_eq!(result.promoted.unwrap().user_id, "dave");
}

#[tokio::test]
async fn test_get_user_registrations_lists_only_active_events() {
    let h = Harness::new();
    h.add_event("conf", 2, true).await;
    h.add_event("meetup", 2, true).await;
    h.add_event("full", 1, true).await;
    h.add_user("alice").await;
    h.add_user("bob").await;

    h.engine.register("bob", "full").await.unwrap();
    h.engine.register("alice", "conf").await.unwrap();
    h.engine.register("alice", "meetup").await.unwrap();
    h.engine.register("alice", "full").await.unwrap(); // waitlisted

    let mut event_ids: Vec<String> = h
        .engine
        .get_user_registrations("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|event| event.event_id)
        .collect();
    event_ids.sort();

    assert_eq!(event_ids, vec!["conf".to_string(), "meetup".to_string()]);
}

#[tokio::test]
async fn test_get_user_registrations_is_empty_for_known_idle_user() {
    let h = Harness::new();
    h.add_user("alice").await;

    // A known user with no registrations gets an empty list; only an unknown
    // user is an error.
    let events = h.engine.get_user_registrations("alice").await.unwrap();
    assert!(events.is_empty());

    let result = h.engine.get_user_registrations("ghost").await;
    assert!(matches!(result, Err(RegistrationError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_registrations_never_oversell() {
    const CAPACITY: i64 = 5;
    const CONTENDERS: usize = 20;

    let h = Harness::new();
    h.add_event("e1", CAPACITY, true).await;
    for i in 0..CONTENDERS {
        h.add_user(&format!("u{i}")).await;
    }

    let mut handles = Vec::with_capacity(CONTENDERS);
    for i in 0..CONTENDERS {
        let engine = h.engine.clone();
        handles.push(tokio::spawn(async move {
            engine.register(&format!("u{i}"), "e1").await
        }));
    }

    let mut admitted = 0;
    let mut positions = Vec::new();
    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        match (result.registration, result.waitlist_entry) {
            (Some(_), None) => admitted += 1,
            (None, Some(entry)) => positions.push(entry.position),
            other => panic!("result must be a seat or a placement, got {:?}", other),
        }
    }

    assert_eq!(admitted, CAPACITY);
    assert_eq!(positions.len(), CONTENDERS - CAPACITY as usize);
    assert_eq!(h.active_count("e1").await, CAPACITY);
    assert_eq!(
        h.registration_repo.count_active_by_event("e1").await.unwrap(),
        CAPACITY as u64
    );

    // Every position handed out exactly once, in 1..=N
    positions.sort_unstable();
    let expected: Vec<i64> = (1..=positions.len() as i64).collect();
    assert_eq!(positions, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_registrations_without_waitlist_reject_overflow() {
    const CAPACITY: i64 = 3;
    const CONTENDERS: usize = 10;

    let h = Harness::new();
    h.add_event("e1", CAPACITY, false).await;
    for i in 0..CONTENDERS {
        h.add_user(&format!("u{i}")).await;
    }

    let mut handles = Vec::with_capacity(CONTENDERS);
    for i in 0..CONTENDERS {
        let engine = h.engine.clone();
        handles.push(tokio::spawn(async move {
            engine.register(&format!("u{i}"), "e1").await
        }));
    }

    let mut admitted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(result) => {
                assert!(result.registration.is_some());
                admitted += 1;
            }
            Err(RegistrationError::Capacity(_)) => rejected += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(admitted, CAPACITY);
    assert_eq!(rejected, CONTENDERS - CAPACITY as usize);
    assert_eq!(h.active_count("e1").await, CAPACITY);
    assert_eq!(h.waitlist_repo.max_position("e1").await.unwrap(), None);
}
