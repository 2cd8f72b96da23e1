//! Shared test utilities for domain testing
//!
//! Provides `TestMongo`, a MongoDB container wrapper with automatic cleanup
//! and per-test database isolation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::TestMongo;
//!
//! #[tokio::test]
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let db = mongo.database("my_mongo_test");
//! }
//! ```

mod mongo;

pub use mongo::TestMongo;
