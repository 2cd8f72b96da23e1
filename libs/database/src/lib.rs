//! MongoDB connectivity for the events platform.
//!
//! Everything a service binary needs to talk to the document store:
//!
//! - [`MongoConfig`]: connection settings, loadable from environment variables
//! - [`connect`] / [`connect_from_config`]: verified connections (plus
//!   `_with_retry` variants for startup resilience)
//! - [`check_health`] / [`check_health_detailed`]: readiness probes
//! - [`RetryConfig`] / [`retry_with_backoff`]: exponential backoff with jitter
//!
//! # Example
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::from_env()?;
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

mod config;
mod connector;
mod health;
mod retry;

pub use config::MongoConfig;
pub use connector::{
    MongoError, connect, connect_from_config, connect_from_config_with_retry, connect_with_retry,
};
pub use health::{HealthStatus, check_health, check_health_detailed};
pub use retry::{RetryConfig, retry, retry_with_backoff};
