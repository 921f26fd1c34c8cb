//! Service configuration
//!
//! `ServiceConfig` holds every tunable of the service with the defaults from
//! `utils::constants`. Build one with `ServiceConfig::builder()` or load it
//! from `TOPIC_FACES_*` environment variables with `ServiceConfig::from_env()`.

pub mod builder;
pub mod env;
pub mod getters;
pub mod types;

pub use builder::ServiceConfigBuilder;
pub use types::{ConfigError, ServiceConfig};
