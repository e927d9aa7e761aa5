//! Service configuration.
//!
//! - Configuration types with serde support
//! - YAML file loading
//! - Validation that collects all errors

mod loader;
pub mod types;
mod validation;

pub use types::{CacheSettings, RateLimitConfig, RpcConfig};
pub use validation::validate_config;
