//! Shared building blocks for the Stratus control plane.
//!
//! - [`context`]: the per-request identity every service call carries.
//! - [`config`]: runtime settings loaded from TOML and the environment.

pub mod config;
pub mod context;

pub use config::{ConfigError, SharedConfig, StratusConfig};
pub use context::RequestContext;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
