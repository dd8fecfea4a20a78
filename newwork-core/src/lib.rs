//! Newwork Core - shared foundation for the Newwork client stack
//!
//! Error taxonomy, configuration, logging, async helpers and the session/role types
//! shared by the request layer and its consumers.

pub mod async_utils;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use async_utils::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tokio;
pub use tracing;
