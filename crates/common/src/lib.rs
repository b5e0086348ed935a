//! Paircast Common Utilities
//!
//! Shared infrastructure for all Paircast crates:
//! - Error types and result aliases
//! - Frame pacing utilities for the draw and capture timers
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod ticker;

pub use config::*;
pub use error::*;
pub use ticker::*;
