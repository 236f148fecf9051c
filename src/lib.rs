//! Ordered String Map - a thread-safe map that remembers recency
//!
//! This library provides a string-keyed map whose key order follows the
//! last insert or update of each key, together with JSON serialization,
//! environment-driven configuration and a small line shell used by the
//! `osm` binary.

pub mod config;
pub mod error;
pub mod logging;
pub mod map;
pub mod shell;

// Re-export commonly used types
pub use config::{LoggingConfig, MapConfig};
pub use error::{MapError, Result};
pub use map::OrderedStringMap;
