//! Configuration module.
//!
//! This module contains all configuration-related code:
//! - `constants`: Operational constants (timeouts, limits, tunable thresholds)
//! - `types`: Configuration types (Config struct, enums)

pub mod constants;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, NotifyConfig, SortBy};
