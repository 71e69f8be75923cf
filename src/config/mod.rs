//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, redirect limit, accept headers)
//! - Client settings injected into the executor and resolver
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    ClientSettings, Command, Config, ContentType, LogFormat, LogLevel, RequestArgs,
};
