//! Utility functions.
//!
//! This module provides:
//! - Canonical URL normalization and comparison helpers
//! - CSS selector parsing utilities

pub mod normalize;
mod selector;

pub use normalize::{contains_digit, normalize_final_url, normalize_hint, path_and_query};
pub use selector::parse_selector_with_fallback;
