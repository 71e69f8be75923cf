//! Configuration constants.
//!
//! Defaults for timeouts, redirect handling and content negotiation. These are
//! only defaults: the values actually used by a request come from
//! [`ClientSettings`](crate::config::ClientSettings) and the per-call
//! [`RequestOptions`](crate::fetch::RequestOptions).

/// Name used in the outbound `User-Agent` header.
pub const APP_NAME: &str = "doi_landing";

/// Default timeout in seconds for a single request, redirects included.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// Redirect handling
/// Maximum number of redirect hops to follow
/// Prevents infinite redirect loops and excessive request chains
pub const MAX_REDIRECT_HOPS: usize = 10;

// Content negotiation
/// `Accept` header sent when markup (HTML) is expected.
pub const ACCEPT_MARKUP: &str = "text/html; charset=UTF-8";
/// `Accept` header sent when structured data (JSON) is expected.
pub const ACCEPT_STRUCTURED: &str = "application/json";

/// Hostname used in the `User-Agent` when none is configured.
pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Default number of URLs resolved at the same time by batch resolution.
pub const DEFAULT_CONCURRENCY: usize = 8;

// Error report limits
/// Maximum length in characters of the response body kept as `details`
/// on an error report. Longer bodies are truncated with a note.
pub const MAX_DETAILS_LENGTH: usize = 2000;
