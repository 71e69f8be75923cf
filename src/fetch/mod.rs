//! HTTP fetching and canonical URL resolution.
//!
//! This module provides:
//! - Per-call request options and request bodies
//! - The request executor (one request, redirects followed, body sniffed)
//! - The canonical URL resolver built on the same request path
//!
//! Every failure leaves this module as an [`ErrorReport`](crate::ErrorReport);
//! nothing is raised past it.

mod canonical;
mod options;
mod request;

// Re-export public API
pub use canonical::{verify_landing, CanonicalResolver, Verdict};
pub use options::{RequestBody, RequestOptions};
pub use request::{FetchResult, RequestExecutor};
