//! doi_landing library: DOI landing page resolution and HTTP failure reporting
//!
//! This library provides a request executor that sniffs response bodies
//! (structured data, markup or raw text), a resolver that checks a DOI's
//! landing page against the canonical URL the page declares, and a classifier
//! that turns every failure into a leveled [`ErrorReport`].
//!
//! # Example
//!
//! ```no_run
//! use doi_landing::{CanonicalResolver, ClientSettings, ErrorClassifier, RequestOptions};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let resolver = CanonicalResolver::new(
//!     ClientSettings::new("example.org"),
//!     ErrorClassifier::default(),
//! );
//!
//! match resolver
//!     .resolve("https://doi.org/10.1371/journal.pone.0000001", &RequestOptions::default())
//!     .await
//! {
//!     Ok(url) => println!("verified {url}"),
//!     Err(report) => eprintln!("{} (level {})", report, report.level.as_u8()),
//! }
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
mod error_handling;
mod fetch;
pub mod initialization;
mod parse;
pub mod utils;

// Re-export public API
pub use config::{ClientSettings, Config, ContentType, LogFormat, LogLevel};
pub use error_handling::{
    ErrorClassifier, ErrorKind, ErrorReport, FailureKind, FailureResponse, FetchFailure,
    InitializationError, Level, LogSink, MemorySink, NoopSink, Notification, NotificationSink,
    NotifyError, Work, WorkLookup,
};
pub use fetch::{
    verify_landing, CanonicalResolver, FetchResult, RequestBody, RequestExecutor, RequestOptions,
    Verdict,
};
pub use parse::{sniff, Content, ContentKind, MarkupDocument, MarkupElement};
