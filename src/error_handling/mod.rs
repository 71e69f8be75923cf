//! Error handling and failure classification.
//!
//! This module provides:
//! - Failure and error report type definitions
//! - Categorization of `reqwest` errors and HTTP statuses
//! - The error classifier that turns failures into leveled reports
//! - Notification sinks and work lookup collaborators
//!
//! Reports are categorized into:
//! - **Not found**: canonical mismatch, unresolved DOI, or a plain 404
//! - **Timeout**: the request ran out of time (warning)
//! - **Upstream**: any other non-2xx response or transport failure

mod categorization;
mod classifier;
mod notify;
mod types;

// Re-export public API
pub use categorization::{
    categorize_reqwest_error, class_by_status, level_by_status, parse_error_response,
};
pub use classifier::ErrorClassifier;
pub use notify::{LogSink, MemorySink, NoopSink, Notification, NotificationSink, Work, WorkLookup};
pub use types::{
    ErrorKind, ErrorReport, FailureKind, FailureResponse, FetchFailure, InitializationError, Level,
    NotifyError,
};
