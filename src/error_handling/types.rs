//! Error type definitions.
//!
//! This module defines the failure values produced while fetching, the error
//! reports they are classified into, and the errors of the crate's own setup.

use log::SetLoggerError;
use serde::{Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumIter as EnumIterMacro};
use thiserror::Error;

/// Error types for initialization failures.
///
/// HTTP clients are built per request, so their construction errors surface
/// as [`FetchFailure`]s of kind [`FailureKind::Builder`] instead.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error returned by a [`NotificationSink`](crate::NotificationSink).
///
/// These never reach the caller of the executor or resolver; they are logged
/// and dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The sink could not be reached.
    #[error("notification sink unavailable: {0}")]
    Unavailable(String),
}

/// What went wrong while issuing a request.
///
/// Decided once, where the failure happens. The variant name doubles as the
/// class name of an error report whose status has no canonical label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
pub enum FailureKind {
    /// The server answered 404.
    NotFound,
    /// The request (redirects included) exceeded its timeout.
    Timeout,
    /// The server answered with any other non-2xx status.
    HttpStatus,
    /// The connection could not be established.
    Connection,
    /// The redirect chain was too long or invalid.
    Redirect,
    /// The request could not be sent.
    Request,
    /// The response body could not be read.
    Body,
    /// The response body could not be decoded.
    Decode,
    /// The HTTP client or request could not be built.
    Builder,
    /// The URL could not be parsed.
    InvalidUrl,
    /// A request option (header, credentials) was invalid.
    InvalidArgument,
    /// Anything else.
    Other,
}

/// The response attached to a failure, when there was one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureResponse {
    /// HTTP status of the response.
    pub status: u16,
    /// Raw response body.
    pub body: String,
    /// Message attached by the code that raised the failure, if any.
    pub message: Option<String>,
}

/// A failed fetch, before classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct FetchFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Status carried by the failure itself (not by a nested response).
    pub status: Option<u16>,
    /// Response the failure was raised for, if any.
    pub response: Option<FailureResponse>,
    /// Failure message; for status failures this is the response body.
    pub message: String,
    /// Text of the underlying error, if the failure wraps one.
    pub exception: Option<String>,
}

impl FetchFailure {
    /// Creates a failure of the given kind with a message and nothing else.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            response: None,
            message: message.into(),
            exception: None,
        }
    }

    /// A "resource not found" failure for the given response.
    pub fn not_found(response: FailureResponse) -> Self {
        let message = response
            .message
            .clone()
            .unwrap_or_else(|| "the server responded with status 404".to_string());
        Self {
            kind: FailureKind::NotFound,
            status: None,
            response: Some(response),
            message,
            exception: None,
        }
    }

    /// A failure for a non-2xx response.
    ///
    /// 404 becomes [`FailureKind::NotFound`]; everything else is
    /// [`FailureKind::HttpStatus`]. The body becomes the failure message so the
    /// classifier can pull an `error` field out of it.
    pub fn from_status(status: u16, body: String) -> Self {
        let message = if body.trim().is_empty() {
            format!("the server responded with status {status}")
        } else {
            body.clone()
        };
        let response = FailureResponse {
            status,
            body,
            message: None,
        };
        if status == 404 {
            return Self::not_found(FailureResponse {
                message: Some(message),
                ..response
            });
        }
        Self {
            kind: FailureKind::HttpStatus,
            status: None,
            response: Some(response),
            message,
            exception: None,
        }
    }

    /// Sets the underlying exception text.
    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    /// Sets the status carried by the failure itself.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Category of an [`ErrorReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIterMacro, Display)]
pub enum ErrorKind {
    /// The canonical URL declared by the document disagrees with the fetched URL.
    NotFoundMismatch,
    /// The target is not an article landing page or could not be fetched while resolving.
    NotFoundUnresolved,
    /// The upstream answered 404 for a reason unrelated to DOI resolution.
    NotFoundGeneric,
    /// The request exceeded its timeout.
    Timeout,
    /// Any other non-2xx response or transport failure.
    UpstreamError,
}

/// Severity of an [`ErrorReport`]. Serialized as its numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Transient problem (timeouts, gateway errors).
    Warning = 2,
    /// Everything else.
    Error = 3,
}

impl Level {
    /// Numeric severity: 2 for warnings, 3 for errors.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// Structured, leveled description of a failed call.
///
/// Built once by the [`ErrorClassifier`](crate::ErrorClassifier) and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Human-readable message.
    pub error: String,
    /// HTTP-style status code.
    pub status: u16,
    /// Category of the failure.
    pub kind: ErrorKind,
    /// Text of the underlying error; empty when there was none.
    pub exception: String,
    /// Label of the failure category, e.g. `ServiceUnavailable`.
    pub class_name: String,
    /// Raw response body snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Severity.
    pub level: Level,
    /// URL the failing call was made for.
    pub target_url: String,
    /// Work id passed through from the request options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_id: Option<String>,
    /// Agent id passed through from the request options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (status {})", self.error, self.status)
    }
}

impl std::error::Error for ErrorReport {}
