//! Failure categorization.
//!
//! Maps `reqwest` errors to [`FailureKind`]s, statuses to class labels and
//! severities, and error bodies to messages.

use super::types::{FailureKind, FetchFailure, Level};
use crate::parse::sniff;

/// Categorizes a `reqwest::Error` into a [`FailureKind`].
///
/// Timeouts are checked first: reqwest also flags a timed out request as a
/// request or body error, and the timeout is what the classifier cares about.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> FailureKind {
    if error.is_timeout() {
        return FailureKind::Timeout;
    }

    if let Some(status) = error.status() {
        if status.as_u16() == 404 {
            return FailureKind::NotFound;
        }
        return FailureKind::HttpStatus;
    }

    if error.is_builder() {
        FailureKind::Builder
    } else if error.is_redirect() {
        FailureKind::Redirect
    } else if error.is_connect() {
        FailureKind::Connection
    } else if error.is_body() {
        FailureKind::Body
    } else if error.is_decode() {
        FailureKind::Decode
    } else if error.is_request() {
        FailureKind::Request
    } else {
        FailureKind::Other
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(error: reqwest::Error) -> Self {
        let kind = categorize_reqwest_error(&error);
        let failure = FetchFailure::new(kind, error.to_string()).with_exception(error_chain(&error));
        match error.status() {
            Some(status) => failure.with_status(status.as_u16()),
            None => failure,
        }
    }
}

/// Joins an error and its sources into one line.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Canonical class label for an HTTP status, if it has one.
pub fn class_by_status(status: u16) -> Option<&'static str> {
    let class_name = match status {
        400 => "BadRequest",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "NotFound",
        406 => "NotAcceptable",
        408 => "RequestTimeout",
        409 => "Conflict",
        417 => "ExpectationFailed",
        429 => "TooManyRequests",
        500 => "InternalServerError",
        502 => "BadGateway",
        503 => "ServiceUnavailable",
        504 => "GatewayTimeout",
        _ => return None,
    };
    Some(class_name)
}

/// Severity for an HTTP status.
pub fn level_by_status(status: u16) -> Level {
    match status {
        // temporary network problems are warnings, not errors
        408 | 502 | 503 | 504 => Level::Warning,
        _ => Level::Error,
    }
}

/// Extracts the message from an error body.
///
/// Returns the `error` field when the body is structured data (or markup)
/// carrying one, and the body unchanged otherwise.
pub fn parse_error_response(body: &str) -> String {
    sniff(body)
        .error_field()
        .unwrap_or_else(|| body.to_string())
}

/// Truncates a response body to `MAX_DETAILS_LENGTH` characters.
pub fn details_snippet(body: &str) -> String {
    let max = crate::config::MAX_DETAILS_LENGTH;
    let length = body.chars().count();
    if length <= max {
        return body.to_string();
    }
    let kept: String = body.chars().take(max.saturating_sub(50)).collect();
    format!("{kept}... (truncated, original length: {length} chars)")
}
