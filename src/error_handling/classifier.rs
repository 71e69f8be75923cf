//! Turns fetch failures into error reports.

use std::sync::Arc;

use log::{debug, warn};

use super::categorization::{class_by_status, details_snippet, level_by_status, parse_error_response};
use super::notify::{LogSink, Notification, NotificationSink, WorkLookup};
use super::types::{ErrorKind, ErrorReport, FailureKind, FetchFailure, Level};
use crate::fetch::RequestOptions;

/// Classifies failures into [`ErrorReport`]s and records the ones worth keeping.
///
/// Recorded paths: every non-404 failure, and the two DOI-specific 404 paths
/// (canonical mismatch and DOI lookup). Plain 404s are returned without a
/// notification.
#[derive(Clone)]
pub struct ErrorClassifier {
    sink: Arc<dyn NotificationSink>,
    works: Option<Arc<dyn WorkLookup>>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(Arc::new(LogSink))
    }
}

impl std::fmt::Debug for ErrorClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorClassifier")
            .field("works", &self.works.is_some())
            .finish_non_exhaustive()
    }
}

impl ErrorClassifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink, works: None }
    }

    /// Uses `works` to enrich DOI-specific notifications.
    pub fn with_work_lookup(mut self, works: Arc<dyn WorkLookup>) -> Self {
        self.works = Some(works);
        self
    }

    /// Classifies `failure`, raised while requesting `url`.
    ///
    /// 404s without a usable body become "resource not found"; otherwise the
    /// `doi_mismatch` and `doi_lookup` flags pick the DOI-specific message.
    /// Every other failure gets its status (408 for timeouts, 400 when
    /// nothing else is known), class label and level from the status tables.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL the failing request was made for
    /// * `failure` - What went wrong
    /// * `options` - The request's options; only the reporting fields and the
    ///   body's `rev` are read
    ///
    /// # Returns
    ///
    /// The finished [`ErrorReport`]. Recorded paths are also handed to the
    /// notification sink; a failing sink is logged and does not change the report.
    pub fn classify(&self, url: &str, failure: &FetchFailure, options: &RequestOptions) -> ErrorReport {
        debug!("Classifying {} failure for {url}", failure.kind);
        if failure.kind == FailureKind::NotFound {
            self.classify_not_found(url, failure, options)
        } else {
            self.classify_upstream(url, failure, options)
        }
    }

    fn classify_not_found(
        &self,
        url: &str,
        failure: &FetchFailure,
        options: &RequestOptions,
    ) -> ErrorReport {
        let status = 404;
        let class_name = class_by_status(status).unwrap_or("NotFound").to_string();
        let exception = failure.exception.clone().unwrap_or_default();

        let response = failure
            .response
            .as_ref()
            .filter(|response| !response.body.trim().is_empty());
        let Some(response) = response else {
            return ErrorReport {
                error: "resource not found".to_string(),
                status,
                kind: ErrorKind::NotFoundGeneric,
                exception,
                class_name,
                details: None,
                level: Level::Error,
                target_url: url.to_string(),
                work_id: options.work_id.clone(),
                agent_id: options.agent_id.clone(),
            };
        };
        let details = Some(details_snippet(&response.body));

        if options.doi_mismatch {
            let error = response
                .message
                .clone()
                .unwrap_or_else(|| failure.message.clone());
            let report = ErrorReport {
                error,
                status,
                kind: ErrorKind::NotFoundMismatch,
                exception,
                class_name,
                details,
                level: Level::Error,
                target_url: url.to_string(),
                work_id: options.work_id.clone(),
                agent_id: options.agent_id.clone(),
            };
            let mut notification = Notification::from(&report);
            if let Some(work) = self.lookup_work(options) {
                notification.work_id = Some(work.id);
            }
            self.notify(&notification);
            return report;
        }

        if options.doi_lookup {
            let report = ErrorReport {
                error: format!("DOI {url} could not be resolved"),
                status,
                kind: ErrorKind::NotFoundUnresolved,
                exception,
                class_name,
                details,
                level: Level::Error,
                target_url: url.to_string(),
                work_id: options.work_id.clone(),
                agent_id: options.agent_id.clone(),
            };
            let mut notification = Notification::from(&report);
            if let Some(work) = self.lookup_work(options) {
                notification.message = format!("DOI {} could not be resolved", work.doi);
                notification.work_id = Some(work.id);
            }
            self.notify(&notification);
            return report;
        }

        ErrorReport {
            error: parse_error_response(&response.body),
            status,
            kind: ErrorKind::NotFoundGeneric,
            exception,
            class_name,
            details,
            level: Level::Error,
            target_url: url.to_string(),
            work_id: options.work_id.clone(),
            agent_id: options.agent_id.clone(),
        }
    }

    fn classify_upstream(
        &self,
        url: &str,
        failure: &FetchFailure,
        options: &RequestOptions,
    ) -> ErrorReport {
        let mut details = None;
        let status = if failure.kind == FailureKind::Timeout {
            408
        } else if let Some(status) = failure.status {
            status
        } else if let Some(response) = &failure.response {
            details = Some(details_snippet(&response.body));
            response.status
        } else {
            400
        };

        let class_name = class_by_status(status)
            .map(str::to_string)
            .unwrap_or_else(|| failure.kind.to_string());
        let level = level_by_status(status);

        let mut message = format!("{} for {url}", parse_error_response(&failure.message));
        if class_name == "Conflict" {
            if let Some(rev) = options.data.as_ref().and_then(|data| data.rev()) {
                message = format!("{message} with rev {rev}");
            }
        }

        let kind = if failure.kind == FailureKind::Timeout {
            ErrorKind::Timeout
        } else {
            ErrorKind::UpstreamError
        };

        let report = ErrorReport {
            error: message,
            status,
            kind,
            exception: failure.exception.clone().unwrap_or_default(),
            class_name,
            details,
            level,
            target_url: url.to_string(),
            work_id: options.work_id.clone(),
            agent_id: options.agent_id.clone(),
        };
        self.notify(&Notification::from(&report));
        report
    }

    fn lookup_work(&self, options: &RequestOptions) -> Option<super::notify::Work> {
        let works = self.works.as_ref()?;
        let work_id = options.work_id.as_deref()?;
        works.find_work(work_id)
    }

    fn notify(&self, notification: &Notification) {
        if let Err(e) = self.sink.create(notification) {
            warn!(
                "Failed to record notification for {}: {e}",
                notification.target_url
            );
        }
    }
}
