//! Notification sink and work lookup collaborators.
//!
//! The classifier hands every report worth recording to a [`NotificationSink`].
//! Sinks are fire-and-forget: a failing sink is logged and otherwise ignored.
//! The optional [`WorkLookup`] only enriches notification messages.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

use super::types::{ErrorReport, Level, NotifyError};

/// A record handed to a [`NotificationSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub exception: String,
    pub class_name: String,
    pub message: String,
    pub details: Option<String>,
    pub status: u16,
    pub target_url: String,
    pub level: Level,
    pub work_id: Option<String>,
    pub agent_id: Option<String>,
}

impl From<&ErrorReport> for Notification {
    fn from(report: &ErrorReport) -> Self {
        Self {
            exception: report.exception.clone(),
            class_name: report.class_name.clone(),
            message: report.error.clone(),
            details: report.details.clone(),
            status: report.status,
            target_url: report.target_url.clone(),
            level: report.level,
            work_id: report.work_id.clone(),
            agent_id: report.agent_id.clone(),
        }
    }
}

/// Receives notifications for recorded failures.
pub trait NotificationSink: Send + Sync {
    /// Records one notification.
    fn create(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log (`warn!` for warnings, `error!` for errors).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn create(&self, notification: &Notification) -> Result<(), NotifyError> {
        let level = match notification.level {
            Level::Warning => log::Level::Warn,
            Level::Error => log::Level::Error,
        };
        log::log!(
            level,
            "[{}] {} (status {}, target {})",
            notification.class_name,
            notification.message,
            notification.status,
            notification.target_url
        );
        Ok(())
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn create(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Keeps notifications in memory so callers can drain them in batches.
#[derive(Debug, Default)]
pub struct MemorySink {
    notifications: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the notifications recorded so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Removes and returns the notifications recorded so far.
    pub fn drain(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn create(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut guard = self
            .notifications
            .lock()
            .map_err(|e| NotifyError::Unavailable(e.to_string()))?;
        guard.push(notification.clone());
        Ok(())
    }
}

/// A work (article) record known to the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Work {
    pub id: String,
    pub doi: String,
}

/// Looks up works by id.
pub trait WorkLookup: Send + Sync {
    fn find_work(&self, work_id: &str) -> Option<Work>;
}

impl WorkLookup for HashMap<String, Work> {
    fn find_work(&self, work_id: &str) -> Option<Work> {
        self.get(work_id).cloned()
    }
}
