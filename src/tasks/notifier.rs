// src/tasks/notifier.rs

//! Surfacing non-fatal build errors to the developer.

use std::fmt;
use std::path::PathBuf;

use tracing::error;

/// A build error worth showing the developer without failing the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub path: Option<PathBuf>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {} ({})", self.title, self.message, path.display()),
            None => write!(f, "{}: {}", self.title, self.message),
        }
    }
}

/// Sink for [`Notification`]s.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Default notifier: one error-level log record per notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        error!(
            title = %notification.title,
            path = ?notification.path,
            "{}",
            notification.message
        );
    }
}
