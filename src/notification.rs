//! User-facing notifications.
//!
//! The session store reports failures it swallows (institution or user
//! lookup, expired session) through a [`Notifier`] instead of returning them.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub description: String,
}

impl Notification {
    pub fn info(message: &str, description: &str) -> Self {
        Self {
            level: Level::Info,
            message: message.to_string(),
            description: description.to_string(),
        }
    }

    pub fn error(message: &str, description: &str) -> Self {
        Self {
            level: Level::Error,
            message: message.to_string(),
            description: description.to_string(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.description)
        } else {
            write!(f, "{}: {}", self.message, self.description)
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to the `log` facade.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Info => log::info!("{}", notification),
            Level::Error => log::error!("{}", notification),
        }
    }
}

/// Prints notifications to stderr for an interactive user.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let tag = match notification.level {
            Level::Info => "info",
            Level::Error => "error",
        };
        eprintln!("[{}] {}", tag, notification);
        log::debug!("notification shown: {:?}", notification);
    }
}
