//! Notification of log lines through an injected transport.

use {
    super::level::Level,
    crate::error::TransportError,
    serde::{Deserialize, Serialize},
    std::fmt::Debug,
};

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub from: String,
    /// Recipients joined with `", "`.
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Delivers notifications, e.g. over SMTP.
///
/// The logger never constructs a transport itself; one is handed to
/// [`Logger::new`](crate::Logger::new) and shared by duplicated loggers.
pub trait Transport: Debug + Send + Sync {
    fn send(&self, notification: &Notification) -> Result<(), TransportError>;
}

/// Levels that notify without the call asking for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotifyLevels {
    Flag(bool),
    Levels(Vec<Level>),
}

impl Default for NotifyLevels {
    fn default() -> Self {
        NotifyLevels::Flag(false)
    }
}

impl NotifyLevels {
    pub fn selects(&self, level: Level) -> bool {
        match self {
            NotifyLevels::Flag(all) => *all,
            NotifyLevels::Levels(levels) => levels.contains(&level),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotifyOptions {
    pub levels: NotifyLevels,
    #[serde(alias = "recipiants")]
    pub recipients: Vec<String>,
    pub sender: String,
    pub application_name: String,
}

impl NotifyOptions {
    /// Build the notification for a rendered, uncolored log line.
    pub fn notification(&self, level: Level, text: String) -> Notification {
        Notification {
            from: self.sender.clone(),
            to: self.recipients.join(", "),
            subject: format!("Logger notification {}: {level}", self.application_name),
            text,
        }
    }
}
