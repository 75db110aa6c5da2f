// Notifications - Diagnostics pushed to the host from off-thread failures
//
// Stream errors, dropped parameter sends and engine stops happen on threads
// the caller never sees. They are reported here as values the host can log,
// filter by severity or show to the user.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        }
    }
}

/// Part of the pipeline that raised the notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    Decode,
    Actuator,
    Output,
    Capture,
}

impl NotificationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationCategory::Decode => "decode",
            NotificationCategory::Actuator => "actuator",
            NotificationCategory::Output => "output",
            NotificationCategory::Capture => "capture",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub category: NotificationCategory,
    pub message: String,
    /// Wall clock time of creation, ms since the Unix epoch
    pub timestamp_ms: u64,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

impl Notification {
    pub fn new(
        level: NotificationLevel,
        category: NotificationCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            category,
            message: message.into(),
            timestamp_ms: now_ms(),
        }
    }

    pub fn info(category: NotificationCategory, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, category, message)
    }

    pub fn warning(category: NotificationCategory, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, category, message)
    }

    pub fn error(category: NotificationCategory, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, category, message)
    }

    /// At least `level` severe
    pub fn is_at_least(&self, level: NotificationLevel) -> bool {
        self.level >= level
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {}",
            self.level.as_str(),
            self.category.as_str(),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_level_and_category() {
        let n = Notification::warning(NotificationCategory::Actuator, "engine stopped");
        assert_eq!(n.to_string(), "[warning/actuator] engine stopped");

        let n = Notification::error(NotificationCategory::Capture, String::from("no mic"));
        assert_eq!(n.to_string(), "[error/capture] no mic");
    }

    #[test]
    fn test_severity_filter() {
        let info = Notification::info(NotificationCategory::Decode, "loaded");
        let error = Notification::error(NotificationCategory::Output, "stream died");

        assert!(!info.is_at_least(NotificationLevel::Warning));
        assert!(error.is_at_least(NotificationLevel::Warning));
        assert!(error.is_at_least(NotificationLevel::Error));
        assert!(info.is_at_least(NotificationLevel::Info));
    }

    #[test]
    fn test_timestamp_is_wall_clock() {
        let before = now_ms();
        let n = Notification::info(NotificationCategory::Output, "x");
        assert!(n.timestamp_ms >= before);
        assert!(n.timestamp_ms <= now_ms());
    }
}
