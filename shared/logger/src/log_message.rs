//! A single formatted log record.

use crate::log_level::LogLevel;
use chrono::Local;
use std::fmt;
use std::sync::Arc;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone)]
pub(crate) struct LogMessage {
    pub timestamp: String,
    pub level: LogLevel,
    pub component: Option<Arc<str>>,
    pub message: String,
}

impl LogMessage {
    pub fn new(level: LogLevel, component: Option<Arc<str>>, message: String) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            level,
            component,
            message,
        }
    }
}

/// `[timestamp] LEVEL [component: X]: message` followed by a newline.
impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.component {
            Some(component) => writeln!(
                f,
                "[{}] {} [component: {}]: {}",
                self.timestamp, self.level, component, self.message
            ),
            None => writeln!(f, "[{}] {}: {}", self.timestamp, self.level, self.message),
        }
    }
}
