//! Thread-safe asynchronous logger.
//!
//! A [`Logger`] is an explicit logging context: components receive one at
//! construction and derive tagged children with [`Logger::for_component`].

use crate::error::{LoggingError, Result};
use crate::log_level::LogLevel;
use crate::log_message::LogMessage;
use crate::log_writer::{Command, spawn_writer_thread};
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{Sender, sync_channel};
use std::time::Duration;

const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Thread-safe, non-blocking logger.
///
/// Clones and component loggers share one channel to a single writer thread.
///
/// # Examples
///
/// ```no_run
/// use logging::{LogLevel, Logger};
///
/// let logger = Logger::new("multicam.log", LogLevel::Info).unwrap();
/// let cameras = logger.for_component("CameraManager");
/// cameras.info("Camera 0 initialized");
/// ```
#[derive(Clone)]
pub struct Logger {
    sender: Option<Sender<Command>>,
    level: LogLevel,
    component: Option<Arc<str>>,
    console_output: bool,
}

impl Logger {
    /// Creates a file logger with its own writer thread.
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be created or opened.
    pub fn new<P: AsRef<Path>>(log_path: P, level: LogLevel) -> Result<Self> {
        Self::with_component(log_path, level, None, false)
    }

    /// Creates a file logger tagged with `component`, optionally echoing to stdout.
    pub fn with_component<P: AsRef<Path>>(
        log_path: P,
        level: LogLevel,
        component: Option<&str>,
        console_output: bool,
    ) -> Result<Self> {
        let sender = spawn_writer_thread(log_path.as_ref())?;
        Ok(Logger {
            sender: Some(sender),
            level,
            component: component.map(Arc::from),
            console_output,
        })
    }

    /// Creates a logger without a file. Messages go to stdout when
    /// `console_output` is set and are dropped otherwise.
    pub fn detached(level: LogLevel, console_output: bool) -> Self {
        Logger {
            sender: None,
            level,
            component: None,
            console_output,
        }
    }

    /// Returns a logger that shares this one's writer and settings but tags
    /// lines with a different component.
    pub fn for_component(&self, component: &str) -> Self {
        Logger {
            sender: self.sender.clone(),
            level: self.level,
            component: Some(Arc::from(component)),
            console_output: self.console_output,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Blocks until everything logged so far has reached the file.
    pub fn flush(&self) -> Result<()> {
        let Some(sender) = &self.sender else {
            return Ok(());
        };
        let (ack_tx, ack_rx) = sync_channel(1);
        sender
            .send(Command::Flush(ack_tx))
            .map_err(|_| LoggingError::Writer("writer thread stopped".to_string()))?;
        ack_rx
            .recv_timeout(FLUSH_TIMEOUT)
            .map_err(|e| LoggingError::Writer(format!("flush not acknowledged: {}", e)))
    }

    fn log(&self, level: LogLevel, message: &str) {
        if level < self.level {
            return;
        }
        let msg = LogMessage::new(level, self.component.clone(), message.to_string());

        if self.console_output {
            print!("{}", msg);
        }

        if let Some(sender) = &self.sender {
            let _ = sender.send(Command::Write(msg));
        }
    }
}
