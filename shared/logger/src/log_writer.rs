//! Dedicated log file writer thread.

use crate::error::Result;
use crate::log_message::LogMessage;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender, SyncSender, channel};
use std::thread;

/// Work items accepted by the writer thread.
pub(crate) enum Command {
    Write(LogMessage),
    /// Acknowledged once every message queued before it is on disk.
    Flush(SyncSender<()>),
}

pub(crate) struct LogWriter {
    file: BufWriter<File>,
}

impl LogWriter {
    /// Opens or creates the file in append mode, creating parent directories.
    pub fn new(log_path: &Path) -> Result<Self> {
        if let Some(parent) = log_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        Ok(Self {
            file: BufWriter::new(file),
        })
    }

    fn write_message(&mut self, message: &LogMessage) {
        if let Err(e) = self.file.write_all(message.to_string().as_bytes()) {
            eprintln!("Error writing log: {}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.file.flush() {
            eprintln!("Error flushing log: {}", e);
        }
    }

    /// Runs until every sender is dropped. Flushes whenever the queue drains.
    pub fn run(mut self, receiver: Receiver<Command>) {
        while let Ok(command) = receiver.recv() {
            self.handle(command);
            while let Ok(command) = receiver.try_recv() {
                self.handle(command);
            }
            self.flush();
        }
        self.flush();
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Write(message) => self.write_message(&message),
            Command::Flush(ack) => {
                self.flush();
                let _ = ack.send(());
            }
        }
    }
}

/// Spawns the writer thread and returns the channel feeding it.
pub(crate) fn spawn_writer_thread(log_path: &Path) -> Result<Sender<Command>> {
    let writer = LogWriter::new(log_path)?;
    let (sender, receiver) = channel();
    thread::Builder::new()
        .name("log-writer".to_string())
        .spawn(move || writer.run(receiver))?;
    Ok(sender)
}
