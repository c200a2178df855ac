//! Structured request log handed to the server as a capability.
//!
//! Entries live in a bounded ring buffer and are optionally appended to a JSONL
//! file. `SharedLogger::in_memory` skips the file entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const MAX_LOG_ENTRIES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            component: component.into(),
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, ctx: serde_json::Value) -> Self {
        self.context = Some(ctx);
        self
    }
}

pub struct Logger {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    file_path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
    /// Lines currently in the file; compaction kicks in at twice `capacity`.
    file_lines: usize,
}

impl Logger {
    /// Open (or create) a JSONL log file, replaying its tail into the buffer.
    pub fn new(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        Self::with_capacity(file_path, MAX_LOG_ENTRIES)
    }

    pub fn with_capacity(file_path: impl AsRef<Path>, capacity: usize) -> std::io::Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();

        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut entries = VecDeque::with_capacity(capacity);
        let mut file_lines = 0;

        if file_path.exists() {
            let reader = BufReader::new(File::open(&file_path)?);
            for line in reader.lines().map_while(std::result::Result::ok) {
                file_lines += 1;
                if let Ok(entry) = serde_json::from_str::<LogEntry>(&line) {
                    if entries.len() >= capacity {
                        entries.pop_front();
                    }
                    entries.push_back(entry);
                }
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        let mut logger = Self {
            entries,
            capacity,
            file_path: Some(file_path),
            writer: Some(BufWriter::new(file)),
            file_lines,
        };

        if logger.file_lines > capacity {
            logger.compact()?;
        }

        Ok(logger)
    }

    pub fn in_memory() -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: MAX_LOG_ENTRIES,
            file_path: None,
            writer: None,
            file_lines: 0,
        }
    }

    pub fn log(&mut self, entry: LogEntry) {
        if let Some(ref mut writer) = self.writer {
            if let Ok(json) = serde_json::to_string(&entry) {
                let _ = writeln!(writer, "{}", json);
                let _ = writer.flush();
                self.file_lines += 1;
            }
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);

        if self.file_lines >= self.capacity.saturating_mul(2) {
            let _ = self.compact();
        }
    }

    /// Most recent entries first.
    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }

    /// Rewrite the file so it holds only what the ring buffer holds.
    pub fn compact(&mut self) -> std::io::Result<()> {
        let Some(path) = self.file_path.clone() else {
            return Ok(());
        };

        self.writer = None;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut writer = BufWriter::new(file);
        for entry in &self.entries {
            if let Ok(json) = serde_json::to_string(entry) {
                writeln!(writer, "{}", json)?;
            }
        }
        writer.flush()?;
        self.file_lines = self.entries.len();

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }
}

#[derive(Clone)]
pub struct SharedLogger(Arc<Mutex<Logger>>);

impl SharedLogger {
    pub fn new(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self(Arc::new(Mutex::new(Logger::new(file_path)?))))
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self(Arc::new(Mutex::new(Logger::in_memory())))
    }

    pub fn log(&self, entry: LogEntry) {
        if let Ok(mut logger) = self.0.lock() {
            logger.log(entry);
        }
    }

    pub fn info(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Info, component, message));
    }

    pub fn warn(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Warn, component, message));
    }

    pub fn error(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Error, component, message));
    }

    pub fn debug(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Debug, component, message));
    }

    pub fn log_with_context(
        &self,
        level: LogLevel,
        component: impl Into<String>,
        message: impl Into<String>,
        context: serde_json::Value,
    ) {
        self.log(LogEntry::new(level, component, message).with_context(context));
    }

    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        self.0.lock().map(|l| l.recent(limit)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_in_memory_records_entries() {
        let logger = SharedLogger::in_memory();
        logger.info("proxy", "first");
        logger.error("server", "second");

        let recent = logger.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "second");
        assert_eq!(recent[0].level, LogLevel::Error);
        assert_eq!(recent[1].component, "proxy");
    }

    #[test]
    fn test_file_logger_replays_previous_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("bridge.log");

        {
            let logger = SharedLogger::new(&path).unwrap();
            logger.log_with_context(
                LogLevel::Warn,
                "proxy",
                "upstream slow",
                serde_json::json!({ "status": 200 }),
            );
        }

        let reopened = SharedLogger::new(&path).unwrap();
        let recent = reopened.recent(5);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].message, "upstream slow");
        assert_eq!(recent[0].context, Some(serde_json::json!({ "status": 200 })));
    }

    #[test]
    fn test_file_is_compacted_to_capacity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bridge.log");

        {
            let mut logger = Logger::with_capacity(&path, 3).unwrap();
            for i in 0..10 {
                logger.log(LogEntry::new(LogLevel::Info, "proxy", i.to_string()));
            }
        }

        let lines = std::fs::read_to_string(&path).unwrap().lines().count();
        assert!(lines < 6, "file holds {lines} lines");

        let reopened = Logger::with_capacity(&path, 3).unwrap();
        let messages: Vec<_> = reopened.recent(10).into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["9", "8", "7"]);
    }

    #[test]
    fn test_oversized_file_is_compacted_on_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bridge.log");

        {
            let mut logger = Logger::with_capacity(&path, 100).unwrap();
            for i in 0..50 {
                logger.log(LogEntry::new(LogLevel::Debug, "t", i.to_string()));
            }
        }

        let _ = Logger::with_capacity(&path, 10).unwrap();
        let lines = std::fs::read_to_string(&path).unwrap().lines().count();
        assert_eq!(lines, 10);
    }

    #[test]
    fn test_ring_buffer_is_bounded() {
        let mut logger = Logger::in_memory();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            logger.log(LogEntry::new(LogLevel::Debug, "t", i.to_string()));
        }
        let all = logger.recent(usize::MAX);
        assert_eq!(all.len(), MAX_LOG_ENTRIES);
        assert_eq!(all[0].message, (MAX_LOG_ENTRIES + 4).to_string());
    }
}
