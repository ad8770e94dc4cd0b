//! Build log sink.
//!
//! User-facing progress lines (`[INFO] ...`, `[ERROR] ...`) go to the build
//! log. Diagnostics go through `tracing` separately.

use std::fmt;
use std::io::Write;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "[INFO]"),
            LogLevel::Error => write!(f, "[ERROR]"),
        }
    }
}

/// Where a step writes its build log.
pub trait BuildLog: Send {
    fn line(&mut self, level: LogLevel, message: &str);

    fn info(&mut self, message: &str) {
        self.line(LogLevel::Info, message);
    }

    fn error(&mut self, message: &str) {
        self.line(LogLevel::Error, message);
    }
}

/// Writes log lines to any writer (stdout in the CLI).
pub struct WriterLog<W> {
    out: W,
}

impl<W: Write + Send> WriterLog<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> BuildLog for WriterLog<W> {
    fn line(&mut self, level: LogLevel, message: &str) {
        if let Err(e) = writeln!(self.out, "{} {}", level, message) {
            warn!(error = %e, "Failed to write build log");
        }
    }
}

/// Keeps log lines in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Vec<String>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn contains(&self, text: &str) -> bool {
        self.lines.iter().any(|l| l.contains(text))
    }
}

impl BuildLog for MemoryLog {
    fn line(&mut self, level: LogLevel, message: &str) {
        self.lines.push(format!("{} {}", level, message));
    }
}
