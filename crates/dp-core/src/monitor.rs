//! Log sink for content-level problems found while applying patches

use std::cell::RefCell;
use std::fmt;

/// Severity of a monitor message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        write!(f, "{}", name)
    }
}

/// Accepts leveled messages meant for the content author
pub trait Monitor {
    fn log(&self, message: &str, level: LogLevel);
}

/// Forwards messages to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMonitor;

impl Monitor for TracingMonitor {
    fn log(&self, message: &str, level: LogLevel) {
        match level {
            LogLevel::Trace => tracing::trace!("{}", message),
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }
    }
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct MemoryMonitor {
    entries: RefCell<Vec<(LogLevel, String)>>,
}

impl MemoryMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// All logged messages, oldest first
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.borrow().clone()
    }

    /// Messages logged at the given level
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(LogLevel::Warn)
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Monitor for MemoryMonitor {
    fn log(&self, message: &str, level: LogLevel) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

impl<M: Monitor + ?Sized> Monitor for std::rc::Rc<M> {
    fn log(&self, message: &str, level: LogLevel) {
        (**self).log(message, level)
    }
}
