use std::borrow::Cow;
use std::time::SystemTime;

use opentelemetry::logs::{AnyValue, Severity};
use opentelemetry::Key;

use crate::Level;

/// Source location of the call that produced an entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Caller {
    /// Fully qualified function name, may be empty.
    pub function: Cow<'static, str>,
    /// Source file, may be empty.
    pub file: Cow<'static, str>,
    /// Line within `file`.
    pub line: u32,
}

impl Caller {
    /// Creates a caller.
    pub fn new(
        function: impl Into<Cow<'static, str>>,
        file: impl Into<Cow<'static, str>>,
        line: u32,
    ) -> Self {
        Caller {
            function: function.into(),
            file: file.into(),
            line,
        }
    }
}

/// A log entry that has already passed level filtering upstream and is
/// guaranteed to be emitted.
#[derive(Clone, Debug, Default)]
pub struct LogEntry {
    /// Level assigned by the upstream logger.
    pub level: Level,
    /// Log message, becomes the record body.
    pub message: String,
    /// When the entry was created.
    pub time: Option<SystemTime>,
    /// Where the entry was created, if captured.
    pub caller: Option<Caller>,
    /// Captured stack trace, empty if none.
    pub stack: String,
}

impl LogEntry {
    /// Creates an entry with the given level and message.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        LogEntry {
            level,
            message: message.into(),
            ..Default::default()
        }
    }

    /// Sets the creation time.
    pub fn with_time(mut self, time: SystemTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sets the caller.
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Sets the stack trace.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }
}

/// The record handed to a [`LogSink`](crate::LogSink), built fresh for every
/// entry.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct TelemetryRecord {
    /// Record body.
    pub body: String,
    /// Normalized severity. `None` means unspecified.
    pub severity: Option<Severity>,
    /// Original level name.
    pub severity_text: Option<&'static str>,
    /// Creation time of the entry.
    pub timestamp: Option<SystemTime>,
    /// Attributes, in emission order.
    pub attributes: Vec<(Key, AnyValue)>,
}

impl TelemetryRecord {
    /// Returns the value of the first attribute named `key`.
    pub fn attribute(&self, key: &str) -> Option<&AnyValue> {
        self.attributes
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }
}
