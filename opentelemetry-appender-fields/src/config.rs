use std::env;
use std::str::FromStr;

use opentelemetry::otel_warn;

use crate::Level;

/// Whether `code.*` caller attributes are added, `true` or `false`.
pub(crate) const OTEL_APPENDER_FIELDS_ADD_CALLER: &str = "OTEL_APPENDER_FIELDS_ADD_CALLER";
/// Default for adding caller attributes.
pub(crate) const OTEL_APPENDER_FIELDS_ADD_CALLER_DEFAULT: bool = false;
/// Minimum level for which the stack trace is attached. Unset disables it.
pub(crate) const OTEL_APPENDER_FIELDS_STACKTRACE_LEVEL: &str =
    "OTEL_APPENDER_FIELDS_STACKTRACE_LEVEL";
/// Minimum level at which the active span is marked as errored.
pub(crate) const OTEL_APPENDER_FIELDS_ERROR_STATUS_LEVEL: &str =
    "OTEL_APPENDER_FIELDS_ERROR_STATUS_LEVEL";
/// Default for the error status level.
pub(crate) const OTEL_APPENDER_FIELDS_ERROR_STATUS_LEVEL_DEFAULT: Level = Level::ERROR;

/// Record emitter configuration.
/// Use [`EmitterConfigBuilder`] to configure your own instance of [`EmitterConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitterConfig {
    /// Add `code.function`, `code.filepath` and `code.lineno` attributes
    /// when the entry has a caller.
    pub(crate) add_caller: bool,

    /// Add the `exception.stacktrace` attribute for entries at or above this
    /// level. `None` disables it.
    pub(crate) stacktrace_level: Option<Level>,

    /// Mark the span of the entry's context as errored for entries at or
    /// above this level.
    pub(crate) error_status_level: Level,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        EmitterConfigBuilder::default().build()
    }
}

impl EmitterConfig {
    pub(crate) fn stacktrace_enabled(&self, level: Level) -> bool {
        self.stacktrace_level.is_some_and(|min| level >= min)
    }
}

/// A builder for creating [`EmitterConfig`] instances.
#[derive(Debug)]
pub struct EmitterConfigBuilder {
    add_caller: bool,
    stacktrace_level: Option<Level>,
    error_status_level: Level,
}

impl Default for EmitterConfigBuilder {
    /// Create a new [`EmitterConfigBuilder`] initialized with default values.
    /// The values are overridden by environment variables if set.
    /// The supported environment variables are:
    /// * `OTEL_APPENDER_FIELDS_ADD_CALLER`
    /// * `OTEL_APPENDER_FIELDS_STACKTRACE_LEVEL`
    /// * `OTEL_APPENDER_FIELDS_ERROR_STATUS_LEVEL`
    ///
    /// Note: Programmatic configuration overrides any value set via the environment variable.
    fn default() -> Self {
        EmitterConfigBuilder {
            add_caller: OTEL_APPENDER_FIELDS_ADD_CALLER_DEFAULT,
            stacktrace_level: None,
            error_status_level: OTEL_APPENDER_FIELDS_ERROR_STATUS_LEVEL_DEFAULT,
        }
        .init_from_env_vars()
    }
}

impl EmitterConfigBuilder {
    /// Add caller attributes (`code.function`, `code.filepath`,
    /// `code.lineno`) to every record whose entry has a caller.
    /// Disabled by default.
    ///
    /// Corresponding environment variable: `OTEL_APPENDER_FIELDS_ADD_CALLER`.
    ///
    /// Note: Programmatically setting this will override any value set via the environment variable.
    pub fn with_caller(mut self, add_caller: bool) -> Self {
        self.add_caller = add_caller;
        self
    }

    /// Attach the entry's stack trace as `exception.stacktrace` for entries
    /// at or above `level`. Disabled by default.
    ///
    /// Corresponding environment variable: `OTEL_APPENDER_FIELDS_STACKTRACE_LEVEL`.
    ///
    /// Note: Programmatically setting this will override any value set via the environment variable.
    pub fn with_stacktrace_level(mut self, level: Option<Level>) -> Self {
        self.stacktrace_level = level;
        self
    }

    /// Mark the active span of the entry's context as errored for entries at
    /// or above `level`. The default is [`Level::ERROR`].
    ///
    /// Corresponding environment variable: `OTEL_APPENDER_FIELDS_ERROR_STATUS_LEVEL`.
    ///
    /// Note: Programmatically setting this will override any value set via the environment variable.
    pub fn with_error_status_level(mut self, level: Level) -> Self {
        self.error_status_level = level;
        self
    }

    /// Builds an `EmitterConfig`.
    pub fn build(self) -> EmitterConfig {
        EmitterConfig {
            add_caller: self.add_caller,
            stacktrace_level: self.stacktrace_level,
            error_status_level: self.error_status_level,
        }
    }

    fn init_from_env_vars(mut self) -> Self {
        if let Ok(add_caller) = env::var(OTEL_APPENDER_FIELDS_ADD_CALLER) {
            match bool::from_str(add_caller.trim()) {
                Ok(add_caller) => self.add_caller = add_caller,
                Err(_) => {
                    otel_warn!(
                        name: "EmitterConfig.InvalidBool",
                        variable = OTEL_APPENDER_FIELDS_ADD_CALLER,
                        value = add_caller.as_str()
                    );
                }
            }
        }

        if let Some(level) = level_from_env(OTEL_APPENDER_FIELDS_STACKTRACE_LEVEL) {
            self.stacktrace_level = Some(level);
        }

        if let Some(level) = level_from_env(OTEL_APPENDER_FIELDS_ERROR_STATUS_LEVEL) {
            self.error_status_level = level;
        }

        self
    }
}

fn level_from_env(variable: &'static str) -> Option<Level> {
    let value = env::var(variable).ok()?;
    match Level::from_str(&value) {
        Ok(level) => Some(level),
        Err(err) => {
            let error = err.to_string();
            otel_warn!(
                name: "EmitterConfig.InvalidLevel",
                variable = variable,
                error = error.as_str()
            );
            None
        }
    }
}
