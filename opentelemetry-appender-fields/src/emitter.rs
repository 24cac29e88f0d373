use std::sync::Arc;

use opentelemetry::logs::AnyValue;
use opentelemetry::trace::{Status, TraceContextExt};
use opentelemetry::{otel_debug, Context, Key};

use crate::convert::append_fields;
use crate::{
    map_severity_to_otel_severity, ContextEncoderRegistry, EmitterConfig, Field, Level, LogEntry,
    LogSink, TelemetryRecord,
};

const EXCEPTION_STACKTRACE: &str = "exception.stacktrace";
const CODE_FUNCTION: &str = "code.function";
const CODE_FILEPATH: &str = "code.filepath";
const CODE_LINENO: &str = "code.lineno";

/// Translates finished log entries and their fields into
/// [`TelemetryRecord`]s and hands them to a [`LogSink`].
///
/// Emission runs synchronously on the calling thread and never fails.
#[derive(Debug)]
pub struct RecordEmitter<S> {
    sink: S,
    config: EmitterConfig,
    encoders: Arc<ContextEncoderRegistry>,
}

impl<S: LogSink> RecordEmitter<S> {
    /// Creates an emitter with the default configuration and no context
    /// encoders.
    pub fn new(sink: S) -> Self {
        Self::builder(sink).build()
    }

    /// Creates a builder for an emitter writing to `sink`.
    pub fn builder(sink: S) -> RecordEmitterBuilder<S> {
        RecordEmitterBuilder {
            sink,
            config: None,
            encoders: None,
        }
    }

    /// The sink records are written to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Converts `entry` and `fields` into a single record and emits it.
    ///
    /// If `fields` carry a [`Context`] (the last one wins), the registered
    /// context encoders contribute extra fields, the record is associated
    /// with that context, and for entries at or above the configured error
    /// status level its recording span is marked as errored.
    pub fn emit(&self, entry: &LogEntry, fields: &[Field]) {
        let cx = fields.iter().rev().find_map(Field::as_context);

        if let Some(cx) = cx {
            if entry.level >= self.config.error_status_level {
                let span = cx.span();
                if span.is_recording() {
                    span.set_status(Status::error(entry.message.clone()));
                    otel_debug!(
                        name: "RecordEmitter.SpanStatusSet",
                        level = entry.level.as_i8()
                    );
                }
            }
        }

        let mut record = TelemetryRecord {
            body: entry.message.clone(),
            severity: map_severity_to_otel_severity(entry.level),
            severity_text: entry.level.name(),
            timestamp: entry.time,
            attributes: Vec::with_capacity(fields.len()),
        };

        self.append_metadata(&mut record.attributes, entry);
        append_fields(&mut record.attributes, fields);
        if !self.encoders.is_empty() {
            append_fields(&mut record.attributes, &self.encoders.fields_from_context(cx));
        }

        match cx {
            Some(cx) => self.sink.emit(cx, record),
            None => self.sink.emit(&Context::new(), record),
        }
    }

    fn append_metadata(&self, attributes: &mut Vec<(Key, AnyValue)>, entry: &LogEntry) {
        if self.config.stacktrace_enabled(entry.level) && !entry.stack.is_empty() {
            attributes.push((
                Key::from_static_str(EXCEPTION_STACKTRACE),
                AnyValue::from(entry.stack.clone()),
            ));
        }

        if !self.config.add_caller {
            return;
        }
        if let Some(caller) = &entry.caller {
            if !caller.function.is_empty() {
                attributes.push((
                    Key::from_static_str(CODE_FUNCTION),
                    AnyValue::from(caller.function.clone()),
                ));
            }
            if !caller.file.is_empty() {
                attributes.push((
                    Key::from_static_str(CODE_FILEPATH),
                    AnyValue::from(caller.file.clone()),
                ));
                attributes.push((
                    Key::from_static_str(CODE_LINENO),
                    AnyValue::Int(i64::from(caller.line)),
                ));
            }
        }
    }
}

/// Builder for [`RecordEmitter`].
#[derive(Debug)]
pub struct RecordEmitterBuilder<S> {
    sink: S,
    config: Option<EmitterConfig>,
    encoders: Option<Arc<ContextEncoderRegistry>>,
}

impl<S: LogSink> RecordEmitterBuilder<S> {
    /// Uses `config` instead of [`EmitterConfig::default`].
    pub fn with_config(mut self, config: EmitterConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Adds `code.*` attributes from the entry caller.
    pub fn with_caller(mut self, add_caller: bool) -> Self {
        self.config_mut().add_caller = add_caller;
        self
    }

    /// Adds `exception.stacktrace` for entries at or above `level`; `None`
    /// disables it.
    pub fn with_stacktrace_level(mut self, level: Option<Level>) -> Self {
        self.config_mut().stacktrace_level = level;
        self
    }

    /// Marks the recording span as errored for entries at or above `level`.
    pub fn with_error_status_level(mut self, level: Level) -> Self {
        self.config_mut().error_status_level = level;
        self
    }

    /// Shares `encoders` with the emitter. Registration must be complete:
    /// the registry is read-only once shared.
    pub fn with_context_encoders(mut self, encoders: Arc<ContextEncoderRegistry>) -> Self {
        self.encoders = Some(encoders);
        self
    }

    fn config_mut(&mut self) -> &mut EmitterConfig {
        self.config.get_or_insert_with(EmitterConfig::default)
    }

    /// Builds the emitter.
    pub fn build(self) -> RecordEmitter<S> {
        RecordEmitter {
            sink: self.sink,
            config: self.config.unwrap_or_default(),
            encoders: self.encoders.unwrap_or_default(),
        }
    }
}
