use std::sync::Arc;
use std::time::{Duration, SystemTime};

use opentelemetry::logs::{AnyValue, Severity};
use opentelemetry::trace::{Status, TraceContextExt, Tracer, TracerProvider as _};
use opentelemetry::{Context, Key};
use opentelemetry_appender_fields::{
    Caller, ContextEncoderRegistry, EmitterConfig, EmitterConfigBuilder, Field, Level, LogEntry,
    OpenTelemetryLogSink, RecordEmitter,
};
use opentelemetry_sdk::logs::{InMemoryLogExporter, SdkLogRecord, SdkLoggerProvider};
use opentelemetry_sdk::trace::{InMemorySpanExporter, Sampler, SdkTracerProvider};

fn config(add_caller: bool) -> EmitterConfig {
    EmitterConfigBuilder::default()
        .with_caller(add_caller)
        .with_stacktrace_level(Some(Level::ERROR))
        .with_error_status_level(Level::ERROR)
        .build()
}

fn logger_provider() -> (SdkLoggerProvider, InMemoryLogExporter) {
    let exporter = InMemoryLogExporter::default();
    let provider = SdkLoggerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    (provider, exporter)
}

fn tracer_provider() -> (SdkTracerProvider, InMemorySpanExporter) {
    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    (provider, exporter)
}

fn attribute<'a>(record: &'a SdkLogRecord, key: &str) -> Option<&'a AnyValue> {
    record
        .attributes_iter()
        .find(|(k, _)| k.as_str() == key)
        .map(|(_, v)| v)
}

fn string(s: &str) -> AnyValue {
    AnyValue::String(s.to_owned().into())
}

#[test]
fn caller_and_fields_are_exported() {
    let (provider, exporter) = logger_provider();
    let emitter = RecordEmitter::builder(OpenTelemetryLogSink::new(&provider))
        .with_config(config(true))
        .build();

    let time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let entry = LogEntry::new(Level::INFO, "request served")
        .with_time(time)
        .with_caller(Caller::new("main.Run", "main.go", 42));
    emitter.emit(
        &entry,
        &[
            Field::new("http.status", 200u16),
            Field::new("cache.hit", true),
        ],
    );

    let logs = exporter.get_emitted_logs().unwrap();
    assert_eq!(logs.len(), 1);
    let record = &logs[0].record;

    assert_eq!(record.body(), Some(&string("request served")));
    assert_eq!(record.severity_number(), Some(Severity::Info));
    assert_eq!(record.severity_text(), Some("INFO"));
    assert_eq!(record.timestamp(), Some(time));
    assert_eq!(logs[0].instrumentation.name(), "opentelemetry-appender-fields");

    let keys: Vec<&str> = record.attributes_iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "code.function",
            "code.filepath",
            "code.lineno",
            "http.status",
            "cache.hit"
        ]
    );
    assert_eq!(attribute(record, "code.function"), Some(&string("main.Run")));
    assert_eq!(attribute(record, "code.filepath"), Some(&string("main.go")));
    assert_eq!(attribute(record, "code.lineno"), Some(&AnyValue::Int(42)));
    assert_eq!(attribute(record, "http.status"), Some(&AnyValue::Int(200)));
    assert_eq!(attribute(record, "cache.hit"), Some(&AnyValue::Boolean(true)));
    assert!(record.trace_context().is_none());
}

#[test]
fn error_entry_marks_recording_span_as_errored() {
    let (logger_provider, log_exporter) = logger_provider();
    let (tracer_provider, span_exporter) = tracer_provider();
    let emitter = RecordEmitter::builder(OpenTelemetryLogSink::new(&logger_provider))
        .with_config(config(false))
        .build();

    let tracer = tracer_provider.tracer("checkout");
    let cx = Context::new().with_span(tracer.start("charge"));
    let span_context = cx.span().span_context().clone();

    let entry = LogEntry::new(Level::ERROR, "payment failed").with_stack("at charge()");
    emitter.emit(&entry, &[Field::context(cx.clone())]);
    cx.span().end();

    let spans = span_exporter.get_finished_spans().unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].status, Status::error("payment failed"));

    let logs = log_exporter.get_emitted_logs().unwrap();
    assert_eq!(logs.len(), 1);
    let record = &logs[0].record;
    assert_eq!(record.body(), Some(&string("payment failed")));
    assert_eq!(record.severity_number(), Some(Severity::Error));
    assert_eq!(
        attribute(record, "exception.stacktrace"),
        Some(&string("at charge()"))
    );

    let trace_context = record.trace_context().expect("trace context is set");
    assert_eq!(trace_context.trace_id, span_context.trace_id());
    assert_eq!(trace_context.span_id, span_context.span_id());
}

#[test]
fn warn_entry_leaves_span_status_untouched() {
    let (logger_provider, log_exporter) = logger_provider();
    let (tracer_provider, span_exporter) = tracer_provider();
    let emitter = RecordEmitter::builder(OpenTelemetryLogSink::new(&logger_provider))
        .with_config(config(false))
        .build();

    let cx = Context::new().with_span(tracer_provider.tracer("checkout").start("charge"));
    emitter.emit(
        &LogEntry::new(Level::WARN, "slow payment"),
        &[Field::context(cx.clone())],
    );
    cx.span().end();

    let spans = span_exporter.get_finished_spans().unwrap();
    assert_eq!(spans[0].status, Status::Unset);
    assert_eq!(log_exporter.get_emitted_logs().unwrap().len(), 1);
}

#[test]
fn error_entry_leaves_non_recording_span_untouched() {
    let (logger_provider, log_exporter) = logger_provider();
    let span_exporter = InMemorySpanExporter::default();
    let tracer_provider = SdkTracerProvider::builder()
        .with_sampler(Sampler::AlwaysOff)
        .with_simple_exporter(span_exporter.clone())
        .build();
    let emitter = RecordEmitter::builder(OpenTelemetryLogSink::new(&logger_provider))
        .with_config(config(false))
        .build();

    let cx = Context::new().with_span(tracer_provider.tracer("checkout").start("charge"));
    assert!(!cx.span().is_recording());

    emitter.emit(
        &LogEntry::new(Level::ERROR, "payment failed"),
        &[Field::context(cx.clone())],
    );
    cx.span().end();

    assert!(span_exporter.get_finished_spans().unwrap().is_empty());

    let logs = log_exporter.get_emitted_logs().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].record.body(), Some(&string("payment failed")));
    assert_eq!(logs[0].record.severity_number(), Some(Severity::Error));
}

#[test]
fn entry_without_context_ignores_the_current_span() {
    let (logger_provider, log_exporter) = logger_provider();
    let (tracer_provider, _span_exporter) = tracer_provider();
    let emitter = RecordEmitter::builder(OpenTelemetryLogSink::new(&logger_provider))
        .with_config(config(false))
        .build();

    let ambient = Context::new().with_span(tracer_provider.tracer("jobs").start("ambient"));
    {
        let _guard = ambient.clone().attach();
        emitter.emit(&LogEntry::new(Level::INFO, "no context"), &[]);
        emitter.emit(
            &LogEntry::new(Level::INFO, "context without span"),
            &[Field::context(Context::new())],
        );
        assert!(Context::current().has_active_span());
    }
    ambient.span().end();

    let logs = log_exporter.get_emitted_logs().unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs[0].record.trace_context().is_none());
    assert!(logs[1].record.trace_context().is_none());
}

#[test]
fn context_encoders_read_the_entry_context() {
    let (logger_provider, log_exporter) = logger_provider();
    let (tracer_provider, _span_exporter) = tracer_provider();

    let mut encoders = ContextEncoderRegistry::new();
    encoders.register(|cx| {
        let span = cx.span();
        let span_context = span.span_context();
        if span_context.is_valid() {
            Field::new("trace.sampled", span_context.is_sampled())
        } else {
            Field::skip()
        }
    });

    let emitter = RecordEmitter::builder(OpenTelemetryLogSink::new(&logger_provider))
        .with_config(config(false))
        .with_context_encoders(Arc::new(encoders))
        .build();

    let cx = Context::new().with_span(tracer_provider.tracer("jobs").start("run"));
    emitter.emit(
        &LogEntry::new(Level::INFO, "job started"),
        &[Field::context(cx.clone()), Field::new("job.id", "j-1")],
    );
    emitter.emit(&LogEntry::new(Level::INFO, "idle"), &[]);
    cx.span().end();

    let logs = log_exporter.get_emitted_logs().unwrap();
    assert_eq!(logs.len(), 2);

    let keys: Vec<&Key> = logs[0].record.attributes_iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec![
            &Key::from_static_str("job.id"),
            &Key::from_static_str("trace.sampled")
        ]
    );
    assert_eq!(
        attribute(&logs[0].record, "trace.sampled"),
        Some(&AnyValue::Boolean(true))
    );
    assert_eq!(logs[1].record.attributes_iter().count(), 0);
}

#[test]
fn emitting_after_shutdown_does_not_panic() {
    let (provider, _exporter) = logger_provider();
    let emitter = RecordEmitter::new(OpenTelemetryLogSink::new(&provider));

    provider.shutdown().unwrap();

    emitter.emit(
        &LogEntry::new(Level::FATAL, "Don't crash"),
        &[Field::object_marshaler("payload")],
    );
}
