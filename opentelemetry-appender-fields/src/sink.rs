use opentelemetry::logs::{AnyValue, LogRecord, Logger, LoggerProvider};
use opentelemetry::trace::TraceContextExt;
use opentelemetry::{Context, InstrumentationScope};

use crate::TelemetryRecord;

const INSTRUMENTATION_LIBRARY_NAME: &str = "opentelemetry-appender-fields";

/// Destination of finished [`TelemetryRecord`]s.
///
/// Emission is fire-and-forget: a sink reports transport problems through
/// its own channels, never to the caller.
pub trait LogSink: Send + Sync {
    /// Emits `record`, associated with `cx` rather than the current context.
    fn emit(&self, cx: &Context, record: TelemetryRecord);
}

/// A [`LogSink`] writing records to an OpenTelemetry [`Logger`].
pub struct OpenTelemetryLogSink<P, L>
where
    P: LoggerProvider<Logger = L> + Send + Sync,
    L: Logger + Send + Sync,
{
    logger: L,
    _phantom: std::marker::PhantomData<P>, // P is not used.
}

impl<P, L> OpenTelemetryLogSink<P, L>
where
    P: LoggerProvider<Logger = L> + Send + Sync,
    L: Logger + Send + Sync,
{
    /// Creates a sink using a logger obtained from `provider`.
    pub fn new(provider: &P) -> Self {
        let scope = InstrumentationScope::builder(INSTRUMENTATION_LIBRARY_NAME)
            .with_version(env!("CARGO_PKG_VERSION"))
            .build();

        OpenTelemetryLogSink {
            logger: provider.logger_with_scope(scope),
            _phantom: Default::default(),
        }
    }
}

impl<P, L> LogSink for OpenTelemetryLogSink<P, L>
where
    P: LoggerProvider<Logger = L> + Send + Sync,
    L: Logger + Send + Sync,
{
    fn emit(&self, cx: &Context, record: TelemetryRecord) {
        let mut log_record = self.logger.create_log_record();

        log_record.set_body(AnyValue::from(record.body));
        if let Some(severity) = record.severity {
            log_record.set_severity_number(severity);
        }
        if let Some(text) = record.severity_text {
            log_record.set_severity_text(text);
        }
        if let Some(timestamp) = record.timestamp {
            log_record.set_timestamp(timestamp);
        }

        let span = cx.span();
        let span_context = span.span_context();
        if span_context.is_valid() {
            log_record.set_trace_context(
                span_context.trace_id(),
                span_context.span_id(),
                Some(span_context.trace_flags()),
            );
        }

        if !record.attributes.is_empty() {
            log_record.add_attributes(record.attributes);
        }

        // The SDK fills a missing trace context from the current context.
        let _guard = cx.clone().attach();
        self.logger.emit(log_record);
    }
}

impl<S> LogSink for std::sync::Arc<S>
where
    S: LogSink + ?Sized,
{
    fn emit(&self, cx: &Context, record: TelemetryRecord) {
        (**self).emit(cx, record)
    }
}
