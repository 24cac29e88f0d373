//! # OpenTelemetry-Appender-Fields
//!
//! This crate provides a bridge between structured loggers that describe
//! their context as typed key/value fields and OpenTelemetry logs. It
//! converts a finished log entry and its fields into an OpenTelemetry
//! `LogRecord`, and enriches the record with request-scoped metadata taken
//! from an OpenTelemetry [`Context`](opentelemetry::Context).
//!
//! ## Background
//!
//! OpenTelemetry does not provide a dedicated logging API for end-users.
//! Instead, it recommends bridging existing logging libraries to OpenTelemetry
//! logs. Many structured loggers share the same shape: an entry (level,
//! message, caller, stack) plus a list of typed fields. This crate is the
//! translation step for that shape. It does not decide *whether* an entry is
//! logged; filtering and sampling happen upstream.
//!
//! ## Getting Started
//!
//! ### 1. Set Up the OpenTelemetry Logger Provider
//!
//! ```rust
//! use opentelemetry_sdk::logs::{InMemoryLogExporter, SdkLoggerProvider};
//!
//! let exporter = InMemoryLogExporter::default();
//! let provider = SdkLoggerProvider::builder()
//!     .with_simple_exporter(exporter)
//!     .build();
//! ```
//!
//! ### 2. Register Context Encoders
//!
//! Context encoders derive additional fields from the context of an entry.
//! Register them before logging starts; the registry is read-only once shared.
//!
//! ```rust
//! use opentelemetry_appender_fields::{ContextEncoderRegistry, Field};
//!
//! #[derive(Debug)]
//! struct TenantId(&'static str);
//!
//! let mut encoders = ContextEncoderRegistry::new();
//! encoders.register(|cx| match cx.get::<TenantId>() {
//!     Some(tenant) => Field::new("tenant.id", tenant.0),
//!     None => Field::skip(),
//! });
//! ```
//!
//! ### 3. Create the Record Emitter and Emit Entries
//!
//! ```rust
//! # use opentelemetry_sdk::logs::{InMemoryLogExporter, SdkLoggerProvider};
//! # use opentelemetry_appender_fields::ContextEncoderRegistry;
//! # let provider = SdkLoggerProvider::builder()
//! #     .with_simple_exporter(InMemoryLogExporter::default())
//! #     .build();
//! # let encoders = ContextEncoderRegistry::new();
//! use std::sync::Arc;
//! use opentelemetry::Context;
//! use opentelemetry_appender_fields::{
//!     EmitterConfigBuilder, Field, Level, LogEntry, OpenTelemetryLogSink, RecordEmitter,
//! };
//!
//! let emitter = RecordEmitter::builder(OpenTelemetryLogSink::new(&provider))
//!     .with_config(EmitterConfigBuilder::default().with_caller(true).build())
//!     .with_context_encoders(Arc::new(encoders))
//!     .build();
//!
//! emitter.emit(
//!     &LogEntry::new(Level::ERROR, "payment failed"),
//!     &[
//!         Field::new("order.id", 1234i64),
//!         Field::new("retryable", false),
//!         Field::context(Context::current()),
//!     ],
//! );
//! ```
//!
//! ## Mapping details
//!
//! | Entry           | OpenTelemetry             | Notes |
//! |-----------------|---------------------------|-------|
//! | message         | `Body`                    | |
//! | level           | `Severity`, `SeverityText`| See below |
//! | time            | `Timestamp`               | |
//! | stack           | `exception.stacktrace`    | Only at or above the configured stack trace level |
//! | caller          | `code.function`, `code.filepath`, `code.lineno` | Only if caller capture is enabled |
//! | fields          | `Attributes`              | See below |
//! | context field   | `TraceId`, `SpanId`, `TraceFlags` | From the span of the context, if any |
//!
//! ### Level Mapping
//!
//! | Level    | `Severity` |
//! |----------|------------|
//! | `DEBUG`  | `Debug`    |
//! | `INFO`   | `Info`     |
//! | `WARN`   | `Warn`     |
//! | `ERROR`  | `Error`    |
//! | `DPANIC` | `Fatal`    |
//! | `PANIC`  | `Fatal2`   |
//! | `FATAL`  | `Fatal3`   |
//! | other    | unspecified |
//!
//! ### Data Type Mapping
//!
//! | Field value | OpenTelemetry `AnyValue` Type |
//! |-------------|-------------------------------|
//! | `bool`      | `Boolean` |
//! | `i8`..`i64`, `u8`..`u64`, `usize` | `Int` (`u64` values above `i64::MAX` keep their bit pattern) |
//! | `f32`, `f64` | `Double` |
//! | complex     | `String`, e.g. `(1.5E+00-2E+00i)` |
//! | string      | `String` |
//! | binary, byte string | `Bytes` |
//! | `Display` / `Debug` values | `String` |
//! | duration, compact time | `Int`, unchanged |
//! | full time   | `String`, RFC 3339, trailing fractional zeros dropped |
//! | error       | two attributes: `exception.type` and `exception.message` |
//! | skip, context | nothing |
//! | array / object marshaler, unknown | `String` attribute `<key>_error` describing the limitation |
//!
//! When an entry at or above the error status level (`ERROR` by default)
//! carries a context with a recording span, the span status is set to
//! `Error` with the entry message as description.
//!
//! ## Feature Flags
//!
//! `internal-logs` (enabled by default): emits diagnostics about degraded
//! conversions and configuration through OpenTelemetry's internal logging.
//!
//! ## Further Reading
//!
//! - OpenTelemetry Rust: [opentelemetry-rust](https://github.com/open-telemetry/opentelemetry-rust)
//! - OpenTelemetry Logs: [OpenTelemetry Logging Specification](https://opentelemetry.io/docs/specs/otel/logs/)
mod config;
mod context;
mod convert;
mod emitter;
mod field;
mod level;
mod record;
mod severity;
mod sink;

pub use config::{EmitterConfig, EmitterConfigBuilder};
pub use context::{ContextEncoder, ContextEncoderRegistry};
pub use convert::convert_fields;
pub use emitter::{RecordEmitter, RecordEmitterBuilder};
pub use field::{ErrorValue, Field, FieldType, FieldValue, CONTEXT_FIELD_KEY};
pub use level::{Level, ParseLevelError};
pub use record::{Caller, LogEntry, TelemetryRecord};
pub use severity::map_severity_to_otel_severity;
pub use sink::{LogSink, OpenTelemetryLogSink};
