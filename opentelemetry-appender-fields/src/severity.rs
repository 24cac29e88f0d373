use opentelemetry::logs::Severity;

use crate::Level;

/// Maps a logger [`Level`] to the OpenTelemetry [`Severity`].
///
/// Levels outside the well-known set have no severity; the record is then
/// emitted with an unspecified severity number.
pub fn map_severity_to_otel_severity(level: Level) -> Option<Severity> {
    match level {
        Level::DEBUG => Some(Severity::Debug),
        Level::INFO => Some(Severity::Info),
        Level::WARN => Some(Severity::Warn),
        Level::ERROR => Some(Severity::Error),
        Level::DPANIC => Some(Severity::Fatal),
        Level::PANIC => Some(Severity::Fatal2),
        Level::FATAL => Some(Severity::Fatal3),
        _ => None,
    }
}
