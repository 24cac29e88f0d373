use std::fmt::UpperExp;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use opentelemetry::logs::AnyValue;
use opentelemetry::{otel_debug, Key};

use crate::{Field, FieldValue};

pub(crate) const EXCEPTION_TYPE: &str = "exception.type";
pub(crate) const EXCEPTION_MESSAGE: &str = "exception.message";

pub(crate) const ARRAY_MARSHALER_NOT_IMPLEMENTED: &str =
    "opentelemetry-appender-fields: array marshaler fields are not implemented";
pub(crate) const OBJECT_MARSHALER_NOT_IMPLEMENTED: &str =
    "opentelemetry-appender-fields: object marshaler fields are not implemented";

/// Converts `fields` into log record attributes.
///
/// Conversion never fails. A field that cannot be represented is replaced by
/// a `"<key>_error"` string attribute describing the problem, so the rest of
/// the entry is preserved.
pub fn convert_fields(fields: &[Field]) -> Vec<(Key, AnyValue)> {
    let mut attributes = Vec::with_capacity(fields.len());
    append_fields(&mut attributes, fields);
    attributes
}

pub(crate) fn append_fields(attributes: &mut Vec<(Key, AnyValue)>, fields: &[Field]) {
    for field in fields {
        append_field(attributes, field);
    }
}

fn append_field(attributes: &mut Vec<(Key, AnyValue)>, field: &Field) {
    let key = field.key();
    let value = match field.value() {
        FieldValue::Bool(v) => AnyValue::Boolean(*v),

        FieldValue::Int8(v) => AnyValue::Int(i64::from(*v)),
        FieldValue::Int16(v) => AnyValue::Int(i64::from(*v)),
        FieldValue::Int32(v) => AnyValue::Int(i64::from(*v)),
        FieldValue::Int64(v) => AnyValue::Int(*v),
        FieldValue::Uint8(v) => AnyValue::Int(i64::from(*v)),
        FieldValue::Uint16(v) => AnyValue::Int(i64::from(*v)),
        FieldValue::Uint32(v) => AnyValue::Int(i64::from(*v)),
        // Values above i64::MAX keep their bit pattern.
        FieldValue::Uint64(v) => AnyValue::Int(*v as i64),
        FieldValue::Uintptr(v) => AnyValue::Int(*v as i64),

        FieldValue::Float64(v) => AnyValue::Double(*v),
        FieldValue::Float32(v) => AnyValue::Double(f64::from(*v)),

        FieldValue::Complex64(re, im) => AnyValue::from(format_complex(*re, *im)),
        FieldValue::Complex128(re, im) => AnyValue::from(format_complex(*re, *im)),

        FieldValue::String(v) => AnyValue::from(v.clone()),
        FieldValue::Binary(v) | FieldValue::ByteString(v) => AnyValue::Bytes(Box::new(v.clone())),
        FieldValue::Stringer(v) => AnyValue::from(v.to_string()),

        FieldValue::Duration(v) | FieldValue::Time(v) => AnyValue::Int(*v),
        FieldValue::TimeFull(v) => AnyValue::from(format_time_full(v)),

        FieldValue::Error(err) => {
            attributes.push((
                Key::from_static_str(EXCEPTION_TYPE),
                AnyValue::from(err.type_name()),
            ));
            attributes.push((
                Key::from_static_str(EXCEPTION_MESSAGE),
                AnyValue::from(err.error().to_string()),
            ));
            return;
        }
        FieldValue::Reflect(v) => AnyValue::from(format!("{v:?}")),

        FieldValue::Skip | FieldValue::Context(_) => return,

        FieldValue::ArrayMarshaler => {
            return push_error(attributes, key, ARRAY_MARSHALER_NOT_IMPLEMENTED.to_owned());
        }
        FieldValue::ObjectMarshaler => {
            return push_error(attributes, key, OBJECT_MARSHALER_NOT_IMPLEMENTED.to_owned());
        }
        FieldValue::Unsupported(desc) => {
            return push_error(
                attributes,
                key,
                format!("opentelemetry-appender-fields: unknown field type: {desc}"),
            );
        }
    };
    attributes.push((key.clone(), value));
}

fn push_error(attributes: &mut Vec<(Key, AnyValue)>, key: &Key, message: String) {
    otel_debug!(
        name: "FieldConverter.Unsupported",
        key = key.as_str(),
        message = message.as_str()
    );
    attributes.push((
        Key::from(format!("{}_error", key.as_str())),
        AnyValue::from(message),
    ));
}

/// Formats a timestamp as RFC 3339 with up to nine fractional digits.
/// Trailing zeros of the fraction are dropped, and so is the fraction itself
/// when it is zero, e.g. `2024-01-02T03:04:05.5Z`.
fn format_time_full(time: &DateTime<FixedOffset>) -> String {
    let mut text = time.to_rfc3339_opts(SecondsFormat::Nanos, true);
    if let Some(dot) = text.find('.') {
        let fraction = &text[dot + 1..];
        let digits = fraction
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(fraction.len());
        let end = dot + 1 + digits;
        let kept = text[dot + 1..end].trim_end_matches('0').len();
        let cut = if kept == 0 { dot } else { dot + 1 + kept };
        text.replace_range(cut..end, "");
    }
    text
}

/// Formats a complex number as `(<re><im>i)`, each component in scientific
/// notation with the shortest digits that round-trip at its precision and a
/// signed exponent of at least two digits, e.g. `(1.5E+00-2E+00i)`.
fn format_complex<T: UpperExp>(re: T, im: T) -> String {
    let re = scientific(re);
    let mut im = scientific(im);
    if !im.starts_with(['+', '-']) {
        im.insert(0, '+');
    }
    format!("({re}{im}i)")
}

fn scientific(value: impl UpperExp) -> String {
    let text = format!("{value:E}");
    match text.as_str() {
        "NaN" => text,
        "inf" => "+Inf".to_owned(),
        "-inf" => "-Inf".to_owned(),
        _ => match text.split_once('E') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{mantissa}E{sign}{digits:0>2}")
            }
            None => text,
        },
    }
}
