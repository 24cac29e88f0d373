//! Typed key/value fields handed over by the upstream logger.
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, FixedOffset, Utc};
use opentelemetry::{Context, Key};

/// Key used by [`Field::context`].
pub const CONTEXT_FIELD_KEY: &str = "context";

/// A single structured logging field.
#[derive(Clone, Debug)]
pub struct Field {
    key: Key,
    value: FieldValue,
}

/// Payload of a [`Field`]. The variant fully determines how the field is
/// turned into log record attributes.
#[derive(Clone)]
#[non_exhaustive]
pub enum FieldValue {
    /// A boolean.
    Bool(bool),
    /// An 8-bit signed integer.
    Int8(i8),
    /// A 16-bit signed integer.
    Int16(i16),
    /// A 32-bit signed integer.
    Int32(i32),
    /// A 64-bit signed integer.
    Int64(i64),
    /// An 8-bit unsigned integer.
    Uint8(u8),
    /// A 16-bit unsigned integer.
    Uint16(u16),
    /// A 32-bit unsigned integer.
    Uint32(u32),
    /// A 64-bit unsigned integer.
    Uint64(u64),
    /// A pointer-sized unsigned integer.
    Uintptr(usize),
    /// A single precision float.
    Float32(f32),
    /// A double precision float.
    Float64(f64),
    /// A complex number with single precision components `(re, im)`.
    Complex64(f32, f32),
    /// A complex number with double precision components `(re, im)`.
    Complex128(f64, f64),
    /// A UTF-8 string.
    String(Cow<'static, str>),
    /// Opaque binary data.
    Binary(Vec<u8>),
    /// UTF-8 encoded text kept as raw bytes.
    ByteString(Vec<u8>),
    /// A value rendered through its [`fmt::Display`] implementation.
    Stringer(Arc<dyn fmt::Display + Send + Sync>),
    /// A duration in the caller's unit (nanoseconds for [`From<Duration>`]).
    Duration(i64),
    /// A compact timestamp in the caller's unit (Unix nanoseconds by convention).
    Time(i64),
    /// A full timestamp with its UTC offset.
    TimeFull(DateTime<FixedOffset>),
    /// An error, with the name of its concrete type.
    Error(ErrorValue),
    /// A value rendered through its [`fmt::Debug`] implementation.
    Reflect(Arc<dyn fmt::Debug + Send + Sync>),
    /// The request-scoped context of the entry.
    Context(Context),
    /// A nested array value. Not supported by the converter.
    ArrayMarshaler,
    /// A nested object value. Not supported by the converter.
    ObjectMarshaler,
    /// A field that carries nothing.
    Skip,
    /// A field whose type is not recognized; carries a description of it.
    Unsupported(Cow<'static, str>),
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            FieldValue::Int8(v) => f.debug_tuple("Int8").field(v).finish(),
            FieldValue::Int16(v) => f.debug_tuple("Int16").field(v).finish(),
            FieldValue::Int32(v) => f.debug_tuple("Int32").field(v).finish(),
            FieldValue::Int64(v) => f.debug_tuple("Int64").field(v).finish(),
            FieldValue::Uint8(v) => f.debug_tuple("Uint8").field(v).finish(),
            FieldValue::Uint16(v) => f.debug_tuple("Uint16").field(v).finish(),
            FieldValue::Uint32(v) => f.debug_tuple("Uint32").field(v).finish(),
            FieldValue::Uint64(v) => f.debug_tuple("Uint64").field(v).finish(),
            FieldValue::Uintptr(v) => f.debug_tuple("Uintptr").field(v).finish(),
            FieldValue::Float32(v) => f.debug_tuple("Float32").field(v).finish(),
            FieldValue::Float64(v) => f.debug_tuple("Float64").field(v).finish(),
            FieldValue::Complex64(re, im) => {
                f.debug_tuple("Complex64").field(re).field(im).finish()
            }
            FieldValue::Complex128(re, im) => {
                f.debug_tuple("Complex128").field(re).field(im).finish()
            }
            FieldValue::String(v) => f.debug_tuple("String").field(v).finish(),
            FieldValue::Binary(v) => f.debug_tuple("Binary").field(v).finish(),
            FieldValue::ByteString(v) => f.debug_tuple("ByteString").field(v).finish(),
            FieldValue::Stringer(v) => f
                .debug_tuple("Stringer")
                .field(&format_args!("{v}"))
                .finish(),
            FieldValue::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            FieldValue::Time(v) => f.debug_tuple("Time").field(v).finish(),
            FieldValue::TimeFull(v) => f.debug_tuple("TimeFull").field(v).finish(),
            FieldValue::Error(v) => f.debug_tuple("Error").field(v).finish(),
            FieldValue::Reflect(v) => f.debug_tuple("Reflect").field(v).finish(),
            FieldValue::Context(v) => f.debug_tuple("Context").field(v).finish(),
            FieldValue::ArrayMarshaler => f.write_str("ArrayMarshaler"),
            FieldValue::ObjectMarshaler => f.write_str("ObjectMarshaler"),
            FieldValue::Skip => f.write_str("Skip"),
            FieldValue::Unsupported(v) => f.debug_tuple("Unsupported").field(v).finish(),
        }
    }
}

/// An error captured in a field, together with its concrete type name.
#[derive(Clone, Debug)]
pub struct ErrorValue {
    type_name: &'static str,
    error: Arc<dyn Error + Send + Sync>,
}

impl ErrorValue {
    /// Captures `error` and the name of its concrete type.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        ErrorValue {
            type_name: std::any::type_name::<E>(),
            error: Arc::new(error),
        }
    }

    /// Name of the concrete error type, as reported by [`std::any::type_name`].
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The wrapped error.
    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.error.as_ref()
    }
}

/// Type tags of the compact field encoding, where every numeric payload
/// shares a single `i64` slot. See [`Field::from_packed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FieldType {
    /// No type was set.
    Unknown,
    /// Nested array value.
    ArrayMarshaler,
    /// Nested object value.
    ObjectMarshaler,
    /// Opaque binary data.
    Binary,
    /// Boolean, `0` is false.
    Bool,
    /// UTF-8 text as bytes.
    ByteString,
    /// Double precision complex number.
    Complex128,
    /// Single precision complex number.
    Complex64,
    /// Duration in the caller's unit.
    Duration,
    /// Bits of an IEEE-754 double.
    Float64,
    /// Low 32 bits hold an IEEE-754 single.
    Float32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit signed integer.
    Int32,
    /// 16-bit signed integer.
    Int16,
    /// 8-bit signed integer.
    Int8,
    /// UTF-8 string.
    String,
    /// Compact timestamp in the caller's unit.
    Time,
    /// Timestamp with location.
    TimeFull,
    /// 64-bit unsigned integer.
    Uint64,
    /// 32-bit unsigned integer.
    Uint32,
    /// 16-bit unsigned integer.
    Uint16,
    /// 8-bit unsigned integer.
    Uint8,
    /// Pointer-sized unsigned integer.
    Uintptr,
    /// Arbitrary value rendered generically.
    Reflect,
    /// Opens a nested namespace.
    Namespace,
    /// Value rendered through its textual representation.
    Stringer,
    /// Error value.
    Error,
    /// Carries nothing.
    Skip,
    /// Object marshaled inline into its parent.
    InlineMarshaler,
    /// Request-scoped context.
    Context,
}

impl Field {
    /// Creates a new field.
    pub fn new(key: impl Into<Key>, value: impl Into<FieldValue>) -> Self {
        Field {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Decodes a field from the compact encoding, where the payload of every
    /// numeric type is stored in a single `i64`.
    ///
    /// Floats are bit-reinterpreted, narrower integers are truncated to their
    /// width. Types whose payload cannot live in an integer decode to
    /// [`FieldValue::Unsupported`].
    pub fn from_packed(key: impl Into<Key>, field_type: FieldType, integer: i64) -> Self {
        let value = match field_type {
            FieldType::Bool => FieldValue::Bool(integer != 0),
            FieldType::Int8 => FieldValue::Int8(integer as i8),
            FieldType::Int16 => FieldValue::Int16(integer as i16),
            FieldType::Int32 => FieldValue::Int32(integer as i32),
            FieldType::Int64 => FieldValue::Int64(integer),
            FieldType::Uint8 => FieldValue::Uint8(integer as u8),
            FieldType::Uint16 => FieldValue::Uint16(integer as u16),
            FieldType::Uint32 => FieldValue::Uint32(integer as u32),
            FieldType::Uint64 => FieldValue::Uint64(integer as u64),
            FieldType::Uintptr => FieldValue::Uintptr(integer as usize),
            FieldType::Float64 => FieldValue::Float64(f64::from_bits(integer as u64)),
            FieldType::Float32 => FieldValue::Float32(f32::from_bits(integer as u32)),
            FieldType::Duration => FieldValue::Duration(integer),
            FieldType::Time => FieldValue::Time(integer),
            FieldType::Skip => FieldValue::Skip,
            FieldType::ArrayMarshaler => FieldValue::ArrayMarshaler,
            FieldType::ObjectMarshaler => FieldValue::ObjectMarshaler,
            other => FieldValue::Unsupported(format!("{other:?}({integer})").into()),
        };
        Field {
            key: key.into(),
            value,
        }
    }

    /// A field with no content. Contributes nothing to the record.
    pub fn skip() -> Self {
        Field::new("", FieldValue::Skip)
    }

    /// Carries the request-scoped context of the entry under
    /// [`CONTEXT_FIELD_KEY`].
    pub fn context(cx: Context) -> Self {
        Field::new(CONTEXT_FIELD_KEY, FieldValue::Context(cx))
    }

    /// An error field. The concrete type of `error` is recorded as
    /// `exception.type`.
    pub fn error<E>(key: impl Into<Key>, error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Field::new(key, FieldValue::Error(ErrorValue::new(error)))
    }

    /// A field rendered through `Display` at conversion time.
    pub fn stringer<T>(key: impl Into<Key>, value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        Field::new(key, FieldValue::Stringer(Arc::new(value)))
    }

    /// A field rendered through `Debug` at conversion time.
    pub fn reflect<T>(key: impl Into<Key>, value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Field::new(key, FieldValue::Reflect(Arc::new(value)))
    }

    /// UTF-8 text kept as bytes.
    pub fn byte_string(key: impl Into<Key>, value: impl Into<Vec<u8>>) -> Self {
        Field::new(key, FieldValue::ByteString(value.into()))
    }

    /// A single precision complex number.
    pub fn complex64(key: impl Into<Key>, re: f32, im: f32) -> Self {
        Field::new(key, FieldValue::Complex64(re, im))
    }

    /// A double precision complex number.
    pub fn complex128(key: impl Into<Key>, re: f64, im: f64) -> Self {
        Field::new(key, FieldValue::Complex128(re, im))
    }

    /// A compact timestamp, passed through unchanged.
    pub fn time_compact(key: impl Into<Key>, value: i64) -> Self {
        Field::new(key, FieldValue::Time(value))
    }

    /// A nested array. Emitted as a diagnostic attribute only.
    pub fn array_marshaler(key: impl Into<Key>) -> Self {
        Field::new(key, FieldValue::ArrayMarshaler)
    }

    /// A nested object. Emitted as a diagnostic attribute only.
    pub fn object_marshaler(key: impl Into<Key>) -> Self {
        Field::new(key, FieldValue::ObjectMarshaler)
    }

    /// The key of this field.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The payload of this field.
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub(crate) fn as_context(&self) -> Option<&Context> {
        match &self.value {
            FieldValue::Context(cx) => Some(cx),
            _ => None,
        }
    }

    pub(crate) fn is_skip(&self) -> bool {
        matches!(self.value, FieldValue::Skip)
    }
}

macro_rules! impl_trivial_from {
    ($t:ty, $variant:path) => {
        impl From<$t> for FieldValue {
            fn from(val: $t) -> FieldValue {
                $variant(val.into())
            }
        }
    };
}

impl_trivial_from!(bool, FieldValue::Bool);

impl_trivial_from!(i8, FieldValue::Int8);
impl_trivial_from!(i16, FieldValue::Int16);
impl_trivial_from!(i32, FieldValue::Int32);
impl_trivial_from!(i64, FieldValue::Int64);

impl_trivial_from!(u8, FieldValue::Uint8);
impl_trivial_from!(u16, FieldValue::Uint16);
impl_trivial_from!(u32, FieldValue::Uint32);
impl_trivial_from!(u64, FieldValue::Uint64);
impl_trivial_from!(usize, FieldValue::Uintptr);

impl_trivial_from!(f32, FieldValue::Float32);
impl_trivial_from!(f64, FieldValue::Float64);

impl_trivial_from!(String, FieldValue::String);
impl_trivial_from!(&'static str, FieldValue::String);
impl_trivial_from!(Cow<'static, str>, FieldValue::String);

impl_trivial_from!(Vec<u8>, FieldValue::Binary);

impl_trivial_from!(DateTime<FixedOffset>, FieldValue::TimeFull);
impl_trivial_from!(DateTime<Utc>, FieldValue::TimeFull);

impl_trivial_from!(Context, FieldValue::Context);

impl From<SystemTime> for FieldValue {
    fn from(val: SystemTime) -> FieldValue {
        FieldValue::TimeFull(DateTime::<Utc>::from(val).into())
    }
}

impl From<Duration> for FieldValue {
    /// Stores the duration as nanoseconds, saturating at `i64::MAX`.
    fn from(val: Duration) -> FieldValue {
        FieldValue::Duration(i64::try_from(val.as_nanos()).unwrap_or(i64::MAX))
    }
}
