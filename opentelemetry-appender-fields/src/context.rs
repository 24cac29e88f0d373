use std::fmt;

use opentelemetry::{otel_debug, Context};

use crate::Field;

/// Derives one additional field from the request-scoped [`Context`] of an
/// entry, e.g. a request id stored in it.
///
/// Encoders run synchronously on the logging thread for every entry that
/// carries a context. They must be cheap and must not block.
pub type ContextEncoder = Box<dyn Fn(&Context) -> Field + Send + Sync>;

/// Ordered set of [`ContextEncoder`]s.
///
/// Encoders are registered while the registry is exclusively owned, typically
/// during application start-up. The registry is then shared (for instance
/// behind an `Arc`) with a [`RecordEmitter`](crate::RecordEmitter) and is
/// read-only from that point on.
#[derive(Default)]
pub struct ContextEncoderRegistry {
    encoders: Vec<ContextEncoder>,
}

impl ContextEncoderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `encoder`. Encoders run in registration order; duplicates are
    /// not detected.
    pub fn register<F>(&mut self, encoder: F)
    where
        F: Fn(&Context) -> Field + Send + Sync + 'static,
    {
        self.encoders.push(Box::new(encoder));
        otel_debug!(
            name: "ContextEncoderRegistry.Register",
            encoder_count = self.encoders.len()
        );
    }

    /// Number of registered encoders.
    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    /// Returns `true` if no encoder is registered.
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Runs every encoder against `cx` and collects the resulting fields.
    ///
    /// Returns an empty vector, without allocating, when there is no context
    /// or no encoder. Fields of kind [`Skip`](crate::FieldValue::Skip) are
    /// dropped.
    pub fn fields_from_context(&self, cx: Option<&Context>) -> Vec<Field> {
        let Some(cx) = cx else {
            return Vec::new();
        };
        self.encoders
            .iter()
            .map(|encoder| encoder(cx))
            .filter(|field| !field.is_skip())
            .collect()
    }
}

impl fmt::Debug for ContextEncoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextEncoderRegistry")
            .field("encoders", &self.encoders.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldValue;
    use opentelemetry::KeyValue;

    #[derive(Debug, Clone, PartialEq)]
    struct RequestId(&'static str);

    #[test]
    fn no_context_yields_no_fields() {
        let mut registry = ContextEncoderRegistry::new();
        registry.register(|_| Field::new("always", true));

        let fields = registry.fields_from_context(None);
        assert!(fields.is_empty());
        assert_eq!(fields.capacity(), 0);
    }

    #[test]
    fn empty_registry_yields_no_fields() {
        let registry = ContextEncoderRegistry::new();
        assert!(registry.is_empty());

        let cx = Context::new().with_value(RequestId("abc"));
        assert!(registry.fields_from_context(Some(&cx)).is_empty());
    }

    #[test]
    fn encoders_run_in_registration_order() {
        let mut registry = ContextEncoderRegistry::new();
        registry.register(|cx| match cx.get::<RequestId>() {
            Some(id) => Field::new("request.id", id.0),
            None => Field::skip(),
        });
        registry.register(|_| Field::new("second", 2i64));
        registry.register(|cx| match cx.get::<KeyValue>() {
            Some(kv) => Field::new(kv.key.clone(), kv.value.to_string()),
            None => Field::skip(),
        });
        assert_eq!(registry.len(), 3);

        let cx = Context::new().with_value(RequestId("abc"));
        let fields = registry.fields_from_context(Some(&cx));

        let keys: Vec<&str> = fields.iter().map(|f| f.key().as_str()).collect();
        assert_eq!(keys, vec!["request.id", "second"]);
        assert!(matches!(fields[0].value(), FieldValue::String(id) if id == "abc"));
    }

    #[test]
    fn debug_lists_encoder_count() {
        let mut registry = ContextEncoderRegistry::new();
        registry.register(|_| Field::skip());
        assert_eq!(
            format!("{registry:?}"),
            "ContextEncoderRegistry { encoders: 1 }"
        );
    }
}
