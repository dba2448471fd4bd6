mod compare;
mod hash;
mod tag;

use crate::{
    codec::{
        CodecError, WireObject, WireReader, WireWriter,
        registry::{WireObjectFactory, factory_id},
    },
    serialize,
};
use serde::{Deserialize, Serialize};
use std::any::Any;

// re-exports
pub use compare::strict_order_cmp;
pub use hash::stable_hash;
pub use tag::ValueTag;

///
/// CONSTANTS
///

/// Decode bound for a single nested value body on the wire.
pub const MAX_VALUE_BYTES: usize = 1 << 20;

// Nested value bodies carry a single wire type id; the variant is encoded in
// the CBOR body itself.
const VALUE_TYPE_ID: i32 = 0;

///
/// Value
///
/// Opaque grid value usable as an entry key or entry value.
///
/// Keys and values travel the wire as type-erased nested objects; the typed
/// variant surface exists only on the client API. `Bool`, `Int`, `Text`, and
/// `Uint` carry a natural order (see [`strict_order_cmp`]); the remaining
/// variants are storable but not naturally orderable.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Value {
    Blob(#[serde(with = "serde_bytes")] Vec<u8>),
    Bool(bool),
    Int(i64),
    List(Vec<Value>),
    Null,
    Text(String),
    Uint(u64),
}

impl Value {
    /// Stable canonical variant tag.
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        tag::canonical_tag(self)
    }

    /// Stable variant label for diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.tag().label()
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl WireObject for Value {
    fn factory_id(&self) -> i32 {
        factory_id::VALUE
    }

    fn type_id(&self) -> i32 {
        VALUE_TYPE_ID
    }

    fn write_to(&self, writer: &mut WireWriter) -> Result<(), CodecError> {
        let body = serialize::serialize(self)?;
        writer.write_len(body.len())?;
        writer.write_bytes(&body);
        Ok(())
    }

    fn read_from(&mut self, reader: &mut WireReader<'_>) -> Result<(), CodecError> {
        let len = reader.read_len()?;
        let body = reader.take(len)?;
        *self = serialize::deserialize_bounded(body, MAX_VALUE_BYTES)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

///
/// ValueFactory
///
/// Registry factory for nested value objects.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ValueFactory;

impl WireObjectFactory for ValueFactory {
    fn create(&self, type_id: i32) -> Option<Box<dyn WireObject>> {
        (type_id == VALUE_TYPE_ID).then(|| Box::new(Value::Null) as Box<dyn WireObject>)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn conversions_produce_the_expected_variants() {
        assert_eq!(Value::from(3i64), Value::Int(3));
        assert_eq!(Value::from(3u64), Value::Uint(3));
        assert_eq!(Value::from("x"), Value::Text("x".into()));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(vec![1u8]), Value::Blob(vec![1]));
    }

    #[test]
    fn labels_are_variant_names() {
        assert_eq!(Value::Null.label(), "Null");
        assert_eq!(Value::Int(0).label(), "Int");
        assert_eq!(Value::List(vec![]).label(), "List");
    }
}
