use crate::value::Value;

///
/// Entry
///
/// A key/value pair returned from a grid query. Keys are unique within any
/// one result set.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub key: Value,
    pub value: Value,
}

impl Entry {
    #[must_use]
    pub fn new(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<(Value, Value)> for Entry {
    fn from((key, value): (Value, Value)) -> Self {
        Self { key, value }
    }
}

///
/// TESTS
///
