pub mod paging;

use crate::{
    codec::{
        CodecError, WireObject, WireReader, WireWriter,
        registry::{WireObjectFactory, factory_id},
    },
    value::Value,
};
use std::{
    any::Any,
    ops::{BitAnd, BitOr},
};

// re-exports
pub use paging::{AnchorRecord, PagingPredicate, PredicateError};

///
/// Predicate type ids.
///
/// Fixed by the wire contract; peers dispatch on these values. Do not
/// renumber.
///

pub mod predicate_type {
    pub const SQL: i32 = 0;
    pub const AND: i32 = 1;
    pub const BETWEEN: i32 = 2;
    pub const EQUAL: i32 = 3;
    pub const GREATER_LESS: i32 = 4;
    pub const LIKE: i32 = 5;
    pub const ILIKE: i32 = 6;
    pub const IN: i32 = 7;
    pub const INSTANCE_OF: i32 = 8;
    pub const NOT_EQUAL: i32 = 9;
    pub const NOT: i32 = 10;
    pub const OR: i32 = 11;
    pub const REGEX: i32 = 12;
    pub const FALSE: i32 = 13;
    pub const TRUE: i32 = 14;
    pub const PAGING: i32 = 15;
}

///
/// Predicate
///
/// Tagged tree of filter nodes. The tree is constructed on the client,
/// serialized through the codec, and reconstructed by the server; evaluation
/// happens server-side, so no `eval` surface exists here.
///

#[derive(Clone, Debug)]
pub enum Predicate {
    Sql(String),
    And(Vec<Predicate>),
    Between {
        attribute: String,
        from: Value,
        to: Value,
    },
    Equal {
        attribute: String,
        value: Value,
    },
    GreaterLess {
        attribute: String,
        value: Value,
        equal: bool,
        less: bool,
    },
    Like {
        attribute: String,
        pattern: String,
    },
    ILike {
        attribute: String,
        pattern: String,
    },
    In {
        attribute: String,
        values: Vec<Value>,
    },
    InstanceOf {
        class_name: String,
    },
    NotEqual {
        attribute: String,
        value: Value,
    },
    Not(Box<Predicate>),
    Or(Vec<Predicate>),
    Regex {
        attribute: String,
        pattern: String,
    },
    False,
    True,
    Paging(PagingPredicate),
}

impl Predicate {
    #[must_use]
    pub fn sql(query: impl Into<String>) -> Self {
        Self::Sql(query.into())
    }

    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(child: Self) -> Self {
        Self::Not(Box::new(child))
    }

    #[must_use]
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equal {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn not_equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::NotEqual {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn between(
        attribute: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        Self::Between {
            attribute: attribute.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    #[must_use]
    pub fn greater_less(
        attribute: impl Into<String>,
        value: impl Into<Value>,
        equal: bool,
        less: bool,
    ) -> Self {
        Self::GreaterLess {
            attribute: attribute.into(),
            value: value.into(),
            equal,
            less,
        }
    }

    #[must_use]
    pub fn greater(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::greater_less(attribute, value, false, false)
    }

    #[must_use]
    pub fn greater_equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::greater_less(attribute, value, true, false)
    }

    #[must_use]
    pub fn less(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::greater_less(attribute, value, false, true)
    }

    #[must_use]
    pub fn less_equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::greater_less(attribute, value, true, true)
    }

    #[must_use]
    pub fn like(attribute: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Like {
            attribute: attribute.into(),
            pattern: pattern.into(),
        }
    }

    #[must_use]
    pub fn ilike(attribute: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::ILike {
            attribute: attribute.into(),
            pattern: pattern.into(),
        }
    }

    #[must_use]
    pub fn in_(attribute: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In {
            attribute: attribute.into(),
            values,
        }
    }

    #[must_use]
    pub fn instance_of(class_name: impl Into<String>) -> Self {
        Self::InstanceOf {
            class_name: class_name.into(),
        }
    }

    #[must_use]
    pub fn regex(attribute: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Regex {
            attribute: attribute.into(),
            pattern: pattern.into(),
        }
    }

    /// Fixed wire type id of this node.
    #[must_use]
    pub const fn predicate_type(&self) -> i32 {
        match self {
            Self::Sql(_) => predicate_type::SQL,
            Self::And(_) => predicate_type::AND,
            Self::Between { .. } => predicate_type::BETWEEN,
            Self::Equal { .. } => predicate_type::EQUAL,
            Self::GreaterLess { .. } => predicate_type::GREATER_LESS,
            Self::Like { .. } => predicate_type::LIKE,
            Self::ILike { .. } => predicate_type::ILIKE,
            Self::In { .. } => predicate_type::IN,
            Self::InstanceOf { .. } => predicate_type::INSTANCE_OF,
            Self::NotEqual { .. } => predicate_type::NOT_EQUAL,
            Self::Not(_) => predicate_type::NOT,
            Self::Or(_) => predicate_type::OR,
            Self::Regex { .. } => predicate_type::REGEX,
            Self::False => predicate_type::FALSE,
            Self::True => predicate_type::TRUE,
            Self::Paging(_) => predicate_type::PAGING,
        }
    }

    // Empty instance for one wire type id, ready for `read_from`.
    pub(crate) fn empty(type_id: i32) -> Option<Self> {
        let predicate = match type_id {
            predicate_type::SQL => Self::Sql(String::new()),
            predicate_type::AND => Self::And(Vec::new()),
            predicate_type::BETWEEN => Self::Between {
                attribute: String::new(),
                from: Value::Null,
                to: Value::Null,
            },
            predicate_type::EQUAL => Self::Equal {
                attribute: String::new(),
                value: Value::Null,
            },
            predicate_type::GREATER_LESS => Self::GreaterLess {
                attribute: String::new(),
                value: Value::Null,
                equal: false,
                less: false,
            },
            predicate_type::LIKE => Self::Like {
                attribute: String::new(),
                pattern: String::new(),
            },
            predicate_type::ILIKE => Self::ILike {
                attribute: String::new(),
                pattern: String::new(),
            },
            predicate_type::IN => Self::In {
                attribute: String::new(),
                values: Vec::new(),
            },
            predicate_type::INSTANCE_OF => Self::InstanceOf {
                class_name: String::new(),
            },
            predicate_type::NOT_EQUAL => Self::NotEqual {
                attribute: String::new(),
                value: Value::Null,
            },
            predicate_type::NOT => Self::Not(Box::new(Self::True)),
            predicate_type::OR => Self::Or(Vec::new()),
            predicate_type::REGEX => Self::Regex {
                attribute: String::new(),
                pattern: String::new(),
            },
            predicate_type::FALSE => Self::False,
            predicate_type::TRUE => Self::True,
            predicate_type::PAGING => Self::Paging(PagingPredicate::empty()),
            _ => return None,
        };

        Some(predicate)
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

// Require a present nested value where the wire contract forbids null.
fn read_value(reader: &mut WireReader<'_>) -> Result<Value, CodecError> {
    reader
        .read_object_as::<Value>()?
        .ok_or_else(|| CodecError::malformed("unexpected null value object"))
}

// Require a present nested predicate where the wire contract forbids null.
fn read_child(reader: &mut WireReader<'_>) -> Result<Predicate, CodecError> {
    reader
        .read_object_as::<Predicate>()?
        .ok_or_else(|| CodecError::malformed("unexpected null predicate object"))
}

fn read_children(reader: &mut WireReader<'_>) -> Result<Vec<Predicate>, CodecError> {
    let count = reader.read_len()?;
    let mut children = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        children.push(read_child(reader)?);
    }
    Ok(children)
}

fn write_children(writer: &mut WireWriter, children: &[Predicate]) -> Result<(), CodecError> {
    writer.write_len(children.len())?;
    for child in children {
        writer.write_object(Some(child))?;
    }
    Ok(())
}

fn read_values(reader: &mut WireReader<'_>) -> Result<Vec<Value>, CodecError> {
    let count = reader.read_len()?;
    let mut values = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        values.push(read_value(reader)?);
    }
    Ok(values)
}

impl WireObject for Predicate {
    fn factory_id(&self) -> i32 {
        factory_id::PREDICATE
    }

    fn type_id(&self) -> i32 {
        self.predicate_type()
    }

    fn write_to(&self, writer: &mut WireWriter) -> Result<(), CodecError> {
        match self {
            Self::Sql(query) => writer.write_utf(query),
            Self::And(children) | Self::Or(children) => write_children(writer, children),
            Self::Between {
                attribute,
                from,
                to,
            } => {
                writer.write_utf(attribute)?;
                writer.write_object(Some(from))?;
                writer.write_object(Some(to))
            }
            Self::Equal { attribute, value } | Self::NotEqual { attribute, value } => {
                writer.write_utf(attribute)?;
                writer.write_object(Some(value))
            }
            Self::GreaterLess {
                attribute,
                value,
                equal,
                less,
            } => {
                writer.write_utf(attribute)?;
                writer.write_object(Some(value))?;
                writer.write_bool(*equal);
                writer.write_bool(*less);
                Ok(())
            }
            Self::Like { attribute, pattern }
            | Self::ILike { attribute, pattern }
            | Self::Regex { attribute, pattern } => {
                writer.write_utf(attribute)?;
                writer.write_utf(pattern)
            }
            Self::In { attribute, values } => {
                writer.write_utf(attribute)?;
                writer.write_len(values.len())?;
                for value in values {
                    writer.write_object(Some(value))?;
                }
                Ok(())
            }
            Self::InstanceOf { class_name } => writer.write_utf(class_name),
            Self::Not(child) => writer.write_object(Some(child.as_ref())),
            Self::False | Self::True => Ok(()),
            Self::Paging(paging) => paging.write_to(writer),
        }
    }

    fn read_from(&mut self, reader: &mut WireReader<'_>) -> Result<(), CodecError> {
        match self {
            Self::Sql(query) => {
                *query = reader.read_utf()?;
                Ok(())
            }
            Self::And(children) | Self::Or(children) => {
                *children = read_children(reader)?;
                Ok(())
            }
            Self::Between {
                attribute,
                from,
                to,
            } => {
                *attribute = reader.read_utf()?;
                *from = read_value(reader)?;
                *to = read_value(reader)?;
                Ok(())
            }
            Self::Equal { attribute, value } | Self::NotEqual { attribute, value } => {
                *attribute = reader.read_utf()?;
                *value = read_value(reader)?;
                Ok(())
            }
            Self::GreaterLess {
                attribute,
                value,
                equal,
                less,
            } => {
                *attribute = reader.read_utf()?;
                *value = read_value(reader)?;
                *equal = reader.read_bool()?;
                *less = reader.read_bool()?;
                Ok(())
            }
            Self::Like { attribute, pattern }
            | Self::ILike { attribute, pattern }
            | Self::Regex { attribute, pattern } => {
                *attribute = reader.read_utf()?;
                *pattern = reader.read_utf()?;
                Ok(())
            }
            Self::In { attribute, values } => {
                *attribute = reader.read_utf()?;
                *values = read_values(reader)?;
                Ok(())
            }
            Self::InstanceOf { class_name } => {
                *class_name = reader.read_utf()?;
                Ok(())
            }
            Self::Not(child) => {
                *child = Box::new(read_child(reader)?);
                Ok(())
            }
            Self::False | Self::True => Ok(()),
            Self::Paging(paging) => paging.read_from(reader),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

///
/// PredicateFactory
///
/// Registry factory for the predicate family.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct PredicateFactory;

impl WireObjectFactory for PredicateFactory {
    fn create(&self, type_id: i32) -> Option<Box<dyn WireObject>> {
        Predicate::empty(type_id).map(|p| Box::new(p) as Box<dyn WireObject>)
    }
}

///
/// TESTS
///
