use crate::{
    codec::{
        CodecError, WireObject, WireReader, WireWriter,
        registry::factory_id,
    },
    entry::Entry,
    query::IterationMode,
    value::{ValueTag, stable_hash, strict_order_cmp},
};
use std::{any::Any, cmp::Ordering};
use thiserror::Error as ThisError;

/// Wire type id of [`ValueComparator`] within the comparator factory.
pub const VALUE_COMPARATOR_TYPE_ID: i32 = 0;

///
/// OrderError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum OrderError {
    #[error("entries are not comparable under {mode} iteration: {kind} values have no natural order")]
    NotComparable { mode: IterationMode, kind: &'static str },
}

///
/// EntryComparator
///
/// Application-supplied total-or-partial order over entries. Comparators
/// travel the wire with queries, so they are wire objects; custom
/// implementations must register a constructor in the factory registry for
/// the server's echo to deserialize.
///

pub trait EntryComparator: WireObject {
    fn compare(&self, left: &Entry, right: &Entry) -> Ordering;

    fn clone_box(&self) -> Box<dyn EntryComparator>;
}

impl Clone for Box<dyn EntryComparator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

///
/// ValueComparator
///
/// Built-in comparator ordering entries by their value's natural order.
/// Values with no natural order (or mismatched variants) compare equal and
/// fall through to the engine tie-break.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ValueComparator {
    pub descending: bool,
}

impl ValueComparator {
    #[must_use]
    pub const fn ascending() -> Self {
        Self { descending: false }
    }

    #[must_use]
    pub const fn descending() -> Self {
        Self { descending: true }
    }
}

impl WireObject for ValueComparator {
    fn factory_id(&self) -> i32 {
        factory_id::COMPARATOR
    }

    fn type_id(&self) -> i32 {
        VALUE_COMPARATOR_TYPE_ID
    }

    fn write_to(&self, writer: &mut WireWriter) -> Result<(), CodecError> {
        writer.write_bool(self.descending);
        Ok(())
    }

    fn read_from(&mut self, reader: &mut WireReader<'_>) -> Result<(), CodecError> {
        self.descending = reader.read_bool()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl EntryComparator for ValueComparator {
    fn compare(&self, left: &Entry, right: &Entry) -> Ordering {
        let ord = strict_order_cmp(&left.value, &right.value).unwrap_or(Ordering::Equal);
        if self.descending { ord.reverse() } else { ord }
    }

    fn clone_box(&self) -> Box<dyn EntryComparator> {
        Box::new(*self)
    }
}

///
/// SortingOrder
///
/// Total order over entries derived from `(user comparator?, iteration
/// mode)`. The primary comparison comes from the user comparator when
/// present, otherwise from the natural order of the per-mode projection;
/// residual ties break on the stable hash of the entry key so that page
/// boundaries are reproducible across calls.
///

pub struct SortingOrder<'a> {
    comparator: Option<&'a dyn EntryComparator>,
    mode: IterationMode,
}

impl<'a> SortingOrder<'a> {
    #[must_use]
    pub const fn new(comparator: Option<&'a dyn EntryComparator>, mode: IterationMode) -> Self {
        Self { comparator, mode }
    }

    // Entries themselves carry no natural order, so ENTRY iteration projects
    // the key, matching the KEY projection.
    const fn projection<'e>(&self, entry: &'e Entry) -> &'e crate::value::Value {
        match self.mode {
            IterationMode::Key | IterationMode::Entry => &entry.key,
            IterationMode::Value => &entry.value,
        }
    }

    /// Check that every entry's projection is naturally orderable against the
    /// rest. A no-op when a user comparator supplies the order.
    ///
    /// Sorting requires a total order up front; surfacing the failure here
    /// keeps the sort itself infallible and leaves anchors untouched on error.
    pub fn validate(&self, entries: &[Entry]) -> Result<(), OrderError> {
        if self.comparator.is_some() {
            return Ok(());
        }

        let Some(first) = entries.first() else {
            return Ok(());
        };

        let lead_tag = self.projection(first).tag();
        if !Self::tag_is_orderable(lead_tag) {
            return Err(self.not_comparable(lead_tag.label()));
        }

        for entry in &entries[1..] {
            let tag = self.projection(entry).tag();
            if tag != lead_tag {
                return Err(self.not_comparable("mixed-variant"));
            }
        }

        Ok(())
    }

    /// Compare a single pair, surfacing non-orderable projections.
    pub fn try_compare(&self, left: &Entry, right: &Entry) -> Result<Ordering, OrderError> {
        if self.comparator.is_none() {
            let l = self.projection(left);
            let r = self.projection(right);
            if strict_order_cmp(l, r).is_none() {
                let kind = if l.tag() == r.tag() {
                    l.label()
                } else {
                    "mixed-variant"
                };
                return Err(self.not_comparable(kind));
            }
        }

        Ok(self.compare(left, right))
    }

    /// Infallible comparison; callers must [`validate`](Self::validate) the
    /// input first when no user comparator is present.
    #[must_use]
    pub fn compare(&self, left: &Entry, right: &Entry) -> Ordering {
        let primary = match self.comparator {
            Some(comparator) => comparator.compare(left, right),
            None => strict_order_cmp(self.projection(left), self.projection(right))
                .unwrap_or(Ordering::Equal),
        };

        if primary != Ordering::Equal {
            return primary;
        }

        stable_hash(&left.key).cmp(&stable_hash(&right.key))
    }

    const fn not_comparable(&self, kind: &'static str) -> OrderError {
        OrderError::NotComparable {
            mode: self.mode,
            kind,
        }
    }

    const fn tag_is_orderable(tag: ValueTag) -> bool {
        matches!(
            tag,
            ValueTag::Bool | ValueTag::Int | ValueTag::Text | ValueTag::Uint
        )
    }
}

///
/// TESTS
///
