use crate::{entry::Entry, query::IterationMode, value::Value};
use std::slice;

///
/// SortedResultView
///
/// Read-only view over one sorted page of a query result. The view owns its
/// slice, so iteration can restart any number of times and always yields the
/// same sequence. There is no mutating surface; unsupported-mutation
/// failures from open-collection peers are discharged statically here.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SortedResultView {
    entries: Vec<Entry>,
    mode: IterationMode,
}

impl SortedResultView {
    #[must_use]
    pub(crate) const fn new(entries: Vec<Entry>, mode: IterationMode) -> Self {
        Self { entries, mode }
    }

    #[must_use]
    pub(crate) const fn empty(mode: IterationMode) -> Self {
        Self {
            entries: Vec::new(),
            mode,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> IterationMode {
        self.mode
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the page, yielding the projection selected by the view's
    /// iteration mode.
    #[must_use]
    pub fn iter(&self) -> Projections<'_> {
        Projections {
            entries: self.entries.iter(),
            mode: self.mode,
        }
    }

    /// Key projection of every entry, in page order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|entry| &entry.key)
    }

    /// Value projection of every entry, in page order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|entry| &entry.value)
    }

    /// The underlying entries, in page order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a SortedResultView {
    type Item = Projection<'a>;
    type IntoIter = Projections<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

///
/// Projection
///
/// One projected element of a sorted page.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Projection<'a> {
    Key(&'a Value),
    Value(&'a Value),
    Entry(&'a Entry),
}

impl<'a> Projection<'a> {
    /// The projected value for key/value projections.
    #[must_use]
    pub const fn as_value(&self) -> Option<&'a Value> {
        match self {
            Self::Key(v) | Self::Value(v) => Some(v),
            Self::Entry(_) => None,
        }
    }

    #[must_use]
    pub const fn as_entry(&self) -> Option<&'a Entry> {
        match self {
            Self::Entry(entry) => Some(entry),
            Self::Key(_) | Self::Value(_) => None,
        }
    }
}

///
/// Projections
///

#[derive(Clone, Debug)]
pub struct Projections<'a> {
    entries: slice::Iter<'a, Entry>,
    mode: IterationMode,
}

impl<'a> Iterator for Projections<'a> {
    type Item = Projection<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        Some(match self.mode {
            IterationMode::Key => Projection::Key(&entry.key),
            IterationMode::Value => Projection::Value(&entry.value),
            IterationMode::Entry => Projection::Entry(entry),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for Projections<'_> {}

///
/// TESTS
///
