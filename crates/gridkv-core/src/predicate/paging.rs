use crate::{
    codec::{
        CodecError, WireObject, WireReader, WireWriter,
        registry::factory_id,
    },
    entry::Entry,
    predicate::{Predicate, predicate_type},
    query::{IterationMode, order::EntryComparator},
    value::Value,
};
use std::any::Any;
use thiserror::Error as ThisError;

///
/// PredicateError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum PredicateError {
    #[error("page size must be greater than zero")]
    PageSizeNotPositive,

    #[error("a paging predicate cannot wrap another paging predicate")]
    NestedPaging,

    #[error("anchor page {page} would leave a gap: {recorded} anchors recorded")]
    AnchorGap { page: u32, recorded: u32 },
}

///
/// AnchorRecord
///
/// The last entry of page `page` under the current sort order; the
/// continuation token for resuming at any later page.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnchorRecord {
    pub page: u32,
    pub entry: Entry,
}

///
/// PagingPredicate
///
/// A predicate that additionally carries paging state. It is a mutable
/// continuation token: the engine appends an anchor after every successful
/// sort/slice, and the whole state is serialized verbatim on every query
/// round-trip. Callers must serialize access to one instance; concurrent
/// page mutation has undefined anchor state.
///
/// Changing the comparator or iteration mode after pagination has begun
/// invalidates recorded anchors; call [`reset`](Self::reset) first.
///

#[derive(Debug)]
pub struct PagingPredicate {
    inner: Option<Box<Predicate>>,
    comparator: Option<Box<dyn EntryComparator>>,
    page: u32,
    page_size: u32,
    iteration_mode: IterationMode,
    anchors: Vec<AnchorRecord>,
}

impl PagingPredicate {
    /// No filter, natural order.
    pub fn new(page_size: u32) -> Result<Self, PredicateError> {
        if page_size == 0 {
            return Err(PredicateError::PageSizeNotPositive);
        }

        Ok(Self {
            inner: None,
            comparator: None,
            page: 0,
            page_size,
            iteration_mode: IterationMode::default(),
            anchors: Vec::new(),
        })
    }

    /// Results filtered by `inner`, natural order.
    pub fn with_inner(inner: Predicate, page_size: u32) -> Result<Self, PredicateError> {
        let mut paging = Self::new(page_size)?;
        paging.set_inner(inner)?;
        Ok(paging)
    }

    /// No filter, order supplied by `comparator`.
    pub fn with_comparator(
        comparator: Box<dyn EntryComparator>,
        page_size: u32,
    ) -> Result<Self, PredicateError> {
        let mut paging = Self::new(page_size)?;
        paging.comparator = Some(comparator);
        Ok(paging)
    }

    /// Results filtered by `inner`, order supplied by `comparator`.
    pub fn with_inner_and_comparator(
        inner: Predicate,
        comparator: Box<dyn EntryComparator>,
        page_size: u32,
    ) -> Result<Self, PredicateError> {
        let mut paging = Self::with_comparator(comparator, page_size)?;
        paging.set_inner(inner)?;
        Ok(paging)
    }

    // Wire hydration only; `read_from` fills every field.
    pub(crate) fn empty() -> Self {
        Self {
            inner: None,
            comparator: None,
            page: 0,
            page_size: 0,
            iteration_mode: IterationMode::default(),
            anchors: Vec::new(),
        }
    }

    fn set_inner(&mut self, inner: Predicate) -> Result<(), PredicateError> {
        if matches!(inner, Predicate::Paging(_)) {
            return Err(PredicateError::NestedPaging);
        }

        self.inner = Some(Box::new(inner));
        Ok(())
    }

    /// Advance to the next page.
    pub fn next_page(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    /// Step back one page; a no-op on page 0.
    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page;
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub const fn iteration_mode(&self) -> IterationMode {
        self.iteration_mode
    }

    pub fn set_iteration_mode(&mut self, mode: IterationMode) {
        self.iteration_mode = mode;
    }

    #[must_use]
    pub fn inner(&self) -> Option<&Predicate> {
        self.inner.as_deref()
    }

    #[must_use]
    pub fn comparator(&self) -> Option<&dyn EntryComparator> {
        self.comparator.as_deref()
    }

    /// Reset for reuse: iteration mode, anchors, and page revert to their
    /// initial state. Page size, inner filter, and comparator are kept.
    pub fn reset(&mut self) {
        self.iteration_mode = IterationMode::default();
        self.anchors.clear();
        self.page = 0;
    }

    /// The anchor entry recorded for the current page, if any.
    #[must_use]
    pub fn anchor(&self) -> Option<&Entry> {
        self.anchors
            .get(self.page as usize)
            .map(|record| &record.entry)
    }

    /// The recorded anchor with the largest page index below the current
    /// page: the resume point for the next sort/slice. `None` plays the role
    /// of the conceptual page `-1` sentinel.
    #[must_use]
    pub fn nearest_anchor(&self) -> Option<&AnchorRecord> {
        if self.page == 0 {
            return None;
        }

        self.anchors
            .iter()
            .rev()
            .find(|record| record.page < self.page)
    }

    /// All recorded anchors, contiguous from page 0.
    #[must_use]
    pub fn anchors(&self) -> &[AnchorRecord] {
        &self.anchors
    }

    /// Record the last entry of `page`. Overwrites an existing record,
    /// appends the next one, and rejects anything that would leave a gap.
    pub(crate) fn set_anchor(&mut self, page: u32, entry: Entry) -> Result<(), PredicateError> {
        let recorded = self.anchors.len();
        let index = page as usize;

        if index < recorded {
            self.anchors[index] = AnchorRecord { page, entry };
        } else if index == recorded {
            self.anchors.push(AnchorRecord { page, entry });
        } else {
            return Err(PredicateError::AnchorGap {
                page,
                recorded: recorded as u32,
            });
        }

        Ok(())
    }

    /// Wrap into a [`Predicate`] node for submission.
    #[must_use]
    pub fn into_predicate(self) -> Predicate {
        Predicate::Paging(self)
    }
}

impl Clone for PagingPredicate {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            comparator: self.comparator.as_ref().map(|c| c.clone_box()),
            page: self.page,
            page_size: self.page_size,
            iteration_mode: self.iteration_mode,
            anchors: self.anchors.clone(),
        }
    }
}

impl WireObject for PagingPredicate {
    fn factory_id(&self) -> i32 {
        factory_id::PREDICATE
    }

    fn type_id(&self) -> i32 {
        predicate_type::PAGING
    }

    fn write_to(&self, writer: &mut WireWriter) -> Result<(), CodecError> {
        writer.write_object(self.inner.as_deref().map(|p| p as &dyn WireObject))?;
        writer.write_object(self.comparator.as_deref().map(|c| c as &dyn WireObject))?;

        let page = i32::try_from(self.page).map_err(|_| CodecError::OutOfRange { field: "page" })?;
        writer.write_i32(page);
        let page_size = i32::try_from(self.page_size)
            .map_err(|_| CodecError::OutOfRange { field: "page_size" })?;
        writer.write_i32(page_size);

        writer.write_utf(self.iteration_mode.as_str())?;

        writer.write_len(self.anchors.len())?;
        for record in &self.anchors {
            let page = i32::try_from(record.page)
                .map_err(|_| CodecError::OutOfRange { field: "anchor page" })?;
            writer.write_i32(page);
            writer.write_object(Some(&record.entry.key))?;
            writer.write_object(Some(&record.entry.value))?;
        }

        Ok(())
    }

    fn read_from(&mut self, reader: &mut WireReader<'_>) -> Result<(), CodecError> {
        self.inner = reader.read_object_as::<Predicate>()?.map(Box::new);
        self.comparator = reader.read_comparator()?;

        let page = reader.read_i32()?;
        self.page = u32::try_from(page)
            .map_err(|_| CodecError::malformed(format!("negative page: {page}")))?;

        let page_size = reader.read_i32()?;
        if page_size <= 0 {
            return Err(CodecError::malformed(format!(
                "page size must be positive, found {page_size}"
            )));
        }
        self.page_size = page_size as u32;

        let mode = reader.read_utf()?;
        self.iteration_mode = mode
            .parse::<IterationMode>()
            .map_err(|err| CodecError::malformed(err.to_string()))?;

        let count = reader.read_len()?;
        let mut anchors = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let anchor_page = reader.read_i32()?;
            let anchor_page = u32::try_from(anchor_page).map_err(|_| {
                CodecError::malformed(format!("negative anchor page: {anchor_page}"))
            })?;
            let key = reader
                .read_object_as::<Value>()?
                .ok_or_else(|| CodecError::malformed("unexpected null anchor key"))?;
            let value = reader
                .read_object_as::<Value>()?
                .ok_or_else(|| CodecError::malformed("unexpected null anchor value"))?;
            anchors.push(AnchorRecord {
                page: anchor_page,
                entry: Entry { key, value },
            });
        }
        self.anchors = anchors;

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
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{AnchorRecord, PagingPredicate, PredicateError};
    use crate::{
        codec::{deserialize_object, registry::FactoryRegistry, serialize_object},
        entry::Entry,
        predicate::Predicate,
        query::{IterationMode, ValueComparator},
    };

    #[test]
    fn zero_page_size_is_rejected() {
        let err = PagingPredicate::new(0).expect_err("page size 0 should be rejected");
        assert_eq!(err, PredicateError::PageSizeNotPositive);
    }

    #[test]
    fn nested_paging_predicate_is_rejected() {
        let inner = PagingPredicate::new(10).expect("inner predicate should construct");
        let err = PagingPredicate::with_inner(inner.into_predicate(), 5)
            .expect_err("nested paging should be rejected");
        assert_eq!(err, PredicateError::NestedPaging);
    }

    #[test]
    fn page_navigation_clamps_at_zero() {
        let mut paging = PagingPredicate::new(3).expect("predicate should construct");
        assert_eq!(paging.page(), 0);

        paging.previous_page();
        assert_eq!(paging.page(), 0);

        paging.next_page();
        paging.next_page();
        assert_eq!(paging.page(), 2);

        paging.previous_page();
        assert_eq!(paging.page(), 1);

        paging.set_page(7);
        assert_eq!(paging.page(), 7);
    }

    #[test]
    fn reset_clears_paging_state_but_keeps_configuration() {
        let mut paging = PagingPredicate::with_inner_and_comparator(
            Predicate::equal("a", 1i64),
            Box::new(ValueComparator::ascending()),
            4,
        )
        .expect("predicate should construct");

        paging.set_iteration_mode(IterationMode::Entry);
        paging.set_page(3);
        paging
            .set_anchor(0, Entry::new(1i64, 1i64))
            .expect("first anchor should append");

        paging.reset();

        assert_eq!(paging.page(), 0);
        assert_eq!(paging.iteration_mode(), IterationMode::Key);
        assert!(paging.anchors().is_empty());
        assert_eq!(paging.page_size(), 4);
        assert!(paging.inner().is_some());
        assert!(paging.comparator().is_some());
    }

    #[test]
    fn set_anchor_appends_overwrites_and_rejects_gaps() {
        let mut paging = PagingPredicate::new(2).expect("predicate should construct");

        paging
            .set_anchor(0, Entry::new(1i64, 1i64))
            .expect("append at 0 should succeed");
        paging
            .set_anchor(1, Entry::new(2i64, 2i64))
            .expect("append at 1 should succeed");
        paging
            .set_anchor(0, Entry::new(9i64, 9i64))
            .expect("overwrite at 0 should succeed");
        assert_eq!(paging.anchors()[0].entry, Entry::new(9i64, 9i64));

        let err = paging
            .set_anchor(5, Entry::new(3i64, 3i64))
            .expect_err("gap should be rejected");
        assert_eq!(err, PredicateError::AnchorGap { page: 5, recorded: 2 });
    }

    #[test]
    fn anchor_lookup_is_by_current_page() {
        let mut paging = PagingPredicate::new(2).expect("predicate should construct");
        paging
            .set_anchor(0, Entry::new(1i64, 1i64))
            .expect("anchor should append");

        assert_eq!(paging.anchor(), Some(&Entry::new(1i64, 1i64)));

        paging.set_page(3);
        assert_eq!(paging.anchor(), None);
    }

    #[test]
    fn nearest_anchor_resumes_below_the_current_page() {
        let mut paging = PagingPredicate::new(2).expect("predicate should construct");
        assert!(paging.nearest_anchor().is_none());

        for page in 0..5u32 {
            paging
                .set_anchor(page, Entry::new(i64::from(page), i64::from(page)))
                .expect("anchor should append");
        }

        paging.set_page(0);
        assert!(paging.nearest_anchor().is_none());

        paging.set_page(3);
        let nearest = paging.nearest_anchor().expect("anchor should resolve");
        assert_eq!(nearest.page, 2);

        paging.set_page(10);
        let nearest = paging.nearest_anchor().expect("anchor should resolve");
        assert_eq!(nearest.page, 4);
    }

    fn sample_predicate() -> PagingPredicate {
        let mut paging = PagingPredicate::with_inner_and_comparator(
            Predicate::greater_equal("age", 21i64),
            Box::new(ValueComparator::descending()),
            3,
        )
        .expect("predicate should construct");
        paging.set_iteration_mode(IterationMode::Entry);
        paging.set_page(2);
        for page in 0..3u32 {
            paging
                .set_anchor(page, Entry::new(i64::from(page), format!("v{page}")))
                .expect("anchor should append");
        }
        paging
    }

    #[test]
    fn wire_round_trip_is_byte_identical() {
        let registry = FactoryRegistry::with_defaults();
        let paging = sample_predicate();

        let bytes = serialize_object(&paging).expect("predicate should serialize");
        let decoded = deserialize_object(&bytes, &registry)
            .expect("predicate should deserialize")
            .expect("predicate should be present");
        let re_encoded = serialize_object(decoded.as_ref()).expect("predicate should re-serialize");

        assert_eq!(bytes, re_encoded);
    }

    #[test]
    fn wire_round_trip_preserves_observable_state() {
        let registry = FactoryRegistry::with_defaults();
        let paging = sample_predicate();

        let bytes = serialize_object(&paging).expect("predicate should serialize");
        let decoded = deserialize_object(&bytes, &registry)
            .expect("predicate should deserialize")
            .expect("predicate should be present");
        let decoded = decoded
            .into_any()
            .downcast::<Predicate>()
            .expect("decoded object should be a predicate");
        let Predicate::Paging(decoded) = *decoded else {
            panic!("decoded predicate should be a paging predicate");
        };

        assert_eq!(decoded.page(), 2);
        assert_eq!(decoded.page_size(), 3);
        assert_eq!(decoded.iteration_mode(), IterationMode::Entry);
        assert_eq!(decoded.anchors().len(), 3);
        assert_eq!(
            decoded.anchors()[1],
            AnchorRecord {
                page: 1,
                entry: Entry::new(1i64, "v1"),
            }
        );
        assert!(decoded.inner().is_some());
        assert!(decoded.comparator().is_some());
    }

    #[test]
    fn lower_case_iteration_mode_from_older_peers_is_accepted() {
        // Hand-roll the stream with a lower-case mode name.
        use crate::codec::{WireObject, WireReader, WireWriter};

        let mut writer = WireWriter::new();
        writer.write_object(None).expect("null inner should encode");
        writer
            .write_object(None)
            .expect("null comparator should encode");
        writer.write_i32(1);
        writer.write_i32(5);
        writer.write_utf("entry").expect("mode name should encode");
        writer.write_i32(0);

        let registry = FactoryRegistry::with_defaults();
        let bytes = writer.into_bytes();
        let mut reader = WireReader::new(&bytes, &registry);
        let mut paging = PagingPredicate::empty();
        paging
            .read_from(&mut reader)
            .expect("lower-case mode should parse");

        assert_eq!(paging.iteration_mode(), IterationMode::Entry);
        assert_eq!(paging.page(), 1);
        assert_eq!(paging.page_size(), 5);
    }

    #[test]
    fn unknown_iteration_mode_name_is_a_malformed_stream() {
        use crate::codec::{CodecError, WireObject, WireReader, WireWriter};

        let mut writer = WireWriter::new();
        writer.write_object(None).expect("null inner should encode");
        writer
            .write_object(None)
            .expect("null comparator should encode");
        writer.write_i32(0);
        writer.write_i32(5);
        writer.write_utf("ROWS").expect("mode name should encode");
        writer.write_i32(0);

        let registry = FactoryRegistry::with_defaults();
        let bytes = writer.into_bytes();
        let mut reader = WireReader::new(&bytes, &registry);
        let mut paging = PagingPredicate::empty();
        let err = paging
            .read_from(&mut reader)
            .expect_err("unknown mode should fail");
        assert!(matches!(err, CodecError::MalformedStream { .. }));
    }

    #[test]
    fn non_positive_wire_page_size_is_a_malformed_stream() {
        use crate::codec::{CodecError, WireObject, WireReader, WireWriter};

        let mut writer = WireWriter::new();
        writer.write_object(None).expect("null inner should encode");
        writer
            .write_object(None)
            .expect("null comparator should encode");
        writer.write_i32(0);
        writer.write_i32(0);
        writer.write_utf("KEY").expect("mode name should encode");
        writer.write_i32(0);

        let registry = FactoryRegistry::with_defaults();
        let bytes = writer.into_bytes();
        let mut reader = WireReader::new(&bytes, &registry);
        let mut paging = PagingPredicate::empty();
        let err = paging
            .read_from(&mut reader)
            .expect_err("zero page size should fail");
        assert!(matches!(err, CodecError::MalformedStream { .. }));
    }

    #[test]
    fn clone_preserves_comparator_and_anchors() {
        let paging = sample_predicate();
        let cloned = paging.clone();

        assert_eq!(cloned.page(), paging.page());
        assert_eq!(cloned.anchors(), paging.anchors());
        assert!(cloned.comparator().is_some());
    }
}
