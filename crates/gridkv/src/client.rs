use gridkv_core::{
    Entry, Error,
    predicate::PagingPredicate,
    query::{SortedResultView, sorted_page},
};

///
/// Invoker
///
/// Opaque transport boundary: ships a request to the cluster and returns the
/// raw, unordered result set. Partition routing, dispatch, and cancellation
/// all live behind this trait; a cancelled query surfaces as an `Err` and
/// the paging engine is never entered.
///
/// Contract: the returned set is filtered by the predicate's inner filter
/// AND contains only entries ordered strictly after the predicate's nearest
/// anchor under the predicate's own ordering. The page-slice arithmetic in
/// the engine depends on this server-side anchor filtering.
///

pub trait Invoker {
    fn query(&self, paging: &PagingPredicate) -> Result<Vec<Entry>, Error>;
}

/// Submit one paged query and assemble the requested page.
///
/// Anchors recorded on `paging` carry over to the next call, so issuing
/// `fetch_page` repeatedly while stepping the page yields consecutive slices
/// of one stable ordering.
pub fn fetch_page<I: Invoker + ?Sized>(
    invoker: &I,
    paging: &mut PagingPredicate,
) -> Result<SortedResultView, Error> {
    let entries = invoker.query(paging)?;
    sorted_page(entries, paging, None)
}

///
/// PagedQuery
///
/// Convenience driver owning the paging predicate across page requests.
///

pub struct PagedQuery<I: Invoker> {
    invoker: I,
    predicate: PagingPredicate,
}

impl<I: Invoker> PagedQuery<I> {
    #[must_use]
    pub const fn new(invoker: I, predicate: PagingPredicate) -> Self {
        Self { invoker, predicate }
    }

    /// Fetch the current page.
    pub fn fetch(&mut self) -> Result<SortedResultView, Error> {
        fetch_page(&self.invoker, &mut self.predicate)
    }

    /// Advance to the next page and fetch it.
    pub fn fetch_next(&mut self) -> Result<SortedResultView, Error> {
        self.predicate.next_page();
        self.fetch()
    }

    pub fn next_page(&mut self) {
        self.predicate.next_page();
    }

    pub fn previous_page(&mut self) {
        self.predicate.previous_page();
    }

    pub fn set_page(&mut self, page: u32) {
        self.predicate.set_page(page);
    }

    pub fn reset(&mut self) {
        self.predicate.reset();
    }

    #[must_use]
    pub const fn predicate(&self) -> &PagingPredicate {
        &self.predicate
    }

    #[must_use]
    pub fn into_predicate(self) -> PagingPredicate {
        self.predicate
    }
}
