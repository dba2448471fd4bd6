//! Observability boundary.
//!
//! Query logic MUST NOT reach into counter state directly. All
//! instrumentation flows through [`MetricsEvent`] and [`record`]; endpoint
//! and test plumbing reads snapshots via [`metrics_report`].

use std::cell::RefCell;

thread_local! {
    static STATE: RefCell<MetricsCounters> = RefCell::new(MetricsCounters::default());
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    QuerySorted { rows: u64 },
    PageServed { page: u32, rows: u64 },
    AnchorsRecorded { count: u64 },
}

///
/// MetricsCounters
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MetricsCounters {
    pub queries_sorted: u64,
    pub rows_sorted: u64,
    pub pages_served: u64,
    pub rows_served: u64,
    pub anchors_recorded: u64,
    pub highest_page_served: u32,
}

pub(crate) fn record(event: MetricsEvent) {
    STATE.with(|cell| {
        let mut state = cell.borrow_mut();
        match event {
            MetricsEvent::QuerySorted { rows } => {
                state.queries_sorted = state.queries_sorted.saturating_add(1);
                state.rows_sorted = state.rows_sorted.saturating_add(rows);
            }
            MetricsEvent::PageServed { page, rows } => {
                state.pages_served = state.pages_served.saturating_add(1);
                state.rows_served = state.rows_served.saturating_add(rows);
                state.highest_page_served = state.highest_page_served.max(page);
            }
            MetricsEvent::AnchorsRecorded { count } => {
                state.anchors_recorded = state.anchors_recorded.saturating_add(count);
            }
        }
    });
}

/// Snapshot the current thread's counters for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> MetricsCounters {
    STATE.with(|cell| *cell.borrow())
}

/// Reset all counters.
pub fn metrics_reset_all() {
    STATE.with(|cell| {
        *cell.borrow_mut() = MetricsCounters::default();
    });
}

///
/// TESTS
///
