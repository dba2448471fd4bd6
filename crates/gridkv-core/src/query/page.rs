use crate::{
    entry::Entry,
    error::Error,
    obs::{self, MetricsEvent},
    predicate::PagingPredicate,
    query::{IterationMode, SortedResultView, order::SortingOrder},
};

/// Sort an unordered result set, slice out the requested page, and record
/// anchors on the paging predicate.
///
/// `entries` must contain only entries ordered strictly after the
/// predicate's nearest anchor; the Invoker boundary owns that contract
/// (the server accepts the anchor and filters).
///
/// Anchors are recorded for every page covered by the sorted list — the
/// final partial page included — before the past-the-end check, so a request
/// beyond the end still files the anchors the list can prove. Nothing is
/// mutated if the sort fails.
pub fn sorted_page(
    entries: Vec<Entry>,
    paging: &mut PagingPredicate,
    mode: Option<IterationMode>,
) -> Result<SortedResultView, Error> {
    let mode = mode.unwrap_or_else(|| paging.iteration_mode());

    if entries.is_empty() {
        return Ok(SortedResultView::empty(mode));
    }

    let order = SortingOrder::new(paging.comparator(), mode);
    order.validate(&entries)?;

    let mut sorted = entries;
    sorted.sort_by(|a, b| order.compare(a, b));
    obs::record(MetricsEvent::QuerySorted {
        rows: sorted.len() as u64,
    });

    let nearest_page = paging.nearest_anchor().map_or(-1, |a| i64::from(a.page));
    let page = i64::from(paging.page());
    let page_size = paging.page_size() as usize;
    debug_assert!(page_size > 0, "page size invariant violated");

    // Last entry of every page the sorted list covers, partial tail
    // included. `nearest_anchor` guarantees `anchor_page < page`, so the
    // walk starts at a non-negative page index.
    let mut anchor_page = nearest_page;
    let mut recorded = 0u64;
    let mut index = page_size;
    while index <= sorted.len() {
        anchor_page += 1;
        paging.set_anchor(anchor_page as u32, sorted[index - 1].clone())?;
        recorded += 1;
        index += page_size;
    }
    if !sorted.len().is_multiple_of(page_size) {
        anchor_page += 1;
        paging.set_anchor(anchor_page as u32, sorted[sorted.len() - 1].clone())?;
        recorded += 1;
    }
    obs::record(MetricsEvent::AnchorsRecorded { count: recorded });

    let begin = ((page - nearest_page - 1) as usize).saturating_mul(page_size);
    if begin > sorted.len() {
        return Ok(SortedResultView::empty(mode));
    }
    let end = (begin + page_size).min(sorted.len());

    let slice = sorted[begin..end].to_vec();
    obs::record(MetricsEvent::PageServed {
        page: paging.page(),
        rows: slice.len() as u64,
    });

    Ok(SortedResultView::new(slice, mode))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::sorted_page;
    use crate::{
        entry::Entry,
        error::Error,
        predicate::PagingPredicate,
        query::{IterationMode, SortingOrder, ValueComparator},
        value::Value,
    };
    use std::cmp::Ordering;

    fn int_entries(keys: &[i64]) -> Vec<Entry> {
        keys.iter().map(|&k| Entry::new(k, k * 10)).collect()
    }

    // Emulates the server side of the Invoker contract: only entries ordered
    // strictly after the nearest anchor are returned.
    fn remaining_after_anchor(all: &[Entry], paging: &PagingPredicate) -> Vec<Entry> {
        let order = SortingOrder::new(paging.comparator(), paging.iteration_mode());
        match paging.nearest_anchor() {
            None => all.to_vec(),
            Some(anchor) => all
                .iter()
                .filter(|entry| order.compare(entry, &anchor.entry) == Ordering::Greater)
                .cloned()
                .collect(),
        }
    }

    fn page_keys(view: &crate::query::SortedResultView) -> Vec<i64> {
        view.entries()
            .iter()
            .map(|entry| match entry.key {
                Value::Int(k) => k,
                _ => panic!("test entries use int keys"),
            })
            .collect()
    }

    #[test]
    fn sequential_pages_partition_the_sorted_set() {
        let all = int_entries(&[5, 2, 8, 1, 9, 3, 7, 4, 6, 0]);
        let mut paging = PagingPredicate::new(3).expect("predicate should construct");

        let expected: [&[i64]; 5] = [&[0, 1, 2], &[3, 4, 5], &[6, 7, 8], &[9], &[]];
        for (page, want) in expected.iter().enumerate() {
            paging.set_page(page as u32);
            let input = remaining_after_anchor(&all, &paging);
            let view = sorted_page(input, &mut paging, None).expect("page should sort");
            assert_eq!(page_keys(&view), *want, "page {page}");
        }

        let anchor_keys: Vec<(u32, i64)> = paging
            .anchors()
            .iter()
            .map(|a| match a.entry.key {
                Value::Int(k) => (a.page, k),
                _ => panic!("test entries use int keys"),
            })
            .collect();
        assert_eq!(anchor_keys, vec![(0, 2), (1, 5), (2, 8), (3, 9)]);
    }

    #[test]
    fn skipping_to_a_page_matches_sequential_traversal() {
        let all = int_entries(&[5, 2, 8, 1, 9, 3, 7, 4, 6, 0]);
        let mut paging = PagingPredicate::new(3).expect("predicate should construct");
        paging.set_page(2);

        let view =
            sorted_page(all.clone(), &mut paging, None).expect("page should sort");
        assert_eq!(page_keys(&view), vec![6, 7, 8]);

        let anchor_keys: Vec<(u32, i64)> = paging
            .anchors()
            .iter()
            .map(|a| match a.entry.key {
                Value::Int(k) => (a.page, k),
                _ => panic!("test entries use int keys"),
            })
            .collect();
        assert_eq!(anchor_keys, vec![(0, 2), (1, 5), (2, 8), (3, 9)]);
    }

    #[test]
    fn custom_comparator_orders_by_value() {
        let all = vec![
            Entry::new("a", 3i64),
            Entry::new("b", 1i64),
            Entry::new("c", 2i64),
        ];
        let mut paging =
            PagingPredicate::with_comparator(Box::new(ValueComparator::ascending()), 2)
                .expect("predicate should construct");
        paging.set_iteration_mode(IterationMode::Value);

        let input = remaining_after_anchor(&all, &paging);
        let view = sorted_page(input, &mut paging, None).expect("page should sort");
        let values: Vec<_> = view.values().cloned().collect();
        assert_eq!(values, vec![Value::Int(1), Value::Int(2)]);

        paging.next_page();
        let input = remaining_after_anchor(&all, &paging);
        let view = sorted_page(input, &mut paging, None).expect("page should sort");
        let values: Vec<_> = view.values().cloned().collect();
        assert_eq!(values, vec![Value::Int(3)]);
    }

    #[test]
    fn comparator_ties_resolve_to_a_stable_order() {
        let all = vec![Entry::new("a", 7i64), Entry::new("b", 7i64)];

        let run = || {
            let mut paging =
                PagingPredicate::with_comparator(Box::new(ValueComparator::ascending()), 2)
                    .expect("predicate should construct");
            let view =
                sorted_page(all.clone(), &mut paging, None).expect("page should sort");
            view.entries().to_vec()
        };

        let first = run();
        let second = run();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn empty_input_yields_an_empty_view_without_anchors() {
        let mut paging = PagingPredicate::new(3).expect("predicate should construct");
        let view = sorted_page(Vec::new(), &mut paging, None).expect("empty input should sort");
        assert!(view.is_empty());
        assert!(paging.anchors().is_empty());
    }

    #[test]
    fn page_past_the_end_is_empty_but_still_records_anchors() {
        let all = int_entries(&[0, 1, 2, 3, 4, 5]);
        let mut paging = PagingPredicate::new(2).expect("predicate should construct");
        paging.set_page(9);

        let view = sorted_page(all, &mut paging, None).expect("page should sort");
        assert!(view.is_empty());
        assert_eq!(paging.anchors().len(), 3);
    }

    #[test]
    fn not_comparable_input_fails_without_touching_anchors() {
        let all = vec![Entry::new(1i64, vec![0u8]), Entry::new(2i64, vec![1u8])];
        let mut paging = PagingPredicate::new(2).expect("predicate should construct");
        paging.set_iteration_mode(IterationMode::Value);

        let err = sorted_page(all, &mut paging, None).expect_err("blobs should not sort");
        assert!(matches!(err, Error::Order(_)));
        assert!(paging.anchors().is_empty());
    }

    #[test]
    fn mode_override_wins_over_the_predicate_mode() {
        let all = int_entries(&[2, 1]);
        let mut paging = PagingPredicate::new(2).expect("predicate should construct");

        let view = sorted_page(all, &mut paging, Some(IterationMode::Value))
            .expect("page should sort");
        assert_eq!(view.mode(), IterationMode::Value);
    }
}
