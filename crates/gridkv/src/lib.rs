//! Client facade for the gridkv core: the [`Invoker`] transport boundary
//! and a paged-query driver over it.
//!
//! ## Crate layout
//! - `core`: wire codec, predicate tree, paged ordered query engine.
//! - this crate: the application-facing driver and prelude.

pub use gridkv_core as core;

mod client;

pub use client::{Invoker, PagedQuery, fetch_page};

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::client::{Invoker, PagedQuery, fetch_page};
    pub use gridkv_core::{
        Entry, Error, ErrorKind,
        predicate::{PagingPredicate, Predicate},
        query::{
            EntryComparator, IterationMode, Projection, SortedResultView, ValueComparator,
            sorted_page,
        },
        value::Value,
    };
}
