pub mod order;
pub mod page;
pub mod view;

#[cfg(test)]
mod tests;

use derive_more::Display;
use std::str::FromStr;
use thiserror::Error as ThisError;

// re-exports
pub use order::{EntryComparator, OrderError, SortingOrder, ValueComparator};
pub use page::sorted_page;
pub use view::{Projection, SortedResultView};

///
/// IterationMode
///
/// Projection selector over a result entry: the key, the value, or the whole
/// entry. Also the default comparison projection when no user comparator is
/// given.
///
/// The wire name is the upper-case variant name; parsing is
/// case-insensitive to tolerate older peers that emit lower-case.
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum IterationMode {
    #[default]
    #[display("KEY")]
    Key,
    #[display("VALUE")]
    Value,
    #[display("ENTRY")]
    Entry,
}

impl IterationMode {
    /// Upper-case wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Key => "KEY",
            Self::Value => "VALUE",
            Self::Entry => "ENTRY",
        }
    }
}

///
/// UnknownIterationMode
///

#[derive(Debug, Eq, PartialEq, ThisError)]
#[error("unrecognized iteration mode name: '{0}'")]
pub struct UnknownIterationMode(pub String);

impl FromStr for IterationMode {
    type Err = UnknownIterationMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("KEY") {
            Ok(Self::Key)
        } else if s.eq_ignore_ascii_case("VALUE") {
            Ok(Self::Value)
        } else if s.eq_ignore_ascii_case("ENTRY") {
            Ok(Self::Entry)
        } else {
            Err(UnknownIterationMode(s.to_string()))
        }
    }
}

///
/// TESTS
///
