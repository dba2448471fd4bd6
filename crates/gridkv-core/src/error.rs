use crate::{
    codec::CodecError, predicate::PredicateError, query::OrderError, serialize::SerializeError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level runtime error. Module errors fold in via `From`; [`ErrorKind`]
/// provides the stable classification shared with peers.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Predicate(#[from] PredicateError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// Reserved: transactional operation against an inactive transaction.
    /// Not raised by the query core; kept for taxonomy parity with peers.
    #[error("transaction is not active")]
    TransactionNotActive,

    /// Reserved: mutation of a read-only result surface. Result views have
    /// no mutating API, so this is kept for taxonomy parity with peers.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl Error {
    /// Stable classification independent of error-message text.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Codec(CodecError::UnknownType { .. }) => ErrorKind::UnknownType,
            Self::Codec(_) | Self::Serialize(_) => ErrorKind::MalformedStream,
            Self::Predicate(PredicateError::AnchorGap { .. }) => ErrorKind::AnchorGap,
            Self::Predicate(_) => ErrorKind::InvalidArgument,
            Self::Order(_) => ErrorKind::NotComparable,
            Self::TransactionNotActive => ErrorKind::TransactionNotActive,
            Self::Unsupported(_) => ErrorKind::Unsupported,
        }
    }
}

///
/// ErrorKind
/// Stable error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    NotComparable,
    AnchorGap,
    InvalidIterationMode,
    MalformedStream,
    UnknownType,
    Unsupported,
    TransactionNotActive,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotComparable => "not_comparable",
            Self::AnchorGap => "anchor_gap",
            Self::InvalidIterationMode => "invalid_iteration_mode",
            Self::MalformedStream => "malformed_stream",
            Self::UnknownType => "unknown_type",
            Self::Unsupported => "unsupported",
            Self::TransactionNotActive => "transaction_not_active",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// TESTS
///
