//! Error taxonomy shared by the store adapter and the navigation engine.
//!
//! There is no not-found variant: a missing root, origin or target is a
//! valid outcome of every query and surfaces as an empty result.

use crate::graph::{Predicate, PredicateCategory};

/// Failures raised by a [`GraphStore`](crate::store::GraphStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed store query: {0}")]
    Malformed(String),
}

/// Errors returned by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A relationship type, code field or direction outside the fixed vocabulary.
    #[error("invalid {kind}: {value:?}")]
    InvalidFilter { kind: &'static str, value: String },
    /// A known predicate used in the wrong role (e.g. a structural type as the functional one).
    #[error("{predicate} is not a {expected} relationship type")]
    CategoryMismatch {
        predicate: Predicate,
        expected: PredicateCategory,
    },
    #[error("invalid level range: min {min} exceeds max {max}")]
    InvalidLevels { min: usize, max: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    pub(crate) fn invalid(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidFilter {
            kind,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
