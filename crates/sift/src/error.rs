//! Error types for the sift crate.

use thiserror::Error;

/// Errors that can occur when building or executing queries.
///
/// Every variant is fatal to the query that raised it: combinators and the
/// executor propagate errors unchanged and never return partial results.
#[derive(Debug, Error)]
pub enum SiftError {
    /// The predicate references a field the record does not have.
    #[error("field '{field}' not found in record")]
    FieldNotFound { field: String },

    /// The field value and the operand belong to incomparable kinds.
    #[error("type mismatch: cannot compare {left} with {right}")]
    TypeMismatch {
        left: &'static str,
        right: &'static str,
    },

    /// Both values share a kind but have no defined order (NaN).
    #[error("values {left} and {right} have no defined order")]
    Unordered { left: String, right: String },

    /// A custom comparator rejected the comparison.
    #[error("comparison failed in domain {domain}: {source}")]
    Domain {
        domain: &'static str,
        #[source]
        source: DomainError,
    },

    /// Invalid regular expression pattern.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// An index lookup was requested for a field without an index.
    #[error("no index on field '{field}'")]
    Index { field: String },

    /// The record source failed while producing candidates.
    #[error("record store failure: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SiftError {
    pub(crate) fn field_not_found(field: &str) -> Self {
        SiftError::FieldNotFound {
            field: field.to_string(),
        }
    }
}

/// Failure reported by a [`Comparable`](crate::Comparable) implementation.
///
/// Custom comparators return this when the other value is outside their
/// domain, or when the two values are in states the domain refuses to order.
///
/// ```
/// use sift::DomainError;
///
/// let err = DomainError::new("can only compare with another NullTime");
/// assert_eq!(err.message(), "can only compare with another NullTime");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DomainError {
    message: String,
}

impl DomainError {
    /// Creates a new domain error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        DomainError {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;
