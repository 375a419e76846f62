//! Comparison protocol and the value comparator.
//!
//! [`Comparable`] lets a type define its own three-way ordering, including
//! the right to refuse a comparison. [`compare_values`] reconciles a stored
//! field value with a query operand whose kinds are only known at runtime.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use crate::error::{DomainError, Result, SiftError};
use crate::value::Value;

/// Upcast to [`Any`], implemented for every `'static` type.
pub trait AsAny {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A value type with its own ordering semantics.
///
/// `compare` receives the opposing value in its runtime form. A domain
/// typically accepts other instances of itself (via
/// [`Value::downcast_ref`]) and rejects everything else with a
/// [`DomainError`]. A domain may also refuse to order some of its own states
/// against each other.
///
/// Implementations must be reflexive (`a.compare(a) == Equal`) and
/// sign-symmetric. The engine does not check either.
///
/// # Example
///
/// ```
/// use std::cmp::Ordering;
/// use sift::{Comparable, DomainError, Value};
///
/// #[derive(Debug)]
/// struct Version(u32, u32);
///
/// impl Comparable for Version {
///     fn compare(&self, other: &Value<'_>) -> Result<Ordering, DomainError> {
///         let other = other
///             .downcast_ref::<Version>()
///             .ok_or_else(|| DomainError::new("can only compare with Version"))?;
///         Ok((self.0, self.1).cmp(&(other.0, other.1)))
///     }
/// }
///
/// let a = Version(1, 2);
/// let b = Version(1, 10);
/// assert_eq!(a.compare(&Value::Custom(&b)), Ok(Ordering::Less));
/// assert!(a.compare(&Value::String("1.10")).is_err());
/// ```
pub trait Comparable: AsAny + fmt::Debug + Send + Sync + 'static {
    /// Compares `self` with `other`.
    fn compare(&self, other: &Value<'_>) -> std::result::Result<Ordering, DomainError>;

    /// Name of this comparison domain, used in error messages.
    fn domain(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Compares a stored field value (`left`) with an operand (`right`).
///
/// Resolution order:
///
/// 1. a custom value on either side decides (the right side's answer is
///    reversed); its [`DomainError`] becomes [`SiftError::Domain`]
/// 2. null equals null and orders before every other value
/// 3. numbers are widened to a common representation
/// 4. strings, timestamps and booleans use their natural order
/// 5. anything else is a [`SiftError::TypeMismatch`]
pub fn compare_values(left: &Value<'_>, right: &Value<'_>) -> Result<Ordering> {
    match (*left, *right) {
        (Value::Custom(c), other) => c.compare(&other).map_err(|source| SiftError::Domain {
            domain: c.domain(),
            source,
        }),
        (other, Value::Custom(c)) => c
            .compare(&other)
            .map(Ordering::reverse)
            .map_err(|source| SiftError::Domain {
                domain: c.domain(),
                source,
            }),

        (Value::Null, Value::Null) => Ok(Ordering::Equal),
        (Value::Null, _) => Ok(Ordering::Less),
        (_, Value::Null) => Ok(Ordering::Greater),

        (Value::Number(a), Value::Number(b)) => a.compare(b).ok_or_else(|| SiftError::Unordered {
            left: a.to_string(),
            right: b.to_string(),
        }),
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Timestamp(a), Value::Timestamp(b)) => Ok(a.cmp(&b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(&b)),

        (l, r) => Err(SiftError::TypeMismatch {
            left: l.kind(),
            right: r.kind(),
        }),
    }
}

/// Equality without numeric widening.
///
/// Values of different kinds, or numbers of different representations, are
/// simply unequal. Custom values still go through their comparator so a
/// domain can reject foreign operands.
pub fn strict_equal(left: &Value<'_>, right: &Value<'_>) -> Result<bool> {
    match (*left, *right) {
        (Value::Custom(_), _) | (_, Value::Custom(_)) => {
            Ok(compare_values(left, right)? == Ordering::Equal)
        }
        (Value::Number(a), Value::Number(b)) if !a.same_repr(b) => Ok(false),
        (l, r) if l.kind() != r.kind() => Ok(false),
        _ => Ok(compare_values(left, right)? == Ordering::Equal),
    }
}
