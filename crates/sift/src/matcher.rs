//! Leaf matchers.
//!
//! A [`Leaf`] pairs a field name with a [`Matcher`]: how the field's value is
//! judged. Leaves are the only place where records are read.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::compare::{compare_values, strict_equal};
use crate::error::{Result, SiftError};
use crate::op::Op;
use crate::record::Record;
use crate::value::{Operand, Value};

/// User-defined test applied to a single field value.
///
/// ```
/// use sift::{FieldMatcher, Predicate, Result, Value};
///
/// #[derive(Debug)]
/// struct EvenNumber;
///
/// impl FieldMatcher for EvenNumber {
///     fn matches_field(&self, value: &Value<'_>) -> Result<bool> {
///         Ok(value
///             .as_number()
///             .is_some_and(|n| n.to_f64() % 2.0 == 0.0))
///     }
/// }
///
/// let predicate = Predicate::matcher("age", EvenNumber);
/// ```
pub trait FieldMatcher: fmt::Debug + Send + Sync {
    /// Returns whether `value` satisfies this matcher.
    fn matches_field(&self, value: &Value<'_>) -> Result<bool>;
}

/// How a leaf judges its field.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Three-way comparison against an operand.
    Compare { op: Op, operand: Operand },
    /// Equality without numeric widening.
    StrictEq(Operand),
    /// Regular expression match on a string field.
    Pattern(Regex),
    /// Equality against any member of a set.
    In(Vec<Operand>),
    /// Comparison against another field of the same record.
    Field { op: Op, other: String },
    /// User-defined matcher.
    Custom(Arc<dyn FieldMatcher>),
}

/// A single filter predicate: a field name and a matcher.
///
/// # Example
///
/// ```
/// use sift::{Leaf, Matcher, Op, Operand};
///
/// let leaf = Leaf {
///     field: "group".to_string(),
///     matcher: Matcher::Compare {
///         op: Op::Eq,
///         operand: Operand::from("staff"),
///     },
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Leaf {
    /// The field name to read.
    pub field: String,
    /// How the field value is judged.
    pub matcher: Matcher,
}

impl Leaf {
    /// Creates a new leaf.
    pub fn new(field: impl Into<String>, matcher: Matcher) -> Self {
        Leaf {
            field: field.into(),
            matcher,
        }
    }

    /// Evaluates this leaf against a record.
    ///
    /// A missing field is a [`SiftError::FieldNotFound`], never a silent
    /// `false`.
    pub fn evaluate<R: Record + ?Sized>(&self, record: &R) -> Result<bool> {
        let value = read_field(record, &self.field)?;
        match &self.matcher {
            Matcher::Compare { op, operand } => {
                let ordering = compare_values(&value, &operand.as_value())?;
                Ok(op.eval_ordering(ordering))
            }
            Matcher::StrictEq(operand) => strict_equal(&value, &operand.as_value()),
            Matcher::Pattern(regex) => match value {
                Value::String(s) => Ok(regex.is_match(s)),
                other => Err(SiftError::TypeMismatch {
                    left: other.kind(),
                    right: "pattern",
                }),
            },
            Matcher::In(members) => {
                for member in members {
                    if compare_values(&value, &member.as_value())? == Ordering::Equal {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Matcher::Field { op, other } => {
                let rhs = read_field(record, other)?;
                Ok(op.eval_ordering(compare_values(&value, &rhs)?))
            }
            Matcher::Custom(matcher) => matcher.matches_field(&value),
        }
    }
}

pub(crate) fn read_field<'r, R: Record + ?Sized>(record: &'r R, field: &str) -> Result<Value<'r>> {
    record
        .field(field)
        .ok_or_else(|| SiftError::field_not_found(field))
}
