//! Record access traits.
//!
//! The engine never inspects records directly. It asks a [`Record`] for a
//! named field and gets back a [`Value`], or `None` when the record shape has
//! no such field.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;
use std::time::SystemTime;

use crate::value::{Operand, Timestamp, Value};

/// A record that predicates can be evaluated against.
///
/// This trait is typically derived with `#[derive(Record)]`, which builds the
/// field table at compile time, but can also be implemented by hand.
///
/// # Derive Usage
///
/// ```
/// # #[cfg(feature = "derive")]
/// # {
/// use sift::{Predicate, Query, Record};
///
/// #[derive(Record)]
/// struct User {
///     #[record(String)]
///     name: String,
///     #[record(Number)]
///     age: u8,
/// }
///
/// let users = vec![
///     User { name: "John".into(), age: 21 },
///     User { name: "Donald".into(), age: 23 },
/// ];
///
/// let query = Query::select(Predicate::gt(User::AGE, 22));
/// let found = query.filter(&users).unwrap();
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].name, "Donald");
/// # }
/// ```
///
/// # Manual Implementation
///
/// ```
/// use sift::{Number, Record, Value};
///
/// struct User {
///     name: String,
///     age: u8,
/// }
///
/// impl Record for User {
///     fn field(&self, name: &str) -> Option<Value<'_>> {
///         match name {
///             "name" => Some(Value::String(&self.name)),
///             "age" => Some(Value::Number(Number::from(self.age))),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the value of a field, or `None` if the record has no such field.
    fn field(&self, name: &str) -> Option<Value<'_>>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        (**self).field(name)
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        (**self).field(name)
    }
}

impl<R: Record + ?Sized> Record for Rc<R> {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        (**self).field(name)
    }
}

impl<R: Record + ?Sized> Record for Arc<R> {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        (**self).field(name)
    }
}

/// Dynamic records: every key is a field.
impl Record for BTreeMap<String, Operand> {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        self.get(name).map(Operand::as_value)
    }
}

impl<S: BuildHasher> Record for HashMap<String, Operand, S> {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        self.get(name).map(Operand::as_value)
    }
}

/// Conversion to a [`Timestamp`] for `#[record(Timestamp)]` fields.
///
/// ```
/// use sift::{AsTimestamp, Timestamp};
///
/// struct Millis(i64);
///
/// impl AsTimestamp for Millis {
///     fn as_timestamp(&self) -> Timestamp {
///         Timestamp::from_millis(self.0)
///     }
/// }
/// ```
pub trait AsTimestamp {
    /// Converts this value to a [`Timestamp`].
    fn as_timestamp(&self) -> Timestamp;
}

impl AsTimestamp for Timestamp {
    fn as_timestamp(&self) -> Timestamp {
        *self
    }
}

impl AsTimestamp for i64 {
    fn as_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl AsTimestamp for u64 {
    fn as_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl AsTimestamp for SystemTime {
    fn as_timestamp(&self) -> Timestamp {
        Timestamp::from(*self)
    }
}
