//! Runtime value types for field comparison.
//!
//! [`Value`] is the borrowed form a record hands out for one of its fields.
//! [`Operand`] is the owned form stored inside predicates and index bounds.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::compare::Comparable;

/// Runtime value for comparison, borrowed from the source record.
///
/// # Example
///
/// ```
/// use sift::{Number, Value};
///
/// struct User {
///     name: String,
///     age: u8,
/// }
///
/// fn field<'a>(user: &'a User, name: &str) -> Option<Value<'a>> {
///     match name {
///         "name" => Some(Value::String(&user.name)),
///         "age" => Some(Value::Number(Number::from(user.age))),
///         _ => None,
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    /// Null / unset sentinel.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// String value (borrowed).
    String(&'a str),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Value of a user-defined comparison domain.
    Custom(&'a dyn Comparable),
}

impl<'a> Value<'a> {
    /// Returns the name of this value's comparison domain.
    ///
    /// Built-in kinds report a fixed name; custom values report
    /// [`Comparable::domain`].
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::Custom(c) => c.domain(),
        }
    }

    /// Returns `true` if this is the null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match *self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Extracts the timestamp value, if present.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match *self {
            Value::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Extracts the custom comparable, if present.
    pub fn as_custom(&self) -> Option<&'a dyn Comparable> {
        match *self {
            Value::Custom(c) => Some(c),
            _ => None,
        }
    }

    /// Downcasts a custom value to its concrete type.
    ///
    /// Custom comparators use this to recognise other members of their own
    /// domain.
    pub fn downcast_ref<T: Comparable>(&self) -> Option<&'a T> {
        match *self {
            Value::Custom(c) => crate::compare::AsAny::as_any(c).downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Custom(a), b @ Value::Custom(_)) => a.compare(&b) == Ok(Ordering::Equal),
            _ => false,
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, widening mixed representations.
    ///
    /// Integers of different signedness compare exactly; anything involving a
    /// float compares as `f64`. Returns `None` when a NaN is involved.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::I64(a), Number::U64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::U64(a), Number::I64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Returns `true` if both numbers use the same representation.
    pub fn same_repr(self, other: Number) -> bool {
        std::mem::discriminant(&self) == std::mem::discriminant(&other)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

macro_rules! number_from {
    ($variant:ident: $target:ty => $($source:ty),+) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )+
    };
}

number_from!(I64: i64 => i8, i16, i32, i64, isize);
number_from!(U64: u64 => u8, u16, u32, u64, usize);
number_from!(F64: f64 => f32, f64);

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// ```
/// use sift::Timestamp;
///
/// assert!(Timestamp(1000) < Timestamp(2000));
/// assert_eq!(Timestamp::from_secs(2).as_millis(), 2000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    ///
    /// Saturates at the representable range.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the timestamp as seconds since Unix epoch.
    pub fn as_secs(self) -> i64 {
        self.0 / 1000
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Timestamp(i64::try_from(after.as_millis()).unwrap_or(i64::MAX)),
            Err(before) => {
                let millis = i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX);
                Timestamp(-millis)
            }
        }
    }
}

/// Owned value stored in predicate leaves and index bounds.
///
/// Unlike [`Value`], which borrows from the record, `Operand` owns its data
/// so predicates can be built once and evaluated many times.
#[derive(Debug, Clone)]
pub enum Operand {
    /// Null / unset sentinel.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// String value.
    String(String),
    /// Timestamp value.
    Timestamp(Timestamp),
    /// Value of a user-defined comparison domain.
    Custom(Arc<dyn Comparable>),
}

impl Operand {
    /// Wraps a user-defined comparable value.
    pub fn custom<C: Comparable>(value: C) -> Self {
        Operand::Custom(Arc::new(value))
    }

    /// Borrows this operand as a [`Value`].
    pub fn as_value(&self) -> Value<'_> {
        match self {
            Operand::Null => Value::Null,
            Operand::Bool(b) => Value::Bool(*b),
            Operand::Number(n) => Value::Number(*n),
            Operand::String(s) => Value::String(s),
            Operand::Timestamp(t) => Value::Timestamp(*t),
            Operand::Custom(c) => Value::Custom(c.as_ref()),
        }
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::String(s)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::String(s.to_string())
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Bool(b)
    }
}

impl From<Number> for Operand {
    fn from(n: Number) -> Self {
        Operand::Number(n)
    }
}

impl From<Timestamp> for Operand {
    fn from(t: Timestamp) -> Self {
        Operand::Timestamp(t)
    }
}

impl From<SystemTime> for Operand {
    fn from(t: SystemTime) -> Self {
        Operand::Timestamp(t.into())
    }
}

impl<T: Into<Operand>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        v.map_or(Operand::Null, Into::into)
    }
}

macro_rules! operand_from_number {
    ($($source:ty),+) => {
        $(
            impl From<$source> for Operand {
                fn from(n: $source) -> Self {
                    Operand::Number(Number::from(n))
                }
            }
        )+
    };
}

operand_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kinds() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::Bool(true).kind(), "bool");
        assert_eq!(Value::Number(Number::I64(1)).kind(), "number");
        assert_eq!(Value::String("a").kind(), "string");
        assert_eq!(Value::Timestamp(Timestamp(0)).kind(), "timestamp");
    }

    #[test]
    fn value_extractors() {
        assert_eq!(Value::String("hello").as_str(), Some("hello"));
        assert_eq!(
            Value::Number(Number::I64(42)).as_number(),
            Some(Number::I64(42))
        );
        assert_eq!(
            Value::Timestamp(Timestamp(1000)).as_timestamp(),
            Some(Timestamp(1000))
        );
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert!(Value::Null.is_null());

        // Wrong type returns None
        assert_eq!(Value::String("test").as_number(), None);
        assert_eq!(Value::Number(Number::I64(1)).as_str(), None);
        assert!(Value::Null.as_custom().is_none());
    }

    #[test]
    fn number_comparisons_same_type() {
        assert_eq!(
            Number::I64(5).compare(Number::I64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::U64(10).compare(Number::U64(5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::F64(5.0).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(-1).compare(Number::U64(0)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::U64(u64::MAX).compare(Number::I64(i64::MAX)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Number::U64(10).compare(Number::F64(5.5)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn number_nan_comparison() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
        assert_eq!(Number::I64(1).compare(Number::F64(f64::NAN)), None);
    }

    #[test]
    fn number_conversions() {
        assert_eq!(Number::from(42i32), Number::I64(42));
        assert_eq!(Number::from(42u8), Number::U64(42));
        assert_eq!(Number::from(42.5f64), Number::F64(42.5));
        assert!(Number::from(1i8).same_repr(Number::I64(7)));
        assert!(!Number::from(1u8).same_repr(Number::I64(1)));
    }

    #[test]
    fn timestamp_from_system_time() {
        let later = UNIX_EPOCH + std::time::Duration::from_millis(1500);
        let earlier = UNIX_EPOCH - std::time::Duration::from_millis(1500);
        assert_eq!(Timestamp::from(later), Timestamp(1500));
        assert_eq!(Timestamp::from(earlier), Timestamp(-1500));
    }

    #[test]
    fn timestamp_saturates_at_extremes() {
        assert_eq!(Timestamp::from_secs(i64::MAX / 10), Timestamp(i64::MAX));
        assert_eq!(Timestamp::from_secs(i64::MIN), Timestamp(i64::MIN));
        assert_eq!(Timestamp::from_secs(-2), Timestamp(-2000));

        // Millisecond counts past i64::MAX clamp instead of wrapping.
        let far = UNIX_EPOCH.checked_add(std::time::Duration::from_secs(1 << 60));
        if let Some(far) = far {
            assert_eq!(Timestamp::from(far), Timestamp(i64::MAX));
        }
    }

    #[test]
    fn operand_conversions() {
        assert!(matches!(Operand::from("a"), Operand::String(s) if s == "a"));
        assert!(matches!(
            Operand::from(3u16),
            Operand::Number(Number::U64(3))
        ));
        assert!(matches!(Operand::from(None::<i64>), Operand::Null));
        assert!(matches!(
            Operand::from(Some(2i64)),
            Operand::Number(Number::I64(2))
        ));
        assert_eq!(Operand::from(true).as_value(), Value::Bool(true));
    }
}
