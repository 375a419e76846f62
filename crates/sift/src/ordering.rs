//! Ordering types for query result sorting.
//!
//! Provides [`Dir`] for sort direction and [`OrderBy`] for field-based
//! ordering. Sorting goes through the same comparator as predicate
//! evaluation, so an incomparable pair fails the sort instead of being
//! silently treated as equal.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compare::compare_values;
use crate::error::Result;
use crate::matcher::read_field;
use crate::record::Record;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ordering key: a field and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    #[serde(default)]
    pub dir: Dir,
}

impl OrderBy {
    /// Creates a new ordering with the given direction.
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        OrderBy {
            field: field.into(),
            dir,
        }
    }

    /// Creates a new ascending ordering for the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy::new(field, Dir::Asc)
    }

    /// Creates a new descending ordering for the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy::new(field, Dir::Desc)
    }

    /// Compares two records on this key.
    pub fn compare<R: Record + ?Sized>(&self, a: &R, b: &R) -> Result<Ordering> {
        let left = read_field(a, &self.field)?;
        let right = read_field(b, &self.field)?;
        Ok(self.dir.apply(compare_values(&left, &right)?))
    }
}

/// Compares two records using a list of ordering keys.
///
/// The first key is the primary sort key, the second breaks its ties, and so
/// on. Records equal on every key compare `Equal`.
pub fn compare_by_orderings<R: Record + ?Sized>(
    a: &R,
    b: &R,
    orderings: &[OrderBy],
) -> Result<Ordering> {
    for order_by in orderings {
        let ordering = order_by.compare(a, b)?;
        if ordering != Ordering::Equal {
            return Ok(ordering);
        }
    }
    Ok(Ordering::Equal)
}

/// Stable merge sort with a fallible comparator.
///
/// The first comparator error aborts the sort and is returned.
pub(crate) fn try_sort_by<T, F>(items: Vec<T>, cmp: &mut F) -> Result<Vec<T>>
where
    F: FnMut(&T, &T) -> Result<Ordering>,
{
    if items.len() <= 1 {
        return Ok(items);
    }

    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = try_sort_by(left, cmp)?;
    let right = try_sort_by(right, cmp)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        // Ties take from the left run.
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(r, l)? == Ordering::Less,
            _ => break,
        };
        if take_right {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiftError;
    use crate::value::{Number, Operand, Value};
    use std::collections::BTreeMap;

    struct Item {
        name: &'static str,
        priority: i64,
    }

    impl Record for Item {
        fn field(&self, name: &str) -> Option<Value<'_>> {
            match name {
                "name" => Some(Value::String(self.name)),
                "priority" => Some(Value::Number(Number::I64(self.priority))),
                _ => None,
            }
        }
    }

    #[test]
    fn dir_apply() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Asc.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Greater), Ordering::Less);
    }

    #[test]
    fn dir_display() {
        assert_eq!(Dir::Asc.to_string(), "asc");
        assert_eq!(Dir::Desc.to_string(), "desc");
    }

    #[test]
    fn order_by_constructors() {
        let desc = OrderBy::desc("priority");
        assert_eq!(desc.field, "priority");
        assert!(desc.dir.is_desc());
        assert!(OrderBy::asc("name").dir.is_asc());
    }

    #[test]
    fn multiple_orderings_break_ties() {
        let a = Item {
            name: "a",
            priority: 1,
        };
        let b = Item {
            name: "b",
            priority: 1,
        };
        let c = Item {
            name: "a",
            priority: 2,
        };
        let orderings = [OrderBy::asc("priority"), OrderBy::desc("name")];

        assert_eq!(
            compare_by_orderings(&a, &b, &orderings).unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            compare_by_orderings(&a, &c, &orderings).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            compare_by_orderings(&a, &a, &orderings).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn ordering_on_missing_field_fails() {
        let a = Item {
            name: "a",
            priority: 1,
        };
        let err = compare_by_orderings(&a, &a, &[OrderBy::asc("rank")]).unwrap_err();
        assert!(matches!(err, SiftError::FieldNotFound { .. }));
    }

    #[test]
    fn ordering_on_mixed_kinds_fails() {
        let a = BTreeMap::from([("k".to_string(), Operand::from(1))]);
        let b = BTreeMap::from([("k".to_string(), Operand::from("one"))]);

        assert!(matches!(
            OrderBy::asc("k").compare(&a, &b),
            Err(SiftError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn try_sort_is_stable() {
        let items = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (0, 'e')];
        let mut by_key =
            |a: &(i32, char), b: &(i32, char)| -> Result<Ordering> { Ok(a.0.cmp(&b.0)) };
        let sorted = try_sort_by(items, &mut by_key).unwrap();

        assert_eq!(sorted, [(0, 'e'), (1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[test]
    fn try_sort_surfaces_comparator_error() {
        let items = vec![3, 1, 2];
        let mut failing = |_: &i32, _: &i32| -> Result<Ordering> {
            Err(SiftError::field_not_found("x"))
        };
        let result = try_sort_by(items, &mut failing);

        assert!(result.is_err());
    }

    #[test]
    fn dir_serde() {
        let order: OrderBy = serde_json::from_str(r#"{"field":"age","dir":"desc"}"#).unwrap();
        assert_eq!(order, OrderBy::desc("age"));

        let order: OrderBy = serde_json::from_str(r#"{"field":"age"}"#).unwrap();
        assert_eq!(order, OrderBy::asc("age"));
    }
}
