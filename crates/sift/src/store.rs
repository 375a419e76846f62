//! Contracts with the storage layer.
//!
//! The engine only reads. A [`Store`] hands out candidate records, either all
//! of them in id order or those an index selects for an [`IndexBound`], in
//! index-key order. Snapshot stability for the length of one query is the
//! store's business.

use std::cmp::Ordering;
use std::ops::Bound;

use crate::compare::compare_values;
use crate::error::{Result, SiftError};
use crate::record::Record;
use crate::value::{Operand, Value};

/// Identifier of a record within its store.
pub type RecordId = u64;

/// Lazy, forward-only sequence of candidate records with their ids.
pub type RecordStream<'a, R> = Box<dyn Iterator<Item = Result<(RecordId, R)>> + 'a>;

/// Knowledge of which fields are indexed.
pub trait IndexCatalog {
    /// Returns `true` if `field` has an ordered index.
    fn has_index(&self, field: &str) -> bool;
}

/// Source of candidate records.
pub trait Store: IndexCatalog {
    /// Record type yielded by this store.
    type Record: Record;

    /// Streams every record in ascending id order.
    fn scan(&self) -> Result<RecordStream<'_, Self::Record>>;

    /// Streams the records whose indexed `field` satisfies `bound`, in index
    /// order.
    ///
    /// The bound only narrows candidates; every record is still verified
    /// against the full predicate afterwards.
    fn lookup(&self, field: &str, bound: &IndexBound) -> Result<RecordStream<'_, Self::Record>>;
}

/// Index-exploitable constraint on a single field.
#[derive(Debug, Clone)]
pub enum IndexBound {
    /// Point lookup.
    Eq(Operand),
    /// Range lookup; each side may be open.
    Range {
        lower: Bound<Operand>,
        upper: Bound<Operand>,
    },
    /// Union of point lookups.
    Members(Vec<Operand>),
}

impl IndexBound {
    /// Returns whether an index key falls inside this bound.
    ///
    /// Stores without sorted access can implement [`Store::lookup`] by
    /// filtering with this. Uses the same comparator as predicate evaluation,
    /// so comparator errors surface here too.
    pub fn contains(&self, key: &Value<'_>) -> Result<bool> {
        match self {
            IndexBound::Eq(operand) => {
                Ok(compare_values(key, &operand.as_value())? == Ordering::Equal)
            }
            IndexBound::Range { lower, upper } => {
                let above = match lower {
                    Bound::Included(v) => compare_values(key, &v.as_value())? != Ordering::Less,
                    Bound::Excluded(v) => {
                        compare_values(key, &v.as_value())? == Ordering::Greater
                    }
                    Bound::Unbounded => true,
                };
                if !above {
                    return Ok(false);
                }
                let below = match upper {
                    Bound::Included(v) => {
                        compare_values(key, &v.as_value())? != Ordering::Greater
                    }
                    Bound::Excluded(v) => compare_values(key, &v.as_value())? == Ordering::Less,
                    Bound::Unbounded => true,
                };
                Ok(below)
            }
            IndexBound::Members(members) => {
                for member in members {
                    if compare_values(key, &member.as_value())? == Ordering::Equal {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

impl<C: IndexCatalog + ?Sized> IndexCatalog for &C {
    fn has_index(&self, field: &str) -> bool {
        (**self).has_index(field)
    }
}

/// Slices are stores without indexes; a record's id is its position.
impl<T: Record> IndexCatalog for [T] {
    fn has_index(&self, _field: &str) -> bool {
        false
    }
}

impl<'s, T: Record> Store for &'s [T] {
    type Record = &'s T;

    fn scan(&self) -> Result<RecordStream<'_, &'s T>> {
        let items: &'s [T] = *self;
        Ok(Box::new(
            items
                .iter()
                .enumerate()
                .map(|(pos, item)| Ok::<_, SiftError>((pos as RecordId, item))),
        ))
    }

    fn lookup(&self, field: &str, _bound: &IndexBound) -> Result<RecordStream<'_, &'s T>> {
        Err(SiftError::Index {
            field: field.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    fn n(v: i64) -> Value<'static> {
        Value::Number(Number::I64(v))
    }

    #[test]
    fn eq_bound() {
        let bound = IndexBound::Eq(22i64.into());
        assert!(bound.contains(&n(22)).unwrap());
        assert!(!bound.contains(&n(23)).unwrap());
    }

    #[test]
    fn range_bounds() {
        let gt = IndexBound::Range {
            lower: Bound::Excluded(22i64.into()),
            upper: Bound::Unbounded,
        };
        assert!(!gt.contains(&n(22)).unwrap());
        assert!(gt.contains(&n(23)).unwrap());

        let closed = IndexBound::Range {
            lower: Bound::Included(21i64.into()),
            upper: Bound::Included(23i64.into()),
        };
        assert!(closed.contains(&n(21)).unwrap());
        assert!(closed.contains(&n(23)).unwrap());
        assert!(!closed.contains(&n(24)).unwrap());

        let lt = IndexBound::Range {
            lower: Bound::Unbounded,
            upper: Bound::Excluded(21i64.into()),
        };
        assert!(!lt.contains(&n(21)).unwrap());
        assert!(lt.contains(&n(20)).unwrap());
    }

    #[test]
    fn members_bound() {
        let bound = IndexBound::Members(vec![1i64.into(), 3i64.into()]);
        assert!(bound.contains(&n(3)).unwrap());
        assert!(!bound.contains(&n(2)).unwrap());
    }

    #[test]
    fn bound_mismatch_is_an_error() {
        let bound = IndexBound::Eq("x".into());
        assert!(bound.contains(&n(1)).is_err());
    }

    #[test]
    fn slice_store_scans_in_position_order() {
        let rows = vec![
            std::collections::BTreeMap::from([("a".to_string(), Operand::from(1i64))]),
            std::collections::BTreeMap::from([("a".to_string(), Operand::from(2i64))]),
        ];
        let store: &[_] = &rows;

        let ids: Vec<RecordId> = store.scan().unwrap().map(|r| r.unwrap().0).collect();
        assert_eq!(ids, [0, 1]);
        assert!(!store.has_index("a"));
        assert!(store.lookup("a", &IndexBound::Eq(1i64.into())).is_err());
    }
}
