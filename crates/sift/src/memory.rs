//! In-memory store with build-once sorted indexes.
//!
//! [`MemoryStore`] holds records in a `Vec`; a record's id is its position.
//! Each index is a list of positions sorted by the indexed field, with ties
//! kept in id order. Indexes are never updated after construction.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::ops::{Bound, Range};

use tracing::debug;

use crate::compare::compare_values;
use crate::error::{Result, SiftError};
use crate::matcher::read_field;
use crate::ordering::try_sort_by;
use crate::record::Record;
use crate::store::{IndexBound, IndexCatalog, RecordId, RecordStream, Store};
use crate::value::{Operand, Value};

/// Read-only store over a vector of records.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use sift::{MemoryStore, Operand, Predicate, Query};
///
/// let rows: Vec<BTreeMap<String, Operand>> = (21..=25)
///     .map(|age| BTreeMap::from([("Age".to_string(), Operand::from(age))]))
///     .collect();
///
/// let store = MemoryStore::builder(rows).index("Age").build().unwrap();
/// let found = Query::select(Predicate::gte("Age", 24)).find(&store).unwrap();
/// assert_eq!(found.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    records: Vec<T>,
    indexes: BTreeMap<String, Vec<usize>>,
}

impl<T: Record> MemoryStore<T> {
    /// Creates a store without indexes.
    pub fn new(records: Vec<T>) -> Self {
        MemoryStore {
            records,
            indexes: BTreeMap::new(),
        }
    }

    /// Starts building a store with indexes.
    pub fn builder<I>(records: I) -> MemoryStoreBuilder<T>
    where
        I: IntoIterator<Item = T>,
    {
        MemoryStoreBuilder {
            records: records.into_iter().collect(),
            fields: Vec::new(),
        }
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record with the given id.
    pub fn get(&self, id: RecordId) -> Option<&T> {
        usize::try_from(id).ok().and_then(|pos| self.records.get(pos))
    }

    /// Returns all records in id order.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Returns the indexed field names, sorted.
    pub fn indexed_fields(&self) -> impl Iterator<Item = &str> {
        self.indexes.keys().map(String::as_str)
    }
}

impl<T> IndexCatalog for MemoryStore<T> {
    fn has_index(&self, field: &str) -> bool {
        self.indexes.contains_key(field)
    }
}

impl<'s, T: Record> Store for &'s MemoryStore<T> {
    type Record = &'s T;

    fn scan(&self) -> Result<RecordStream<'_, &'s T>> {
        let store: &'s MemoryStore<T> = *self;
        Ok(Box::new(
            store
                .records
                .iter()
                .enumerate()
                .map(|(pos, record)| Ok::<_, SiftError>((pos as RecordId, record))),
        ))
    }

    fn lookup(&self, field: &str, bound: &IndexBound) -> Result<RecordStream<'_, &'s T>> {
        let store: &'s MemoryStore<T> = *self;
        let index = store.indexes.get(field).ok_or_else(|| SiftError::Index {
            field: field.to_string(),
        })?;
        let entry = move |offset: usize| {
            let pos = index[offset];
            (pos as RecordId, &store.records[pos])
        };

        match bound {
            IndexBound::Eq(value) => {
                let point = Bound::Included(value);
                let span = seek(&store.records, index, field, point, point)?;
                Ok(Box::new(span.map(move |offset| Ok::<_, SiftError>(entry(offset)))))
            }
            IndexBound::Range { lower, upper } => {
                let span = seek(&store.records, index, field, lower.as_ref(), upper.as_ref())?;
                Ok(Box::new(span.map(move |offset| Ok::<_, SiftError>(entry(offset)))))
            }
            IndexBound::Members(members) => {
                // Union of point lookups, first occurrence wins.
                let mut seen = HashSet::new();
                let mut hits: Vec<Result<(RecordId, &'s T)>> = Vec::new();
                for member in members {
                    let point = Bound::Included(member);
                    for offset in seek(&store.records, index, field, point, point)? {
                        if seen.insert(index[offset]) {
                            hits.push(Ok(entry(offset)));
                        }
                    }
                }
                Ok(Box::new(hits.into_iter()))
            }
        }
    }
}

/// Binary-searches `index` for the offsets whose keys lie between `lower`
/// and `upper`. Reads O(log n) keys.
fn seek<T: Record>(
    records: &[T],
    index: &[usize],
    field: &str,
    lower: Bound<&Operand>,
    upper: Bound<&Operand>,
) -> Result<Range<usize>> {
    let cmp = |offset: usize, operand: &Operand| -> Result<Ordering> {
        let key = read_field(&records[index[offset]], field)?;
        compare_values(&key, &operand.as_value())
    };

    let start = match lower {
        Bound::Included(v) => partition_point(0, index.len(), |i| Ok(cmp(i, v)?.is_lt()))?,
        Bound::Excluded(v) => partition_point(0, index.len(), |i| Ok(cmp(i, v)?.is_le()))?,
        Bound::Unbounded => 0,
    };
    let end = match upper {
        Bound::Included(v) => partition_point(start, index.len(), |i| Ok(cmp(i, v)?.is_le()))?,
        Bound::Excluded(v) => partition_point(start, index.len(), |i| Ok(cmp(i, v)?.is_lt()))?,
        Bound::Unbounded => index.len(),
    };
    Ok(start..end.max(start))
}

/// Fallible `partition_point` over `lo..hi`: the first offset where `pred`
/// turns false. `pred` must be true for a prefix and false after it.
fn partition_point<F>(mut lo: usize, mut hi: usize, mut pred: F) -> Result<usize>
where
    F: FnMut(usize) -> Result<bool>,
{
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid)? {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    Ok(lo)
}

/// Builder for [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryStoreBuilder<T> {
    records: Vec<T>,
    fields: Vec<String>,
}

impl<T: Record> MemoryStoreBuilder<T> {
    /// Adds an ordered index on `field`.
    pub fn index(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
        self
    }

    /// Builds the store and its indexes.
    ///
    /// Fails if a record lacks an indexed field, or if two indexed values
    /// cannot be compared.
    pub fn build(self) -> Result<MemoryStore<T>> {
        let mut indexes = BTreeMap::new();
        for field in self.fields {
            let positions = build_index(&self.records, &field)?;
            debug!(field = %field, entries = positions.len(), "built index");
            indexes.insert(field, positions);
        }
        Ok(MemoryStore {
            records: self.records,
            indexes,
        })
    }
}

fn build_index<T: Record>(records: &[T], field: &str) -> Result<Vec<usize>> {
    let keys = records
        .iter()
        .map(|record| read_field(record, field))
        .collect::<Result<Vec<Value<'_>>>>()?;

    let positions: Vec<usize> = (0..records.len()).collect();
    try_sort_by(positions, &mut |a: &usize, b: &usize| {
        compare_values(&keys[*a], &keys[*b])
    })
}
