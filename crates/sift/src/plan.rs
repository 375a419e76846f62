//! Scan planning.
//!
//! The planner picks at most one index to narrow the candidate set. It looks
//! only at leaves every match must satisfy (the root leaf, or leaves reached
//! through `And` nodes) and takes the first one in declaration order whose
//! field is indexed and whose matcher maps onto an [`IndexBound`].
//!
//! There is no cost model: the first applicable leaf wins even when a later
//! one would be more selective.

use std::fmt;
use std::ops::Bound;

use crate::matcher::{Leaf, Matcher};
use crate::op::Op;
use crate::predicate::Predicate;
use crate::store::{IndexBound, IndexCatalog};

/// How candidates are obtained for a query.
#[derive(Debug, Clone)]
pub enum ScanPlan {
    /// Every record, in id order.
    Full,
    /// Records selected by an index on `field`.
    Index { field: String, bound: IndexBound },
}

impl ScanPlan {
    /// Returns `true` for a full scan.
    pub fn is_full(&self) -> bool {
        matches!(self, ScanPlan::Full)
    }

    /// Returns the indexed field this plan narrows on, if any.
    pub fn index_field(&self) -> Option<&str> {
        match self {
            ScanPlan::Full => None,
            ScanPlan::Index { field, .. } => Some(field),
        }
    }
}

impl fmt::Display for ScanPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPlan::Full => f.write_str("full scan"),
            ScanPlan::Index { field, bound } => {
                let kind = match bound {
                    IndexBound::Eq(_) => "eq",
                    IndexBound::Range { .. } => "range",
                    IndexBound::Members(_) => "members",
                };
                write!(f, "index {field} ({kind})")
            }
        }
    }
}

/// Chooses a scan plan for `predicate` given the indexes in `catalog`.
pub fn plan<C: IndexCatalog + ?Sized>(predicate: &Predicate, catalog: &C) -> ScanPlan {
    predicate
        .conjunct_leaves()
        .into_iter()
        .filter(|leaf| catalog.has_index(&leaf.field))
        .find_map(|leaf| {
            index_bound(leaf).map(|bound| ScanPlan::Index {
                field: leaf.field.clone(),
                bound,
            })
        })
        .unwrap_or(ScanPlan::Full)
}

/// Maps a leaf onto an index bound, if its matcher has one.
fn index_bound(leaf: &Leaf) -> Option<IndexBound> {
    match &leaf.matcher {
        Matcher::Compare { op, operand } => {
            let operand = operand.clone();
            match op {
                Op::Eq => Some(IndexBound::Eq(operand)),
                Op::Gt => Some(IndexBound::Range {
                    lower: Bound::Excluded(operand),
                    upper: Bound::Unbounded,
                }),
                Op::Gte => Some(IndexBound::Range {
                    lower: Bound::Included(operand),
                    upper: Bound::Unbounded,
                }),
                Op::Lt => Some(IndexBound::Range {
                    lower: Bound::Unbounded,
                    upper: Bound::Excluded(operand),
                }),
                Op::Lte => Some(IndexBound::Range {
                    lower: Bound::Unbounded,
                    upper: Bound::Included(operand),
                }),
                Op::Ne => None,
            }
        }
        Matcher::StrictEq(operand) => Some(IndexBound::Eq(operand.clone())),
        Matcher::In(members) => Some(IndexBound::Members(members.clone())),
        Matcher::Pattern(_) | Matcher::Field { .. } | Matcher::Custom(_) => None,
    }
}
