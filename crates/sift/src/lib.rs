//! Sift - predicate queries over struct-oriented record stores.
//!
//! Sift evaluates composable predicate trees against records from a store,
//! narrowing candidates with an index when one applies. It provides:
//!
//! - Leaves: equality, ordering, regular expressions, set membership,
//!   strict equality, field-to-field comparison and custom matchers
//! - Combinators: `And`, `Or`, `Not` with deterministic short-circuiting
//! - A comparison protocol ([`Comparable`]) for user-defined value domains
//! - Single-index scan planning with full re-verification
//! - Multi-key ordering, reverse, skip and limit
//!
//! # Quick Start
//!
//! ```rust
//! use sift::{Number, Predicate, Query, Record, Value};
//!
//! struct User {
//!     name: String,
//!     group: String,
//!     age: u8,
//! }
//!
//! impl Record for User {
//!     fn field(&self, name: &str) -> Option<Value<'_>> {
//!         match name {
//!             "Name" => Some(Value::String(&self.name)),
//!             "Group" => Some(Value::String(&self.group)),
//!             "Age" => Some(Value::Number(Number::from(self.age))),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let users: Vec<User> = (21..=25)
//!     .map(|age| User {
//!         name: format!("user{age}"),
//!         group: "staff".into(),
//!         age,
//!     })
//!     .collect();
//!
//! let query = Query::select(Predicate::and([
//!     Predicate::eq("Group", "staff"),
//!     Predicate::gt("Age", 22),
//! ]));
//!
//! let found = query.filter(&users).unwrap();
//! assert_eq!(found.len(), 3);
//! assert_eq!(found[0].age, 23);
//! ```
//!
//! # Comparison Semantics
//!
//! | Left \ Right | Outcome |
//! |--------------|---------|
//! | custom / any | the custom domain decides, or fails with [`SiftError::Domain`] |
//! | number / number | widened: exact for integers, `f64` when a float is involved |
//! | string, timestamp, bool | natural order of the same kind |
//! | null / null | equal; null orders before everything else |
//! | anything else | [`SiftError::TypeMismatch`] |
//!
//! A predicate naming a field the record does not have fails with
//! [`SiftError::FieldNotFound`]. Errors abort the whole query.
//!
//! # Indexes
//!
//! A [`Store`] may index fields. The planner uses at most one index: the
//! first leaf, among those every match must satisfy, whose field is indexed.
//! Results are identical to a full scan, including their order.

extern crate self as sift;

mod compare;
mod error;
mod matcher;
mod memory;
mod op;
mod ordering;
mod plan;
mod predicate;
mod query;
mod record;
mod store;
mod value;

// Re-export public API
pub use compare::{compare_values, strict_equal, AsAny, Comparable};
pub use error::{DomainError, Result, SiftError};
pub use matcher::{FieldMatcher, Leaf, Matcher};
pub use memory::{MemoryStore, MemoryStoreBuilder};
pub use op::Op;
pub use ordering::{compare_by_orderings, Dir, OrderBy};
pub use plan::{plan, ScanPlan};
pub use predicate::Predicate;
pub use query::{Query, QueryOptions};
pub use record::{AsTimestamp, Record};
pub use store::{IndexBound, IndexCatalog, RecordId, RecordStream, Store};
pub use value::{Number, Operand, Timestamp, Value};

#[cfg(feature = "derive")]
pub use sift_macros::Record;
