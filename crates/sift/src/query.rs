//! Query builder and executor.
//!
//! A [`Query`] pairs a [`Predicate`] with [`QueryOptions`] and runs against
//! any [`Store`]. Execution order:
//!
//! ```text
//! plan       -> full scan or one index lookup
//! verify     -> every candidate is evaluated against the whole predicate
//! order      -> order_by keys, or id order for index-backed scans
//! reverse    -> if requested
//! skip/limit -> pagination
//! ```
//!
//! Any error aborts the query; partial results are never returned.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::Result;
use crate::ordering::{compare_by_orderings, try_sort_by, Dir, OrderBy};
use crate::plan::{plan, ScanPlan};
use crate::predicate::Predicate;
use crate::record::Record;
use crate::store::{IndexCatalog, RecordId, Store};

/// Ordering and pagination applied after matching.
///
/// All fields default, so a partial document deserializes:
///
/// ```
/// use sift::{OrderBy, QueryOptions};
///
/// let options: QueryOptions =
///     serde_json::from_str(r#"{ "order_by": [{ "field": "Age", "dir": "desc" }], "limit": 2 }"#)
///         .unwrap();
/// assert_eq!(options.order_by, [OrderBy::desc("Age")]);
/// assert_eq!(options.skip, 0);
/// assert_eq!(options.limit, Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Sort keys, primary first.
    pub order_by: Vec<OrderBy>,
    /// Number of leading matches to drop.
    pub skip: usize,
    /// Maximum number of matches to return.
    pub limit: Option<usize>,
    /// Reverse the ordered matches before pagination.
    pub reverse: bool,
}

/// A predicate plus result options.
///
/// # Example
///
/// ```
/// use sift::{Dir, MemoryStore, Operand, Predicate, Query};
/// use std::collections::BTreeMap;
///
/// let rows: Vec<BTreeMap<String, Operand>> = [("staff", 21), ("staff", 24), ("guest", 30)]
///     .into_iter()
///     .map(|(group, age)| {
///         BTreeMap::from([
///             ("Group".to_string(), Operand::from(group)),
///             ("Age".to_string(), Operand::from(age)),
///         ])
///     })
///     .collect();
/// let store = MemoryStore::builder(rows).index("Group").build().unwrap();
///
/// let query = Query::select(Predicate::and([
///     Predicate::eq("Group", "staff"),
///     Predicate::gt("Age", 20),
/// ]))
/// .order_by("Age", Dir::Desc)
/// .limit(1);
///
/// let oldest = query.find(&store).unwrap();
/// assert_eq!(oldest.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    predicate: Predicate,
    options: QueryOptions,
}

impl Query {
    /// Creates a query matching every record.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a query selecting the records that satisfy `predicate`.
    pub fn select(predicate: Predicate) -> Self {
        Query {
            predicate,
            options: QueryOptions::default(),
        }
    }

    // ========================================================================
    // Options
    // ========================================================================

    /// Adds a sort key.
    pub fn order_by(mut self, field: impl Into<String>, dir: Dir) -> Self {
        self.options.order_by.push(OrderBy::new(field, dir));
        self
    }

    /// Adds an ascending sort key.
    pub fn order_asc(self, field: impl Into<String>) -> Self {
        self.order_by(field, Dir::Asc)
    }

    /// Adds a descending sort key.
    pub fn order_desc(self, field: impl Into<String>) -> Self {
        self.order_by(field, Dir::Desc)
    }

    /// Sets the number of matches to skip.
    pub fn skip(mut self, n: usize) -> Self {
        self.options.skip = n;
        self
    }

    /// Sets the maximum number of matches to return.
    pub fn limit(mut self, n: usize) -> Self {
        self.options.limit = Some(n);
        self
    }

    /// Reverses the ordered matches before skip and limit apply.
    pub fn reverse(mut self) -> Self {
        self.options.reverse = true;
        self
    }

    /// Replaces all options, e.g. with a deserialized [`QueryOptions`].
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the predicate.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Returns the options.
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Returns the plan this query would use against `catalog`.
    pub fn plan_for<C: IndexCatalog + ?Sized>(&self, catalog: &C) -> ScanPlan {
        plan(&self.predicate, catalog)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Tests a single record against the predicate.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> Result<bool> {
        self.predicate.evaluate(record)
    }

    /// Returns every match, ordered and paginated.
    pub fn find<S: Store>(&self, store: S) -> Result<Vec<S::Record>> {
        self.run(&store, self.options.limit)
    }

    /// Returns the first match after ordering and skip.
    pub fn first<S: Store>(&self, store: S) -> Result<Option<S::Record>> {
        let limit = self.options.limit.map_or(1, |n| n.min(1));
        Ok(self.run(&store, Some(limit))?.into_iter().next())
    }

    /// Counts the matches remaining after skip and limit.
    pub fn count<S: Store>(&self, store: S) -> Result<usize> {
        Ok(self.run(&store, self.options.limit)?.len())
    }

    /// Visits matches in final order until `visit` breaks.
    ///
    /// Matching and ordering complete before the first visit, so an error
    /// means no record was visited.
    pub fn each<S, F>(&self, store: S, mut visit: F) -> Result<()>
    where
        S: Store,
        F: FnMut(S::Record) -> ControlFlow<()>,
    {
        for record in self.run(&store, self.options.limit)? {
            if visit(record).is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Filters a slice, returning references to the matches.
    ///
    /// Slices have no indexes, so this is always a full scan.
    pub fn filter<'a, T: Record>(&self, items: &'a [T]) -> Result<Vec<&'a T>> {
        self.find(items)
    }

    fn run<S: Store>(&self, store: &S, limit: Option<usize>) -> Result<Vec<S::Record>> {
        let options = &self.options;
        let plan = plan(&self.predicate, store);
        debug!(
            plan = %plan,
            order_by = options.order_by.len(),
            skip = options.skip,
            limit = ?limit,
            reverse = options.reverse,
            "executing query"
        );

        let candidates = match &plan {
            ScanPlan::Full => store.scan()?,
            ScanPlan::Index { field, bound } => store.lookup(field, bound)?,
        };

        // Without reordering, a full scan already yields the final order.
        let wanted = match (&plan, options.order_by.is_empty(), options.reverse) {
            (ScanPlan::Full, true, false) => limit.map(|n| options.skip.saturating_add(n)),
            _ => None,
        };

        let mut matches: Vec<(RecordId, S::Record)> = Vec::new();
        if wanted != Some(0) {
            for candidate in candidates {
                let (id, record) = candidate?;
                if self.predicate.evaluate(&record)? {
                    matches.push((id, record));
                    if wanted.is_some_and(|n| matches.len() >= n) {
                        break;
                    }
                } else {
                    trace!(id, "candidate rejected");
                }
            }
        }

        if !plan.is_full() {
            // Index order differs from id order; restore it so ties and
            // unordered output match a full scan.
            matches.sort_by_key(|(id, _)| *id);
        }

        let mut records = if options.order_by.is_empty() {
            matches.into_iter().map(|(_, record)| record).collect()
        } else {
            let records: Vec<S::Record> = matches.into_iter().map(|(_, record)| record).collect();
            try_sort_by(records, &mut |a: &S::Record, b: &S::Record| {
                compare_by_orderings(a, b, &options.order_by)
            })?
        };

        if options.reverse {
            records.reverse();
        }

        let records: Vec<S::Record> = records
            .into_iter()
            .skip(options.skip)
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        debug!(matched = records.len(), "query finished");
        Ok(records)
    }
}

impl From<Predicate> for Query {
    fn from(predicate: Predicate) -> Self {
        Query::select(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiftError;
    use crate::memory::MemoryStore;
    use crate::value::{Number, Value};

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        name: &'static str,
        group: &'static str,
        age: i64,
    }

    impl Record for User {
        fn field(&self, name: &str) -> Option<Value<'_>> {
            match name {
                "Name" => Some(Value::String(self.name)),
                "Group" => Some(Value::String(self.group)),
                "Age" => Some(Value::Number(Number::I64(self.age))),
                _ => None,
            }
        }
    }

    fn users() -> Vec<User> {
        vec![
            User {
                name: "John",
                group: "staff",
                age: 21,
            },
            User {
                name: "Donald",
                group: "staff",
                age: 23,
            },
            User {
                name: "Dilbert",
                group: "guest",
                age: 22,
            },
            User {
                name: "Wally",
                group: "staff",
                age: 25,
            },
            User {
                name: "Alice",
                group: "staff",
                age: 24,
            },
        ]
    }

    fn names(found: &[&User]) -> Vec<&'static str> {
        found.iter().map(|u| u.name).collect()
    }

    #[test]
    fn empty_query_matches_all_in_id_order() {
        let users = users();
        let found = Query::new().filter(&users).unwrap();
        assert_eq!(names(&found), ["John", "Donald", "Dilbert", "Wally", "Alice"]);
    }

    #[test]
    fn conjunction_over_slice() {
        let users = users();
        let query = Query::select(Predicate::and([
            Predicate::eq("Group", "staff"),
            Predicate::gt("Age", 22),
        ]));

        let found = query.filter(&users).unwrap();
        assert_eq!(names(&found), ["Donald", "Wally", "Alice"]);
    }

    #[test]
    fn ordering_skip_limit_reverse() {
        let users = users();
        let base = Query::new().order_asc("Age");

        let found = base.clone().skip(1).limit(2).filter(&users).unwrap();
        assert_eq!(names(&found), ["Dilbert", "Donald"]);

        let found = base.clone().reverse().limit(2).filter(&users).unwrap();
        assert_eq!(names(&found), ["Wally", "Alice"]);

        let found = base.skip(10).filter(&users).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn multi_key_ordering() {
        let users = users();
        let found = Query::new()
            .order_desc("Group")
            .order_asc("Name")
            .filter(&users)
            .unwrap();
        assert_eq!(
            names(&found),
            ["Alice", "Donald", "John", "Wally", "Dilbert"]
        );
    }

    #[test]
    fn index_backed_results_match_full_scan() {
        let users = users();
        let indexed = MemoryStore::builder(users.clone())
            .index("Age")
            .index("Group")
            .build()
            .unwrap();
        let plain = MemoryStore::new(users);

        let queries = [
            Query::select(Predicate::gt("Age", 21)),
            Query::select(Predicate::and([
                Predicate::eq("Group", "staff"),
                Predicate::lte("Age", 24),
            ])),
            Query::select(Predicate::in_set("Age", [25, 21, 23])).limit(2),
            Query::select(Predicate::gte("Age", 22))
                .order_asc("Group")
                .reverse(),
        ];

        for query in &queries {
            assert!(!query.plan_for(&indexed).is_full());
            assert!(query.plan_for(&plain).is_full());
            assert_eq!(
                query.find(&indexed).unwrap(),
                query.find(&plain).unwrap(),
                "{query:?}"
            );
        }
    }

    #[test]
    fn first_count_each() {
        let users = users();
        let staff = Query::select(Predicate::eq("Group", "staff")).order_desc("Age");

        assert_eq!(staff.first(&users[..]).unwrap().unwrap().name, "Wally");
        assert_eq!(staff.count(&users[..]).unwrap(), 4);
        assert_eq!(staff.clone().skip(1).limit(2).count(&users[..]).unwrap(), 2);
        assert!(Query::select(Predicate::eq("Group", "none"))
            .first(&users[..])
            .unwrap()
            .is_none());

        let mut seen = Vec::new();
        staff
            .each(&users[..], |user| {
                seen.push(user.name);
                if seen.len() == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(seen, ["Wally", "Alice"]);
    }

    #[test]
    fn errors_abort_the_query() {
        let users = users();

        let err = Query::select(Predicate::eq("Nickname", "x"))
            .filter(&users)
            .unwrap_err();
        assert!(matches!(err, SiftError::FieldNotFound { field } if field == "Nickname"));

        let err = Query::new().order_asc("Nickname").filter(&users).unwrap_err();
        assert!(matches!(err, SiftError::FieldNotFound { .. }));

        let err = Query::select(Predicate::gt("Age", "x"))
            .filter(&users)
            .unwrap_err();
        assert!(matches!(err, SiftError::TypeMismatch { .. }));
    }

    #[test]
    fn options_from_config() {
        let users = users();
        let options: QueryOptions =
            serde_json::from_str(r#"{"order_by":[{"field":"Age"}],"skip":1,"reverse":true}"#)
                .unwrap();

        let found = Query::new().with_options(options).filter(&users).unwrap();
        assert_eq!(names(&found), ["Alice", "Donald", "Dilbert", "John"]);
    }
}
