//! Composable predicate trees.
//!
//! A [`Predicate`] is built once and evaluated any number of times. It is
//! immutable, `Clone`, and safe to share between threads.
//!
//! # Evaluation Semantics
//!
//! ```text
//! True        -> true
//! Leaf        -> read field, compare (missing field is an error)
//! And(c...)   -> left to right, first false wins, first error wins
//! Or(c...)    -> left to right, first true wins, first error wins
//! Not(c)      -> inverted verdict, error passes through unchanged
//! ```
//!
//! Children are always evaluated in construction order, so which error
//! surfaces (or whether one surfaces at all) is deterministic.
//!
//! `And([])` matches everything and `Or([])` matches nothing.

use std::sync::Arc;

use regex::Regex;

use crate::error::Result;
use crate::matcher::{FieldMatcher, Leaf, Matcher};
use crate::op::Op;
use crate::record::Record;
use crate::value::Operand;

/// Node of a predicate tree.
///
/// # Example
///
/// ```
/// use sift::Predicate;
///
/// let staff_over_22 = Predicate::and([
///     Predicate::eq("group", "staff"),
///     Predicate::gt("age", 22),
/// ]);
/// ```
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Matches every record.
    True,
    /// Field test.
    Leaf(Leaf),
    /// All children must match.
    And(Vec<Predicate>),
    /// At least one child must match.
    Or(Vec<Predicate>),
    /// The child must not match.
    Not(Box<Predicate>),
}

impl Predicate {
    // ========================================================================
    // Comparison leaves
    // ========================================================================

    fn compare(field: impl Into<String>, op: Op, operand: impl Into<Operand>) -> Self {
        Predicate::Leaf(Leaf::new(
            field,
            Matcher::Compare {
                op,
                operand: operand.into(),
            },
        ))
    }

    /// Field equals the operand.
    pub fn eq(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::compare(field, Op::Eq, operand)
    }

    /// Field differs from the operand.
    pub fn ne(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::compare(field, Op::Ne, operand)
    }

    /// Field is greater than the operand.
    pub fn gt(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::compare(field, Op::Gt, operand)
    }

    /// Field is greater than or equal to the operand.
    pub fn gte(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::compare(field, Op::Gte, operand)
    }

    /// Field is less than the operand.
    pub fn lt(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::compare(field, Op::Lt, operand)
    }

    /// Field is less than or equal to the operand.
    pub fn lte(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::compare(field, Op::Lte, operand)
    }

    /// Field equals the operand in both kind and numeric representation.
    pub fn strict_eq(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Predicate::Leaf(Leaf::new(field, Matcher::StrictEq(operand.into())))
    }

    /// String field matches a regular expression.
    ///
    /// The pattern is compiled here, so invalid syntax fails immediately.
    pub fn re(field: impl Into<String>, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        Ok(Predicate::Leaf(Leaf::new(field, Matcher::Pattern(regex))))
    }

    /// Field equals at least one of the given values.
    pub fn in_set<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        let set = values.into_iter().map(Into::into).collect();
        Predicate::Leaf(Leaf::new(field, Matcher::In(set)))
    }

    /// Applies a user-defined matcher to the field.
    pub fn matcher<M>(field: impl Into<String>, matcher: M) -> Self
    where
        M: FieldMatcher + 'static,
    {
        Predicate::Leaf(Leaf::new(field, Matcher::Custom(Arc::new(matcher))))
    }

    // ========================================================================
    // Field-to-field leaves
    // ========================================================================

    fn compare_fields(field: impl Into<String>, op: Op, other: impl Into<String>) -> Self {
        Predicate::Leaf(Leaf::new(
            field,
            Matcher::Field {
                op,
                other: other.into(),
            },
        ))
    }

    /// Field equals another field of the same record.
    pub fn eq_field(field: impl Into<String>, other: impl Into<String>) -> Self {
        Self::compare_fields(field, Op::Eq, other)
    }

    /// Field differs from another field of the same record.
    pub fn ne_field(field: impl Into<String>, other: impl Into<String>) -> Self {
        Self::compare_fields(field, Op::Ne, other)
    }

    /// Field is greater than another field of the same record.
    pub fn gt_field(field: impl Into<String>, other: impl Into<String>) -> Self {
        Self::compare_fields(field, Op::Gt, other)
    }

    /// Field is greater than or equal to another field of the same record.
    pub fn gte_field(field: impl Into<String>, other: impl Into<String>) -> Self {
        Self::compare_fields(field, Op::Gte, other)
    }

    /// Field is less than another field of the same record.
    pub fn lt_field(field: impl Into<String>, other: impl Into<String>) -> Self {
        Self::compare_fields(field, Op::Lt, other)
    }

    /// Field is less than or equal to another field of the same record.
    pub fn lte_field(field: impl Into<String>, other: impl Into<String>) -> Self {
        Self::compare_fields(field, Op::Lte, other)
    }

    // ========================================================================
    // Combinators
    // ========================================================================

    /// Conjunction. An empty conjunction matches everything.
    pub fn and<I>(children: I) -> Self
    where
        I: IntoIterator<Item = Predicate>,
    {
        Predicate::And(children.into_iter().collect())
    }

    /// Disjunction. An empty disjunction matches nothing.
    pub fn or<I>(children: I) -> Self
    where
        I: IntoIterator<Item = Predicate>,
    {
        Predicate::Or(children.into_iter().collect())
    }

    /// Negation of a single predicate.
    pub fn not(child: Predicate) -> Self {
        Predicate::Not(Box::new(child))
    }

    /// Matches when none of the children match: `Not(Or(children))`.
    pub fn none_of<I>(children: I) -> Self
    where
        I: IntoIterator<Item = Predicate>,
    {
        Predicate::not(Predicate::or(children))
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Evaluates this predicate against a record.
    pub fn evaluate<R: Record + ?Sized>(&self, record: &R) -> Result<bool> {
        match self {
            Predicate::True => Ok(true),
            Predicate::Leaf(leaf) => leaf.evaluate(record),
            Predicate::And(children) => {
                for child in children {
                    if !child.evaluate(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Or(children) => {
                for child in children {
                    if child.evaluate(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::Not(child) => child.evaluate(record).map(|matched| !matched),
        }
    }

    /// Returns the leaves reachable from the root through `And` nodes only,
    /// in declaration order.
    ///
    /// Only these leaves constrain every match, so only these may narrow a
    /// scan.
    pub fn conjunct_leaves(&self) -> Vec<&Leaf> {
        let mut leaves = Vec::new();
        collect_conjuncts(self, &mut leaves);
        leaves
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::True
    }
}

fn collect_conjuncts<'p>(predicate: &'p Predicate, out: &mut Vec<&'p Leaf>) {
    match predicate {
        Predicate::Leaf(leaf) => out.push(leaf),
        Predicate::And(children) => {
            for child in children {
                collect_conjuncts(child, out);
            }
        }
        Predicate::True | Predicate::Or(_) | Predicate::Not(_) => {}
    }
}
