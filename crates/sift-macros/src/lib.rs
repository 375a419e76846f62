//! Proc macros for sift.
//!
//! - [`Record`] - Generate a compile-time field table for a struct
//!
//! The derive is re-exported by the `sift` crate under its `derive`
//! feature; depend on `sift` rather than on this crate directly.

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `sift::Record` for a struct with named fields.
///
/// Only fields carrying a `#[record(...)]` kind are exposed; every other
/// field is invisible to predicates and reads as missing.
///
/// # Field Attributes
///
/// | Attribute | Field type | Exposed as |
/// |-----------|------------|------------|
/// | `String` | `impl AsRef<str>` | `Value::String` |
/// | `Number` | `Copy + Into<Number>` | `Value::Number` |
/// | `Timestamp` | `impl AsTimestamp` | `Value::Timestamp` |
/// | `Bool` | `bool` | `Value::Bool` |
/// | `Custom` | `impl Comparable` | `Value::Custom` |
/// | `optional` | `Option<T>` of the above | `None` reads as `Value::Null` |
/// | `skip` | any | not exposed |
/// | `rename = "..."` | any | under a different name |
/// | `kind = "..."` | any | kind given as a string |
///
/// # Generated Code
///
/// 1. One name constant per exposed field (`User::NAME`, `User::UPDATED_AT`)
/// 2. `FIELDS`, every exposed name in declaration order
/// 3. `impl sift::Record`
///
/// # Example
///
/// ```ignore
/// use sift::{Predicate, Query, Record};
///
/// #[derive(Record)]
/// struct User {
///     #[record(String, rename = "Name")]
///     name: String,
///
///     #[record(Number, rename = "Age")]
///     age: u8,
///
///     #[record(Timestamp, optional, rename = "UpdatedAt")]
///     updated_at: Option<std::time::SystemTime>,
///
///     password_hash: String,
/// }
///
/// assert_eq!(User::FIELDS, ["Name", "Age", "UpdatedAt"]);
///
/// let query = Query::select(Predicate::re(User::NAME, "^D")?);
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
