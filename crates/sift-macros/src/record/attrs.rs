//! Parsing of `#[record(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Ident, Lit, Meta, Result, Token,
};

/// How a field is exposed to predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `#[record(String)]`: anything that is `AsRef<str>`.
    String,
    /// `#[record(Number)]`: any `Copy` type convertible to `Number`.
    Number,
    /// `#[record(Timestamp)]`: any `AsTimestamp` type.
    Timestamp,
    /// `#[record(Bool)]`
    Bool,
    /// `#[record(Custom)]`: a `Comparable` type.
    Custom,
}

const EXPECTED: &str = "String, Number, Timestamp, Bool, Custom";

impl FieldKind {
    fn parse_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "String" | "string" => Ok(FieldKind::String),
            "Number" | "number" => Ok(FieldKind::Number),
            "Timestamp" | "timestamp" => Ok(FieldKind::Timestamp),
            "Bool" | "bool" | "boolean" => Ok(FieldKind::Bool),
            "Custom" | "custom" => Ok(FieldKind::Custom),
            other => Err(Error::new(
                span,
                format!("unknown record field kind '{other}', expected one of: {EXPECTED}"),
            )),
        }
    }

    /// Parses a kind from a bare identifier.
    pub fn from_ident(ident: &Ident) -> Result<Self> {
        Self::parse_name(&ident.to_string(), ident.span())
    }
}

/// Field-level attributes from `#[record(...)]`.
#[derive(Debug, Clone, Default)]
pub struct RecordAttr {
    /// How the field is exposed; `None` leaves the field out.
    pub kind: Option<FieldKind>,
    /// Explicitly excluded.
    pub skip: bool,
    /// The field is an `Option<T>`; `None` reads as the null sentinel.
    pub optional: bool,
    /// Name used in predicates, if not the Rust field name.
    pub rename: Option<String>,
}

fn string_literal(expr: &Expr, what: &str) -> Result<(String, Span)> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok((s.value(), s.span())),
        other => Err(Error::new(
            other.span(),
            format!("{what} must be a string literal"),
        )),
    }
}

impl Parse for RecordAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = RecordAttr::default();
        let metas: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in metas {
            match &meta {
                Meta::Path(path) => {
                    if path.is_ident("skip") {
                        attr.skip = true;
                    } else if path.is_ident("optional") {
                        attr.optional = true;
                    } else if let Some(ident) = path.get_ident() {
                        attr.kind = Some(FieldKind::from_ident(ident)?);
                    } else {
                        return Err(Error::new(
                            path.span(),
                            format!("expected a field kind ({EXPECTED}), optional, or skip"),
                        ));
                    }
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(string_literal(&nv.value, "rename")?.0);
                }
                Meta::NameValue(nv) if nv.path.is_ident("kind") => {
                    let (name, span) = string_literal(&nv.value, "kind")?;
                    attr.kind = Some(FieldKind::parse_name(&name, span)?);
                }
                Meta::NameValue(nv) => {
                    return Err(Error::new(
                        nv.path.span(),
                        "unknown attribute, expected rename or kind",
                    ));
                }
                Meta::List(list) => {
                    return Err(Error::new(list.span(), "unexpected nested attribute"));
                }
            }
        }

        Ok(attr)
    }
}

/// Extracts the `#[record(...)]` attribute from a field, if present.
pub fn parse_record_attrs(attrs: &[Attribute]) -> Result<RecordAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<RecordAttr>();
        }
    }
    Ok(RecordAttr::default())
}
