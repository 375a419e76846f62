//! Implementation of `#[derive(Record)]`.
//!
//! Generates a compile-time field table: one name constant per exposed
//! field, a `FIELDS` list, and a `Record::field` that matches on the name.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_record_attrs, FieldKind};

pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut names: Vec<String> = Vec::new();
    let mut constants: Vec<TokenStream> = Vec::new();
    let mut arms: Vec<TokenStream> = Vec::new();

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;
        let attrs = parse_record_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(kind) = attrs.kind else {
            continue;
        };

        let query_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        if names.contains(&query_name) {
            return Err(Error::new(
                field.span(),
                format!("duplicate record field name '{query_name}'"),
            ));
        }

        let const_name = format_ident!("{}", to_screaming_snake_case(&query_name));
        constants.push(quote! {
            /// Field name constant for predicates.
            pub const #const_name: &'static str = #query_name;
        });

        let value = value_expr(kind);
        let arm = if attrs.optional {
            quote! {
                #query_name => ::core::option::Option::Some(match &self.#field_name {
                    ::core::option::Option::Some(v) => #value,
                    ::core::option::Option::None => ::sift::Value::Null,
                }),
            }
        } else {
            quote! {
                #query_name => {
                    let v = &self.#field_name;
                    ::core::option::Option::Some(#value)
                }
            }
        };
        arms.push(arm);
        names.push(query_name);
    }

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#constants)*

            /// Every field name exposed to predicates, in declaration order.
            pub const FIELDS: &'static [&'static str] = &[#(#names),*];
        }

        impl #impl_generics ::sift::Record for #struct_name #ty_generics #where_clause {
            fn field(&self, name: &str) -> ::core::option::Option<::sift::Value<'_>> {
                match name {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

/// Expression converting `v: &FieldType` into a `Value`.
fn value_expr(kind: FieldKind) -> TokenStream {
    match kind {
        FieldKind::String => quote! {
            ::sift::Value::String(::core::convert::AsRef::<str>::as_ref(v))
        },
        FieldKind::Number => quote! {
            ::sift::Value::Number(::sift::Number::from(*v))
        },
        FieldKind::Timestamp => quote! {
            ::sift::Value::Timestamp(::sift::AsTimestamp::as_timestamp(v))
        },
        FieldKind::Bool => quote! {
            ::sift::Value::Bool(*v)
        },
        FieldKind::Custom => quote! {
            ::sift::Value::Custom(v)
        },
    }
}

/// Converts a field name to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_alphanumeric();
        }
    }

    result
}
