//! Derive macros for pgmini
//!
//! Provides `#[derive(FromRow)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_row;

/// Derive `FromRow` trait for a struct.
///
/// # Example
///
/// ```ignore
/// use pgmini::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     username: String,
///     #[pgmini(column = "email_address")]
///     email: Option<String>,
/// }
///
/// // Tuple structs decode by position.
/// #[derive(FromRow)]
/// struct NameAndAge(String, i32);
/// ```
///
/// A query returning a column that no field maps to fails with a decode
/// error, unless the struct opts out.
///
/// # Attributes
///
/// - `#[pgmini(column = "name")]` - Map field to a different column name
/// - `#[pgmini(ignore_extra_columns)]` - (struct) Skip result columns with no matching field
#[proc_macro_derive(FromRow, attributes(pgmini))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
