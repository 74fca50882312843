//! Row mapping traits and utilities

use crate::error::{Error, Result};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Typed access to the columns of one result row.
///
/// Implemented for [`tokio_postgres::Row`]. A [`Db`](crate::Db) backed by
/// something else supplies its own row type implementing this trait.
pub trait RowExt {
    /// Number of columns in the row.
    fn column_count(&self) -> usize;

    /// Name of the column at `index`, if it exists.
    fn column_name(&self, index: usize) -> Option<&str>;

    /// Try to get a column value by name, returning [`Error::Decode`] on failure.
    fn try_get_column<T>(&self, column: &str) -> Result<T>
    where
        T: for<'a> FromSql<'a>;

    /// Try to get a column value by position, returning [`Error::Decode`] on failure.
    fn try_get_index<T>(&self, index: usize) -> Result<T>
    where
        T: for<'a> FromSql<'a>;
}

impl RowExt for Row {
    fn column_count(&self) -> usize {
        self.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.columns().get(index).map(|c| c.name())
    }

    fn try_get_column<T>(&self, column: &str) -> Result<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| Error::decode(column, e.to_string()))
    }

    fn try_get_index<T>(&self, index: usize) -> Result<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(index)
            .map_err(|e| Error::decode(column_label(self, index), e.to_string()))
    }
}

/// Trait for converting a database row into a Rust value.
///
/// Usually derived with `#[derive(FromRow)]`:
///
/// ```ignore
/// use pgmini::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     name: String,
///     #[pgmini(column = "user_age")]
///     age: i32,
/// }
/// ```
///
/// Scalars (`i64`, `String`, ...) decode a single-column row and tuples decode
/// by position, so `get::<i64>(&db, "SELECT count(*) FROM users", &[])` works
/// without a wrapper struct.
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row<R: RowExt>(row: &R) -> Result<Self>;
}

/// Fail unless every column of `row` is listed in `fields`.
///
/// Called by derived [`FromRow`] impls so that a query selecting a column the
/// target type has no field for is rejected instead of silently dropped.
pub fn ensure_columns_mapped<R: RowExt>(row: &R, fields: &[&str]) -> Result<()> {
    for index in 0..row.column_count() {
        let name = row.column_name(index).unwrap_or_default();
        if !fields.contains(&name) {
            return Err(Error::decode(
                column_label(row, index),
                "no destination field for column",
            ));
        }
    }
    Ok(())
}

/// Fail unless `row` has exactly `expected` columns (positional decoding).
pub fn ensure_column_count<R: RowExt>(row: &R, expected: usize) -> Result<()> {
    let got = row.column_count();
    if got != expected {
        return Err(Error::decode(
            "*",
            format!("expected {expected} column(s), got {got}"),
        ));
    }
    Ok(())
}

fn column_label<R: RowExt + ?Sized>(row: &R, index: usize) -> String {
    match row.column_name(index) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("#{index}"),
    }
}

macro_rules! impl_from_row_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromRow for $ty {
                fn from_row<R: RowExt>(row: &R) -> Result<Self> {
                    ensure_column_count(row, 1)?;
                    row.try_get_index(0)
                }
            }
        )*
    };
}

impl_from_row_scalar!(bool, i16, i32, i64, f32, f64, String, Vec<u8>);

macro_rules! impl_from_row_tuple {
    ($len:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name),+> FromRow for ($($name,)+)
        where
            $($name: for<'a> FromSql<'a>),+
        {
            fn from_row<R: RowExt>(row: &R) -> Result<Self> {
                ensure_column_count(row, $len)?;
                Ok(($(row.try_get_index::<$name>($idx)?,)+))
            }
        }
    };
}

impl_from_row_tuple!(1; A: 0);
impl_from_row_tuple!(2; A: 0, B: 1);
impl_from_row_tuple!(3; A: 0, B: 1, C: 2);
impl_from_row_tuple!(4; A: 0, B: 1, C: 2, D: 3);
impl_from_row_tuple!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_from_row_tuple!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
