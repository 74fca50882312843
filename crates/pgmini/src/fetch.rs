//! Generic fetch helpers: run a query and decode rows straight into `T`.

use crate::client::Db;
use crate::error::Result;
use crate::row::FromRow;
use futures_util::StreamExt;
use std::pin::pin;
use tokio_postgres::types::ToSql;

/// Fetch one row and decode it into `T`.
///
/// Returns [`Error::NoRows`](crate::Error::NoRows) when nothing matches. When
/// several rows match, the first one in backend order is returned.
///
/// # Example
///
/// ```ignore
/// let user: User = pgmini::get(&client, "SELECT name, age FROM users WHERE name = $1", &[&"foo"]).await?;
/// ```
pub async fn get<T, D>(db: &D, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<T>
where
    D: Db,
    T: FromRow + Send,
{
    let result = db.get_one::<T>(sql, params).await;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "pgmini.sql",
        sql,
        ok = result.is_ok(),
        error = result.as_ref().err().map(tracing::field::display),
        "get"
    );

    result
}

/// Fetch every row and decode each into `T`, keeping backend order.
///
/// An empty result is `Ok(vec![])`, never [`Error::NoRows`](crate::Error::NoRows).
/// The first open, stream or decode error aborts the fetch; rows decoded so far
/// are discarded. The cursor is released before this returns either way.
pub async fn get_many<T, D>(db: &D, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<T>>
where
    D: Db,
    T: FromRow,
{
    let result = collect_rows::<T, D>(db, sql, params).await;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "pgmini.sql",
        sql,
        rows = result.as_ref().map_or(0, Vec::len),
        error = result.as_ref().err().map(tracing::field::display),
        "get_many"
    );

    result
}

async fn collect_rows<T, D>(db: &D, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<T>>
where
    D: Db,
    T: FromRow,
{
    let cursor = db.query_rows(sql, params).await?;
    let mut cursor = pin!(cursor);

    let mut out = Vec::new();
    while let Some(row) = cursor.next().await {
        out.push(T::from_row(&row?)?);
    }
    Ok(out)
}
