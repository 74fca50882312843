//! The `Db` capability trait and its implementations for tokio-postgres and
//! deadpool-postgres handles.

use crate::error::{Error, Result};
use crate::row::{FromRow, RowExt};
use futures_core::Stream;
use futures_util::StreamExt;
use std::future::Future;
use std::pin::{Pin, pin};
use std::task::{Context, Poll};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Outcome of [`Db::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    /// Number of rows inserted, updated or deleted.
    pub rows_affected: u64,
    /// Identifier assigned by the driver to the last inserted row.
    ///
    /// Postgres does not report one (use `RETURNING` instead), so this is
    /// always `None` for tokio-postgres handles.
    pub last_insert_id: Option<i64>,
}

impl ExecResult {
    pub fn new(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            last_insert_id: None,
        }
    }

    pub fn with_last_insert_id(mut self, id: i64) -> Self {
        self.last_insert_id = Some(id);
        self
    }
}

/// Anything that can run parameterized SQL: a client connection, a pooled
/// connection or a transaction.
///
/// Accepting `&impl Db` lets the same function run inside or outside a
/// transaction. The fetch helpers [`get`](crate::get) and
/// [`get_many`](crate::get_many) need nothing beyond this trait.
pub trait Db: Send + Sync {
    /// Row type produced by this handle's cursors.
    type Row: RowExt + Send;

    /// Forward-only cursor over a result set. Dropping it releases it.
    type Cursor: Stream<Item = Result<Self::Row>> + Send;

    /// Execute a statement and report how many rows it touched.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<ExecResult>> + Send;

    /// Run a query and return a cursor over its rows.
    fn query_rows(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Self::Cursor>> + Send;

    /// Run a query and decode its **first** row into `T`.
    ///
    /// Semantics:
    /// - 0 rows: returns [`Error::NoRows`]
    /// - 1 row: returns that row decoded
    /// - multiple rows: returns the first row (does **not** error)
    ///
    /// The cursor is dropped before this returns.
    fn get_one<T>(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<T>> + Send
    where
        T: FromRow + Send,
    {
        async move {
            let cursor = self.query_rows(sql, params).await?;
            let mut cursor = pin!(cursor);
            match cursor.next().await {
                Some(row) => T::from_row(&row?),
                None => Err(Error::NoRows),
            }
        }
    }
}

/// Cursor over the rows of a Postgres query.
///
/// Wraps [`tokio_postgres::RowStream`] and converts driver errors into
/// [`Error::Query`].
#[must_use]
pub struct Rows {
    inner: Pin<Box<tokio_postgres::RowStream>>,
}

impl Rows {
    pub fn new(stream: tokio_postgres::RowStream) -> Self {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Rows affected by the statement, available once the stream is exhausted.
    pub fn rows_affected(&self) -> Option<u64> {
        self.inner.rows_affected()
    }
}

impl Stream for Rows {
    type Item = Result<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => Poll::Ready(Some(Ok(row))),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(Error::Query(e)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Db for tokio_postgres::Client {
    type Row = Row;
    type Cursor = Rows;

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<ExecResult> {
        let n = tokio_postgres::Client::execute(self, sql, params).await?;
        Ok(ExecResult::new(n))
    }

    async fn query_rows(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Rows> {
        let stream = tokio_postgres::Client::query_raw(self, sql, params.iter().copied()).await?;
        Ok(Rows::new(stream))
    }
}

impl Db for tokio_postgres::Transaction<'_> {
    type Row = Row;
    type Cursor = Rows;

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<ExecResult> {
        let n = tokio_postgres::Transaction::execute(self, sql, params).await?;
        Ok(ExecResult::new(n))
    }

    async fn query_rows(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Rows> {
        let stream =
            tokio_postgres::Transaction::query_raw(self, sql, params.iter().copied()).await?;
        Ok(Rows::new(stream))
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl Db for deadpool_postgres::Client {
    type Row = Row;
    type Cursor = Rows;

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<ExecResult> {
        // Delegate to the deref target (ClientWrapper / tokio_postgres::Client).
        Db::execute(&**self, sql, params).await
    }

    async fn query_rows(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Rows> {
        Db::query_rows(&**self, sql, params).await
    }
}

#[cfg(feature = "pool")]
impl Db for deadpool_postgres::ClientWrapper {
    type Row = Row;
    type Cursor = Rows;

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<ExecResult> {
        Db::execute(&**self, sql, params).await
    }

    async fn query_rows(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Rows> {
        Db::query_rows(&**self, sql, params).await
    }
}

#[cfg(feature = "pool")]
impl Db for deadpool_postgres::Transaction<'_> {
    type Row = Row;
    type Cursor = Rows;

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<ExecResult> {
        Db::execute(&**self, sql, params).await
    }

    async fn query_rows(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Rows> {
        Db::query_rows(&**self, sql, params).await
    }
}

// Lets callers hand `&&client` (e.g. from generic wrappers) to the helpers.
impl<D: Db> Db for &D {
    type Row = D::Row;
    type Cursor = D::Cursor;

    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<ExecResult>> + Send {
        (*self).execute(sql, params)
    }

    fn query_rows(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Self::Cursor>> + Send {
        (*self).query_rows(sql, params)
    }

    fn get_one<T>(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<T>> + Send
    where
        T: FromRow + Send,
    {
        (*self).get_one(sql, params)
    }
}
