//! In-memory `Db` used by the integration tests.
//!
//! Queries are matched by exact SQL text against scripted results. Column
//! values are stored in Postgres binary format (encoded with `ToSql`) so that
//! decoding goes through the same `FromSql` impls as a real connection.

#![allow(dead_code)]

use bytes::BytesMut;
use futures_core::Stream;
use pgmini::{Db, Error, ExecResult, Result, RowExt};
use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type};

#[derive(Debug, Clone)]
struct MemColumn {
    name: String,
    ty: Type,
    raw: Option<BytesMut>,
}

#[derive(Debug, Clone, Default)]
pub struct MemRow {
    columns: Vec<MemColumn>,
}

impl MemRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn col<V: ToSql>(mut self, name: &str, ty: Type, value: V) -> Self {
        let mut buf = BytesMut::new();
        let raw = match value.to_sql_checked(&ty, &mut buf).expect("encode column") {
            IsNull::Yes => None,
            IsNull::No => Some(buf),
        };
        self.columns.push(MemColumn {
            name: name.to_string(),
            ty,
            raw,
        });
        self
    }
}

impl RowExt for MemRow {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|c| c.name.as_str())
    }

    fn try_get_column<T>(&self, column: &str) -> Result<T>
    where
        T: for<'a> FromSql<'a>,
    {
        let index = self
            .columns
            .iter()
            .position(|c| c.name == column)
            .ok_or_else(|| Error::decode(column, "column not found"))?;
        self.try_get_index(index)
    }

    fn try_get_index<T>(&self, index: usize) -> Result<T>
    where
        T: for<'a> FromSql<'a>,
    {
        let col = self
            .columns
            .get(index)
            .ok_or_else(|| Error::decode(format!("#{index}"), "column index out of range"))?;
        if !T::accepts(&col.ty) {
            return Err(Error::decode(
                &col.name,
                format!(
                    "cannot convert {} to {}",
                    col.ty,
                    std::any::type_name::<T>()
                ),
            ));
        }
        T::from_sql_nullable(&col.ty, col.raw.as_deref())
            .map_err(|e| Error::decode(&col.name, e.to_string()))
    }
}

/// Cursor that decrements the owning `MemDb`'s open count when dropped.
pub struct MemCursor {
    items: VecDeque<Result<MemRow>>,
    open: Arc<AtomicUsize>,
}

impl Stream for MemCursor {
    type Item = Result<MemRow>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.items.pop_front())
    }
}

impl Drop for MemCursor {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
enum Scripted {
    Rows(Vec<MemRow>),
    FailOpen(String),
    FailAfter(Vec<MemRow>, String),
}

#[derive(Default)]
pub struct MemDb {
    queries: Mutex<HashMap<String, Scripted>>,
    statements: Mutex<HashMap<String, ExecResult>>,
    calls: Mutex<Vec<(String, usize)>>,
    open: Arc<AtomicUsize>,
    opened: AtomicUsize,
}

impl MemDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_query(self, sql: &str, rows: Vec<MemRow>) -> Self {
        self.script(sql, Scripted::Rows(rows))
    }

    /// The query itself is rejected.
    pub fn on_query_fail(self, sql: &str, message: &str) -> Self {
        self.script(sql, Scripted::FailOpen(message.to_string()))
    }

    /// The cursor yields `rows`, then reports an error.
    pub fn on_query_fail_after(self, sql: &str, rows: Vec<MemRow>, message: &str) -> Self {
        self.script(sql, Scripted::FailAfter(rows, message.to_string()))
    }

    pub fn on_execute(self, sql: &str, result: ExecResult) -> Self {
        self.statements
            .lock()
            .unwrap()
            .insert(sql.to_string(), result);
        self
    }

    /// Cursors currently alive.
    pub fn open_cursors(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Cursors handed out since creation.
    pub fn cursors_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// `(sql, parameter count)` for every call, in order.
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }

    fn script(self, sql: &str, scripted: Scripted) -> Self {
        self.queries
            .lock()
            .unwrap()
            .insert(sql.to_string(), scripted);
        self
    }

    fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.len()));
    }

    fn cursor(&self, items: VecDeque<Result<MemRow>>) -> MemCursor {
        self.open.fetch_add(1, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
        MemCursor {
            items,
            open: Arc::clone(&self.open),
        }
    }
}

impl Db for MemDb {
    type Row = MemRow;
    type Cursor = MemCursor;

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<ExecResult> {
        self.record(sql, params);
        let result = self.statements.lock().unwrap().get(sql).copied();
        result.ok_or_else(|| Error::Other(format!("syntax error in statement: {sql}")))
    }

    async fn query_rows(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<MemCursor> {
        self.record(sql, params);
        let scripted = self.queries.lock().unwrap().get(sql).cloned();
        match scripted {
            None => Err(Error::Other(format!("no such table in query: {sql}"))),
            Some(Scripted::FailOpen(message)) => Err(Error::Other(message)),
            Some(Scripted::Rows(rows)) => Ok(self.cursor(rows.into_iter().map(Ok).collect())),
            Some(Scripted::FailAfter(rows, message)) => {
                let mut items: VecDeque<_> = rows.into_iter().map(Ok).collect();
                items.push_back(Err(Error::Other(message)));
                Ok(self.cursor(items))
            }
        }
    }
}

pub fn user_row(name: &str, age: i32) -> MemRow {
    MemRow::new()
        .col("name", Type::TEXT, name)
        .col("age", Type::INT4, age)
}
