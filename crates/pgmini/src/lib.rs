//! # pgmini
//!
//! Fetch Postgres rows straight into your own types.
//!
//! pgmini is a thin layer over `tokio-postgres`: connection handling,
//! transactions and the wire protocol all stay with the driver. What it adds:
//!
//! - **[`Db`]**: one trait covering clients, pooled connections and transactions
//! - **[`get`]**: run a query and decode the first row into `T`
//! - **[`get_many`]**: run a query and decode every row into `Vec<T>`
//! - **[`FromRow`]**: row → struct mapping, usually via `#[derive(FromRow)]`
//!
//! ```ignore
//! use pgmini::FromRow;
//!
//! #[derive(Debug, FromRow)]
//! struct User {
//!     name: String,
//!     age: i32,
//! }
//!
//! let client = pgmini::connect(&database_url).await?;
//!
//! let foo: User = pgmini::get(&client, "SELECT name, age FROM users WHERE name = $1", &[&"foo"]).await?;
//!
//! let adults: Vec<User> = pgmini::get_many(
//!     &client,
//!     "SELECT name, age FROM users WHERE age >= $1 ORDER BY name",
//!     &[&18_i32],
//! )
//! .await?;
//! ```

pub mod client;
pub mod connect;
pub mod error;
pub mod fetch;
pub mod row;

pub use client::{Db, ExecResult, Rows};
pub use connect::{connect, connect_with_tls};
pub use error::{Error, Result};
pub use fetch::{get, get_many};
pub use row::{FromRow, RowExt};

/// A single Postgres connection.
pub type Client = tokio_postgres::Client;
/// A result row.
pub type Row = tokio_postgres::Row;
/// A prepared statement.
pub type Stmt = tokio_postgres::Statement;
/// A transaction on a [`Client`].
pub type Tx<'a> = tokio_postgres::Transaction<'a>;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{PoolConfig, create_pool, create_pool_with_config, create_pool_with_tls};

/// A connection pool.
#[cfg(feature = "pool")]
pub type Pool = deadpool_postgres::Pool;
/// A connection checked out of a [`Pool`].
#[cfg(feature = "pool")]
pub type Conn = deadpool_postgres::Client;
/// A transaction on a pooled [`Conn`].
#[cfg(feature = "pool")]
pub type PoolTx<'a> = deadpool_postgres::Transaction<'a>;

#[cfg(feature = "derive")]
pub use pgmini_derive::FromRow;
