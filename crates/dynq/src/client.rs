//! The database access seam.
//!
//! [`GenericClient`] is the single capability dynq needs from the outside
//! world: run a parameterized, read-only statement and hand back rows as
//! ordered `column -> value` mappings. Adapters are provided for
//! `tokio-postgres` clients and transactions and, with the `pool` feature,
//! for `deadpool-postgres`.

use crate::error::{DynqError, DynqResult};
use crate::row::{FromRow, Row};
use crate::value::Value;
use std::future::Future;
use tokio_postgres::types::ToSql;

/// A trait that unifies database clients, transactions and pools.
///
/// Errors from the underlying driver must be returned as-is; dynq passes them
/// through to its caller without retrying.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query_rows(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DynqResult<Vec<Row>>> + Send;

    /// Execute a query returning a single integer (e.g. `COUNT(*)`).
    fn query_count(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DynqResult<i64>> + Send;

    /// Execute a query and return all rows, associating a tag for observability.
    ///
    /// The default implementation ignores `tag` and calls [`GenericClient::query_rows`].
    fn query_rows_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DynqResult<Vec<Row>>> + Send {
        let _ = tag;
        self.query_rows(sql, params)
    }

    /// Execute a count query, associating a tag for observability.
    ///
    /// The default implementation ignores `tag` and calls [`GenericClient::query_count`].
    fn query_count_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DynqResult<i64>> + Send {
        let _ = tag;
        self.query_count(sql, params)
    }
}

impl<C: GenericClient> GenericClient for &C {
    fn query_rows(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DynqResult<Vec<Row>>> + Send {
        (**self).query_rows(sql, params)
    }

    fn query_count(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DynqResult<i64>> + Send {
        (**self).query_count(sql, params)
    }

    fn query_rows_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DynqResult<Vec<Row>>> + Send {
        (**self).query_rows_tagged(tag, sql, params)
    }

    fn query_count_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DynqResult<i64>> + Send {
        (**self).query_count_tagged(tag, sql, params)
    }
}

fn to_params(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

fn decode_rows(rows: Vec<tokio_postgres::Row>) -> DynqResult<Vec<Row>> {
    rows.iter().map(Row::from_row).collect()
}

/// Read the first column of a single-row result as an integer.
fn decode_count(row: &tokio_postgres::Row) -> DynqResult<i64> {
    let column = row
        .columns()
        .first()
        .map(|c| c.name().to_string())
        .unwrap_or_default();
    match Row::from_row(row)?.into_inner().into_iter().next() {
        Some((_, Value::Int(n))) => Ok(n),
        Some((_, other)) => Err(DynqError::decode(
            column,
            format!("expected an integer count, got {}", other.kind()),
        )),
        None => Err(DynqError::decode(column, "count query returned no columns")),
    }
}

/// Implements [`GenericClient`] for a type exposing tokio-postgres style
/// `query` / `query_one` methods.
macro_rules! impl_generic_client {
    ($ty:ty) => {
        impl GenericClient for $ty {
            async fn query_rows(&self, sql: &str, params: &[Value]) -> DynqResult<Vec<Row>> {
                let rows = <$ty>::query(self, sql, &to_params(params)).await?;
                decode_rows(rows)
            }

            async fn query_count(&self, sql: &str, params: &[Value]) -> DynqResult<i64> {
                let row = <$ty>::query_one(self, sql, &to_params(params)).await?;
                decode_count(&row)
            }
        }
    };
}

impl_generic_client!(tokio_postgres::Client);
impl_generic_client!(tokio_postgres::Transaction<'_>);

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query_rows(&self, sql: &str, params: &[Value]) -> DynqResult<Vec<Row>> {
        // Delegate to the deref target (ClientWrapper).
        GenericClient::query_rows(&**self, sql, params).await
    }

    async fn query_count(&self, sql: &str, params: &[Value]) -> DynqResult<i64> {
        GenericClient::query_count(&**self, sql, params).await
    }
}

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::ClientWrapper {
    async fn query_rows(&self, sql: &str, params: &[Value]) -> DynqResult<Vec<Row>> {
        GenericClient::query_rows(&**self, sql, params).await
    }

    async fn query_count(&self, sql: &str, params: &[Value]) -> DynqResult<i64> {
        GenericClient::query_count(&**self, sql, params).await
    }
}

/// Checks out one pooled connection per call.
#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Pool {
    async fn query_rows(&self, sql: &str, params: &[Value]) -> DynqResult<Vec<Row>> {
        let client = self.get().await?;
        client.query_rows(sql, params).await
    }

    async fn query_count(&self, sql: &str, params: &[Value]) -> DynqResult<i64> {
        let client = self.get().await?;
        client.query_count(sql, params).await
    }
}
