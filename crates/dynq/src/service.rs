//! The dynamic query service.
//!
//! [`DynamicQuery`] composes the validator, the builder and an executor:
//!
//! ```ignore
//! use dynq::{ConditionGroup, DynamicQuery};
//!
//! let pool = dynq::create_pool(&std::env::var("DATABASE_URL")?)?;
//! let dq = DynamicQuery::new(pool);
//!
//! let rows = dq.query_table("test_user", &["id", "name"]).await?;
//! let rows = dq
//!     .query_with_conditions(
//!         "test_user",
//!         &["id", "name"],
//!         &[ConditionGroup::new().any_of("age", [25, 30])],
//!     )
//!     .await?;
//! let page = dq.query_with_pagination("test_user", &["*"], 0, 10).await?;
//! let total = dq.get_total_count("test_user").await?;
//! ```

use crate::builder;
use crate::client::GenericClient;
use crate::condition::ConditionGroup;
use crate::error::{DynqError, DynqResult};
use crate::monitor::SqlLogger;
use crate::row::Row;
use crate::sql::Sql;
use crate::validate::{
    validate_common_parameters, validate_conditions, validate_pagination, validate_table_name,
};
use std::time::Instant;

#[cfg(test)]
mod tests;

const QUERY_TABLE: &str = "dynq.query_table";
const QUERY_WITH_CONDITIONS: &str = "dynq.query_with_conditions";
const QUERY_WITH_PAGINATION: &str = "dynq.query_with_pagination";
const GET_TOTAL_COUNT: &str = "dynq.get_total_count";

/// Table-agnostic read queries over any [`GenericClient`].
///
/// Holds no mutable state. Inputs are validated in full before a statement is
/// built; a rejected call never reaches the executor. Executor errors are
/// returned unchanged.
#[derive(Debug, Clone)]
pub struct DynamicQuery<C> {
    client: C,
    logger: SqlLogger,
}

impl<C: GenericClient> DynamicQuery<C> {
    /// Wrap an executor with the default [`SqlLogger`].
    pub fn new(client: C) -> Self {
        Self {
            client,
            logger: SqlLogger::default(),
        }
    }

    /// Replace the SQL logger.
    pub fn with_logger(mut self, logger: SqlLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    /// `SELECT <columns> FROM <table>`.
    pub async fn query_table<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[S],
    ) -> DynqResult<Vec<Row>> {
        let (table, columns) =
            validate_common_parameters(table, columns).map_err(|e| self.reject(QUERY_TABLE, e))?;
        self.fetch_rows(builder::select(&table, &columns).tagged(QUERY_TABLE))
            .await
    }

    /// `SELECT <columns> FROM <table> WHERE (g1) OR (g2) ...`.
    ///
    /// A row matches when every entry of at least one group holds. List values
    /// are membership tests.
    pub async fn query_with_conditions<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[S],
        conditions: &[ConditionGroup],
    ) -> DynqResult<Vec<Row>> {
        let (table, columns) = validate_common_parameters(table, columns)
            .and_then(|target| validate_conditions(conditions).map(|()| target))
            .map_err(|e| self.reject(QUERY_WITH_CONDITIONS, e))?;
        self.fetch_rows(
            builder::select_where(&table, &columns, conditions).tagged(QUERY_WITH_CONDITIONS),
        )
        .await
    }

    /// `SELECT <columns> FROM <table> LIMIT <limit> OFFSET <offset>`.
    ///
    /// Row order is whatever the database returns; no `ORDER BY` is added.
    pub async fn query_with_pagination<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[S],
        offset: i64,
        limit: i64,
    ) -> DynqResult<Vec<Row>> {
        let ((table, columns), page) = validate_common_parameters(table, columns)
            .and_then(|target| validate_pagination(offset, limit).map(|page| (target, page)))
            .map_err(|e| self.reject(QUERY_WITH_PAGINATION, e))?;
        self.fetch_rows(
            builder::select_page(&table, &columns, page).tagged(QUERY_WITH_PAGINATION),
        )
        .await
    }

    /// `SELECT COUNT(*) FROM <table>`.
    pub async fn get_total_count(&self, table: &str) -> DynqResult<i64> {
        let table = validate_table_name(table).map_err(|e| self.reject(GET_TOTAL_COUNT, e))?;
        let sql = builder::count(&table).tagged(GET_TOTAL_COUNT);

        self.logger.before_query(&sql);
        let start = Instant::now();
        match sql.fetch_count(&self.client).await {
            Ok(n) => {
                self.logger.after_query(&sql, Some(1), start.elapsed());
                Ok(n)
            }
            Err(e) => {
                self.logger.query_failed(&sql, &e);
                Err(e)
            }
        }
    }

    async fn fetch_rows(&self, sql: Sql) -> DynqResult<Vec<Row>> {
        self.logger.before_query(&sql);
        let start = Instant::now();
        match sql.fetch_all(&self.client).await {
            Ok(rows) => {
                self.logger
                    .after_query(&sql, Some(rows.len()), start.elapsed());
                Ok(rows)
            }
            Err(e) => {
                self.logger.query_failed(&sql, &e);
                Err(e)
            }
        }
    }

    fn reject(&self, operation: &str, err: DynqError) -> DynqError {
        self.logger.rejected(operation, &err);
        err
    }
}
