//! Parameter-safe SQL assembly.
//!
//! [`Sql`] keeps SQL text and bound [`Value`]s side by side and numbers the
//! `$1, $2, ...` placeholders when the statement is rendered, so the n-th
//! placeholder always refers to the n-th pushed value.
//!
//! # Example
//!
//! ```ignore
//! use dynq::{Sql, TableName};
//!
//! let table = TableName::parse("test_user")?;
//! let mut q = Sql::new("SELECT * FROM ");
//! q.push_table(&table).push(" WHERE id = ").push_bind(1);
//!
//! assert_eq!(q.to_sql(), "SELECT * FROM test_user WHERE id = $1");
//! # Ok::<(), dynq::DynqError>(())
//! ```

use crate::client::GenericClient;
use crate::error::DynqResult;
use crate::ident::{ColumnName, TableName};
use crate::row::Row;
use crate::value::Value;


#[derive(Debug, Clone, PartialEq)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A SQL statement under construction plus its bound parameters.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Value>,
    tag: Option<String>,
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
            tag: None,
        }
    }

    /// Associate a tag for logging and executor-side observability.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }
        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append a comma-separated list of placeholders and bind all values.
    ///
    /// An empty list appends nothing; callers decide what an empty `IN` means.
    pub fn push_bind_list<T>(&mut self, values: impl IntoIterator<Item = T>) -> &mut Self
    where
        T: Into<Value>,
    {
        for (i, v) in values.into_iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push_bind(v);
        }
        self
    }

    /// Append a validated table name.
    ///
    /// Identifiers cannot be bound parameters, so they are written into the
    /// text. [`TableName`] guarantees the characters are safe.
    pub fn push_table(&mut self, table: &TableName) -> &mut Self {
        self.with_raw_tail(|out| table.write_sql(out))
    }

    /// Append validated column names joined by `, `.
    pub fn push_columns(&mut self, columns: &[ColumnName]) -> &mut Self {
        self.with_raw_tail(|out| {
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                column.write_sql(out);
            }
        })
    }

    fn with_raw_tail(&mut self, write: impl FnOnce(&mut String)) -> &mut Self {
        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => write(last),
            _ => {
                let mut s = String::new();
                write(&mut s);
                self.parts.push(SqlPart::Raw(s));
            }
        }
        self
    }

    /// Append `LIMIT $n OFFSET $m` with both values bound.
    pub fn limit_offset(&mut self, limit: i64, offset: i64) -> &mut Self {
        self.push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset)
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let cap: usize = self
            .parts
            .iter()
            .map(|p| match p {
                SqlPart::Raw(s) => s.len(),
                SqlPart::Param => 3,
            })
            .sum();

        let mut out = String::with_capacity(cap);
        let mut idx = 0usize;
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    out.push('$');
                    out.push_str(&idx.to_string());
                }
            }
        }
        out
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    #[cfg(test)]
    pub(crate) fn placeholder_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count()
    }

    /// Execute the statement and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> DynqResult<Vec<Row>> {
        let sql = self.to_sql();
        match self.tag.as_deref() {
            Some(tag) => conn.query_rows_tagged(tag, &sql, &self.params).await,
            None => conn.query_rows(&sql, &self.params).await,
        }
    }

    /// Execute a single-value `COUNT` statement.
    pub async fn fetch_count(&self, conn: &impl GenericClient) -> DynqResult<i64> {
        let sql = self.to_sql();
        match self.tag.as_deref() {
            Some(tag) => conn.query_count_tagged(tag, &sql, &self.params).await,
            None => conn.query_count(&sql, &self.params).await,
        }
    }
}
