//! Input validation.
//!
//! Every check here is a pure function of its arguments. The service runs the
//! relevant checks to completion before any SQL is built, so a rejected call
//! never reaches the database.

use crate::condition::ConditionGroup;
use crate::error::{DynqError, DynqResult};
use crate::ident::{self, ColumnName, TableName};

/// A validated `(offset, limit)` pair: `offset >= 0`, `limit > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    offset: i64,
    limit: i64,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Only letters, digits and `_`.
pub fn validate_table_name(name: &str) -> DynqResult<TableName> {
    if is_blank(name) {
        return Err(DynqError::invalid_argument("Table name cannot be empty"));
    }
    if !name.chars().all(ident::is_table_char) {
        return Err(DynqError::invalid_argument(
            "Invalid table name. Only letters, numbers and underscores are allowed.",
        ));
    }
    Ok(TableName::new_unchecked(name))
}

/// Only letters, digits, `_` and `*`.
pub fn validate_column_name(name: &str) -> DynqResult<ColumnName> {
    if is_blank(name) {
        return Err(DynqError::invalid_argument("Column name cannot be empty"));
    }
    if !name.chars().all(ident::is_column_char) {
        return Err(DynqError::invalid_argument(
            "Invalid column name. Only letters, numbers, underscores and asterisk are allowed.",
        ));
    }
    Ok(ColumnName::new_unchecked(name))
}

/// Checks shared by every projecting query, in this order: blank table name,
/// empty column list, table name characters, then each column in turn.
pub fn validate_common_parameters<S: AsRef<str>>(
    table: &str,
    columns: &[S],
) -> DynqResult<(TableName, Vec<ColumnName>)> {
    if is_blank(table) {
        return Err(DynqError::invalid_argument("Table name cannot be empty"));
    }
    if columns.is_empty() {
        return Err(DynqError::invalid_argument("Columns list cannot be empty"));
    }
    let table = validate_table_name(table)?;
    let columns = columns
        .iter()
        .map(|c| validate_column_name(c.as_ref()))
        .collect::<DynqResult<Vec<_>>>()?;
    Ok((table, columns))
}

/// At least one group, and no empty group.
///
/// Condition keys are not run through [`validate_column_name`].
pub fn validate_conditions(groups: &[ConditionGroup]) -> DynqResult<()> {
    if groups.is_empty() {
        return Err(DynqError::invalid_argument("Conditions cannot be empty"));
    }
    if groups.iter().any(ConditionGroup::is_empty) {
        return Err(DynqError::invalid_argument(
            "Each condition map cannot be empty",
        ));
    }
    Ok(())
}

pub fn validate_pagination(offset: i64, limit: i64) -> DynqResult<Pagination> {
    if offset < 0 {
        return Err(DynqError::invalid_argument(
            "Offset must be greater than or equal to 0",
        ));
    }
    if limit <= 0 {
        return Err(DynqError::invalid_argument("Limit must be greater than 0"));
    }
    Ok(Pagination { offset, limit })
}
