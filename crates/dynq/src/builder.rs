//! The four statement shapes.
//!
//! Every function takes already-validated inputs and does not re-check them.
//! Identifiers are written into the text; all condition values and pagination
//! numbers are bound parameters.
//!
//! | function         | SQL                                              |
//! |------------------|--------------------------------------------------|
//! | [`select`]       | `SELECT c1, c2 FROM t`                           |
//! | [`select_where`] | `SELECT c1, c2 FROM t WHERE (a = $1) OR (...)`   |
//! | [`select_page`]  | `SELECT c1, c2 FROM t LIMIT $1 OFFSET $2`        |
//! | [`count`]        | `SELECT COUNT(*) FROM t`                         |

use crate::condition::{ConditionGroup, ConditionValue};
use crate::ident::{ColumnName, TableName};
use crate::sql::Sql;
use crate::validate::Pagination;


/// `SELECT <columns> FROM <table>`, columns in caller order.
pub fn select(table: &TableName, columns: &[ColumnName]) -> Sql {
    let mut sql = Sql::new("SELECT ");
    sql.push_columns(columns).push(" FROM ").push_table(table);
    sql
}

/// `SELECT ... WHERE (group1) OR (group2) ...`.
///
/// Entries in a group are joined with `AND` in insertion order. Parameters
/// are numbered in the same order the values are visited, groups first, then
/// entries, then list members.
pub fn select_where(table: &TableName, columns: &[ColumnName], groups: &[ConditionGroup]) -> Sql {
    let mut sql = select(table, columns);
    sql.push(" WHERE ");
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            sql.push(" OR ");
        }
        sql.push("(");
        push_group(&mut sql, group);
        sql.push(")");
    }
    sql
}

fn push_group(sql: &mut Sql, group: &ConditionGroup) {
    for (i, (column, value)) in group.iter().enumerate() {
        if i > 0 {
            sql.push(" AND ");
        }
        match value {
            ConditionValue::Scalar(v) => {
                sql.push(column).push(" = ").push_bind(v.clone());
            }
            // `IN ()` is a syntax error; an empty set matches nothing.
            ConditionValue::Members(values) if values.is_empty() => {
                sql.push("1=0");
            }
            ConditionValue::Members(values) => {
                sql.push(column)
                    .push(" IN (")
                    .push_bind_list(values.iter().cloned())
                    .push(")");
            }
        }
    }
}

/// `SELECT ... LIMIT $1 OFFSET $2`. No `ORDER BY` is added.
pub fn select_page(table: &TableName, columns: &[ColumnName], page: Pagination) -> Sql {
    let mut sql = select(table, columns);
    sql.limit_offset(page.limit(), page.offset());
    sql
}

/// `SELECT COUNT(*) FROM <table>`.
pub fn count(table: &TableName) -> Sql {
    let mut sql = Sql::new("SELECT COUNT(*) FROM ");
    sql.push_table(table);
    sql
}
