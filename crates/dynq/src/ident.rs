//! Validated SQL identifiers.
//!
//! [`TableName`] and [`ColumnName`] can only be obtained through the
//! validators in [`crate::validate`], so holding one proves the text is safe to
//! interpolate into SQL as a plain identifier:
//!
//! - table names match `[A-Za-z0-9_]+`
//! - column names match `[A-Za-z0-9_*]+` (`*` selects all columns)
//!
//! Identifiers are never quoted, so PostgreSQL folds them to lower case as it
//! would for hand-written SQL.
//!
//! # Example
//! ```ignore
//! use dynq::{ColumnName, TableName};
//!
//! let table = TableName::parse("test_user")?;
//! let all = ColumnName::parse("*")?;
//! # Ok::<(), dynq::DynqError>(())
//! ```

use crate::error::DynqResult;
use crate::validate;
use std::fmt;

/// Characters allowed in a table name.
pub(crate) fn is_table_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Characters allowed in a projected column name.
pub(crate) fn is_column_char(c: char) -> bool {
    c == '*' || is_table_char(c)
}

/// A table name that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Validate `name` and wrap it.
    pub fn parse(name: &str) -> DynqResult<Self> {
        validate::validate_table_name(name)
    }

    pub(crate) fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        out.push_str(&self.0);
    }
}

/// A projected column name that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnName(String);

impl ColumnName {
    /// Validate `name` and wrap it.
    pub fn parse(name: &str) -> DynqResult<Self> {
        validate::validate_column_name(name)
    }

    pub(crate) fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the `*` wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.0 == "*"
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        out.push_str(&self.0);
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ColumnName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
