//! Loosely-typed result rows.

use crate::error::{DynqError, DynqResult};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tokio_postgres::types::{FromSql, Type};
use uuid::Uuid;

/// Trait for decoding a driver row into a Rust value.
pub trait FromRow: Sized {
    fn from_row(row: &tokio_postgres::Row) -> DynqResult<Self>;
}

/// A row as `column name -> value` pairs, in the order the driver reported
/// the columns.
///
/// Keys keep the casing the database returned. Use [`Row::get_ignore_case`]
/// when the caller should not care whether the server folded names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Later lookups return the first match.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    /// Builder-style [`Row::push`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    /// Look up a column by exact name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Look up a column ignoring ASCII case.
    pub fn get_ignore_case(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, v)| v)
    }

    pub fn contains_key_ignore_case(&self, column: &str) -> bool {
        self.get_ignore_case(column).is_some()
    }

    /// Column names in result order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, v)| (name.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_inner(self) -> Vec<(String, Value)> {
        self.columns
    }
}

impl FromRow for Row {
    fn from_row(row: &tokio_postgres::Row) -> DynqResult<Self> {
        let mut columns = Vec::with_capacity(row.len());
        for (idx, column) in row.columns().iter().enumerate() {
            let value = decode_column(row, idx, column.name(), column.type_())?;
            columns.push((column.name().to_string(), value));
        }
        Ok(Self { columns })
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Serializes as a map in column order.
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn get_opt<'a, T>(row: &'a tokio_postgres::Row, idx: usize, column: &str) -> DynqResult<Option<T>>
where
    T: FromSql<'a>,
{
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| DynqError::decode(column, e.to_string()))
}

fn decode_column(
    row: &tokio_postgres::Row,
    idx: usize,
    column: &str,
    ty: &Type,
) -> DynqResult<Value> {
    let value = match *ty {
        Type::BOOL => get_opt::<bool>(row, idx, column)?.map(Value::Bool),
        Type::INT2 => get_opt::<i16>(row, idx, column)?.map(Value::from),
        Type::INT4 => get_opt::<i32>(row, idx, column)?.map(Value::from),
        Type::INT8 => get_opt::<i64>(row, idx, column)?.map(Value::Int),
        Type::OID => get_opt::<u32>(row, idx, column)?.map(Value::from),
        Type::FLOAT4 => get_opt::<f32>(row, idx, column)?.map(Value::from),
        Type::FLOAT8 => get_opt::<f64>(row, idx, column)?.map(Value::Float),
        Type::NUMERIC => get_opt::<Decimal>(row, idx, column)?.map(Value::Decimal),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get_opt::<String>(row, idx, column)?.map(Value::Text)
        }
        Type::BYTEA => get_opt::<Vec<u8>>(row, idx, column)?.map(Value::Bytes),
        Type::UUID => get_opt::<Uuid>(row, idx, column)?.map(Value::Uuid),
        Type::JSON | Type::JSONB => get_opt::<serde_json::Value>(row, idx, column)?.map(Value::Json),
        Type::DATE => get_opt::<NaiveDate>(row, idx, column)?.map(Value::Date),
        Type::TIME => get_opt::<NaiveTime>(row, idx, column)?.map(Value::Time),
        Type::TIMESTAMP => get_opt::<NaiveDateTime>(row, idx, column)?.map(Value::Timestamp),
        Type::TIMESTAMPTZ => get_opt::<DateTime<Utc>>(row, idx, column)?.map(Value::TimestampTz),
        _ => {
            return Err(DynqError::decode(
                column,
                format!("unsupported column type {}", ty.name()),
            ));
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Row {
        Row::new()
            .with("ID", 1_i32)
            .with("name", "alice")
            .with("age", 25_i32)
    }

    #[test]
    fn exact_lookup_is_case_sensitive() {
        let row = sample();
        assert_eq!(row.get("ID"), Some(&Value::Int(1)));
        assert_eq!(row.get("id"), None);
    }

    #[test]
    fn ignore_case_lookup() {
        let row = sample();
        assert_eq!(row.get_ignore_case("id"), Some(&Value::Int(1)));
        assert!(row.contains_key_ignore_case("NAME"));
        assert!(!row.contains_key_ignore_case("email"));
    }

    #[test]
    fn keeps_column_order() {
        let row = sample();
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["ID", "name", "age"]);
        assert_eq!(row.len(), 3);
        assert!(!row.is_empty());
    }

    #[test]
    fn serializes_as_object() {
        let row = sample();
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"ID":1,"name":"alice","age":25}"#
        );
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({"ID": 1, "name": "alice", "age": 25})
        );
    }

    #[test]
    fn collects_from_pairs() {
        let row: Row = vec![("a".to_string(), Value::Null)].into_iter().collect();
        assert_eq!(row.into_inner(), vec![("a".to_string(), Value::Null)]);
    }
}
