//! Filter conditions for dynamic queries.
//!
//! A filter is a list of [`ConditionGroup`]s combined with `OR`. Inside a
//! group every `column -> value` entry must hold (`AND`). A
//! [`ConditionValue::Scalar`] is an equality test, a
//! [`ConditionValue::Members`] list is a membership (`IN`) test.
//!
//! # Example
//! ```ignore
//! use dynq::ConditionGroup;
//!
//! // (id = 1 AND age = 25) OR (id IN (3, 4))
//! let groups = vec![
//!     ConditionGroup::new().eq("id", 1).eq("age", 25),
//!     ConditionGroup::new().any_of("id", [3, 4]),
//! ];
//! ```
//!
//! Groups also deserialize from JSON objects (`[{"id": [1, 2, 3]}]`), where an
//! array value becomes a member list. Keys keep the order they were written in.

use crate::error::DynqError;
use crate::value::Value;
use serde::Deserialize;

/// The right-hand side of one condition entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    /// `column = value`
    Scalar(Value),
    /// `column IN (v1, v2, ...)`
    Members(Vec<Value>),
}

impl From<Value> for ConditionValue {
    fn from(v: Value) -> Self {
        ConditionValue::Scalar(v)
    }
}

impl From<Vec<Value>> for ConditionValue {
    fn from(values: Vec<Value>) -> Self {
        ConditionValue::Members(values)
    }
}

impl TryFrom<serde_json::Value> for ConditionValue {
    type Error = DynqError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Value::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(ConditionValue::Members),
            other => Value::try_from(other).map(ConditionValue::Scalar),
        }
    }
}

/// One `AND` group: column names mapped to required values, in insertion order.
///
/// Column names used as keys are written into the SQL as given; they are not
/// checked against the projection column rules.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "serde_json::Map<String, serde_json::Value>")]
pub struct ConditionGroup {
    entries: Vec<(String, ConditionValue)>,
}

impl ConditionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. A repeated column adds a second constraint rather than
    /// replacing the first.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<ConditionValue>) {
        self.entries.push((column.into(), value.into()));
    }

    /// Require `column = value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, ConditionValue::Scalar(value.into()));
        self
    }

    /// Require `column IN (values...)`.
    pub fn any_of<T: Into<Value>>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(column, ConditionValue::Members(values));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConditionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ConditionGroup
where
    K: Into<String>,
    V: Into<ConditionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut group = Self::new();
        for (k, v) in iter {
            group.insert(k, v);
        }
        group
    }
}

impl TryFrom<serde_json::Map<String, serde_json::Value>> for ConditionGroup {
    type Error = DynqError;

    fn try_from(map: serde_json::Map<String, serde_json::Value>) -> Result<Self, Self::Error> {
        let mut group = Self::new();
        for (column, json) in map {
            let value = ConditionValue::try_from(json).map_err(|e| match e {
                DynqError::InvalidArgument(msg) => {
                    DynqError::invalid_argument(format!("Condition '{column}': {msg}"))
                }
                other => other,
            })?;
            group.insert(column, value);
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_keeps_insertion_order() {
        let group = ConditionGroup::new().eq("id", 1).eq("age", 25);
        let keys: Vec<_> = group.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "age"]);
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn any_of_collects_members() {
        let group = ConditionGroup::new().any_of("id", [1, 2, 3]);
        let (_, value) = group.iter().next().unwrap();
        assert_eq!(
            value,
            &ConditionValue::Members(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn from_pairs() {
        let group: ConditionGroup = [("name", Value::from("alice"))].into_iter().collect();
        assert_eq!(
            group.iter().next(),
            Some(("name", &ConditionValue::Scalar(Value::Text("alice".into()))))
        );
    }

    #[test]
    fn deserializes_scalars_and_lists() {
        let groups: Vec<ConditionGroup> =
            serde_json::from_value(json!([{"id": [1, 2, 3]}, {"name": "bob"}])).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups[0].iter().next().unwrap().1,
            &ConditionValue::Members(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(
            groups[1].iter().next().unwrap().1,
            &ConditionValue::Scalar(Value::Text("bob".into()))
        );
    }

    #[test]
    fn json_keys_keep_written_order() {
        let group: ConditionGroup =
            serde_json::from_str(r#"{"name": "bob", "age": 30, "id": [1, 2]}"#).unwrap();
        let keys: Vec<_> = group.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["name", "age", "id"]);
    }

    #[test]
    fn deserializes_empty_group() {
        let groups: Vec<ConditionGroup> = serde_json::from_value(json!([{}])).unwrap();
        assert!(groups[0].is_empty());
    }

    #[test]
    fn rejects_nested_containers() {
        let err = serde_json::from_value::<ConditionGroup>(json!({"id": [[1]]})).unwrap_err();
        assert!(err.to_string().contains("Condition 'id'"));
        assert!(serde_json::from_value::<ConditionGroup>(json!({"id": {"gt": 1}})).is_err());
    }
}
