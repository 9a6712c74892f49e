use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use dynq::ConditionGroup;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dynq")]
#[command(version, about = "Validated, parameterized queries against any PostgreSQL table", long_about = None)]
pub struct Cli {
    /// Config file (default: ./dynq.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database URL (overrides the config file and DATABASE_URL)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Output format (overrides [output] format)
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Select columns from a table, optionally filtered or paginated
    Select(SelectArgs),

    /// Count all rows in a table
    Count(CountArgs),
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Table name
    pub table: String,

    /// Comma-separated columns to return (`*` for all)
    #[arg(long, short = 'c', value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// Filter as a JSON array of objects, e.g. '[{"id":1},{"age":[25,30]}]'
    #[arg(long = "where", short = 'w', value_name = "JSON", conflicts_with_all = ["offset", "limit"])]
    pub conditions: Option<String>,

    /// Rows to skip (requires --limit)
    #[arg(long, requires = "limit", allow_negative_numbers = true)]
    pub offset: Option<i64>,

    /// Maximum rows to return (requires --offset)
    #[arg(long, requires = "offset", allow_negative_numbers = true)]
    pub limit: Option<i64>,
}

#[derive(Debug, Args)]
pub struct CountArgs {
    /// Table name
    pub table: String,
}

/// Which service operation a `select` invocation maps to.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectMode {
    All,
    Where(Vec<ConditionGroup>),
    Page { offset: i64, limit: i64 },
}

impl SelectArgs {
    pub fn mode(&self) -> anyhow::Result<SelectMode> {
        if let Some(raw) = &self.conditions {
            let groups = parse_conditions(raw)?;
            return Ok(SelectMode::Where(groups));
        }
        match (self.offset, self.limit) {
            (Some(offset), Some(limit)) => Ok(SelectMode::Page { offset, limit }),
            (None, None) => Ok(SelectMode::All),
            _ => anyhow::bail!("--offset and --limit must be given together"),
        }
    }
}

/// Accepts either a JSON array of objects or a single object.
fn parse_conditions(raw: &str) -> anyhow::Result<Vec<ConditionGroup>> {
    let json: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("--where is not valid JSON: {e}"))?;
    let json = match json {
        obj @ serde_json::Value::Object(_) => serde_json::Value::Array(vec![obj]),
        other => other,
    };
    serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("--where must be an array of objects: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynq::{ConditionValue, Value};

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("dynq").chain(args.iter().copied()))
    }

    fn select(args: &[&str]) -> SelectArgs {
        match parse(args).unwrap().command {
            Command::Select(s) => s,
            other => panic!("expected select, got {other:?}"),
        }
    }

    #[test]
    fn select_splits_columns() {
        let s = select(&["select", "test_user", "--columns", "id,name,age"]);
        assert_eq!(s.table, "test_user");
        assert_eq!(s.columns, vec!["id", "name", "age"]);
        assert_eq!(s.mode().unwrap(), SelectMode::All);
    }

    #[test]
    fn select_requires_columns() {
        assert!(parse(&["select", "test_user"]).is_err());
    }

    #[test]
    fn select_page() {
        let s = select(&["select", "t", "-c", "*", "--offset", "2", "--limit", "3"]);
        assert_eq!(
            s.mode().unwrap(),
            SelectMode::Page {
                offset: 2,
                limit: 3
            }
        );
    }

    #[test]
    fn negative_offset_reaches_the_service() {
        let s = select(&["select", "t", "-c", "id", "--offset", "-1", "--limit", "2"]);
        assert_eq!(
            s.mode().unwrap(),
            SelectMode::Page {
                offset: -1,
                limit: 2
            }
        );
    }

    #[test]
    fn offset_without_limit_is_rejected() {
        assert!(parse(&["select", "t", "-c", "id", "--offset", "2"]).is_err());
    }

    #[test]
    fn where_conflicts_with_pagination() {
        let err = parse(&[
            "select", "t", "-c", "id", "--where", "[]", "--offset", "0", "--limit", "1",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn where_parses_groups() {
        let s = select(&[
            "select",
            "t",
            "-c",
            "id",
            "--where",
            r#"[{"id": 1}, {"age": [25, 30]}]"#,
        ]);
        let SelectMode::Where(groups) = s.mode().unwrap() else {
            panic!("expected where mode");
        };
        assert_eq!(groups.len(), 2);
        let second: Vec<_> = groups[1].iter().collect();
        assert_eq!(
            second,
            vec![(
                "age",
                &ConditionValue::Members(vec![Value::Int(25), Value::Int(30)])
            )]
        );
    }

    #[test]
    fn where_accepts_single_object() {
        let s = select(&["select", "t", "-c", "id", "--where", r#"{"name": "Eve"}"#]);
        let SelectMode::Where(groups) = s.mode().unwrap() else {
            panic!("expected where mode");
        };
        assert_eq!(groups, vec![ConditionGroup::new().eq("name", "Eve")]);
    }

    #[test]
    fn where_keys_keep_typed_order() {
        let s = select(&[
            "select",
            "t",
            "-c",
            "id",
            "--where",
            r#"{"name": "Eve", "age": 40, "id": 5}"#,
        ]);
        let SelectMode::Where(groups) = s.mode().unwrap() else {
            panic!("expected where mode");
        };
        assert_eq!(
            groups,
            vec![ConditionGroup::new().eq("name", "Eve").eq("age", 40).eq("id", 5)]
        );
    }

    #[test]
    fn where_empty_array_is_left_to_the_validator() {
        let s = select(&["select", "t", "-c", "id", "--where", "[]"]);
        assert_eq!(s.mode().unwrap(), SelectMode::Where(vec![]));
    }

    #[test]
    fn where_rejects_bad_json() {
        let s = select(&["select", "t", "-c", "id", "--where", "{nope"]);
        assert!(s.mode().is_err());
        let s = select(&["select", "t", "-c", "id", "--where", "[1]"]);
        assert!(s.mode().is_err());
    }

    #[test]
    fn count_and_globals() {
        let cli = parse(&["count", "test_user", "--format", "json", "--database", "postgres://x"])
            .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.database.as_deref(), Some("postgres://x"));
        assert!(matches!(cli.command, Command::Count(CountArgs { ref table }) if table == "test_user"));
    }
}
