use super::*;
use crate::value::Value;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
struct Call {
    tag: Option<String>,
    sql: String,
    params: Vec<Value>,
}

/// Records every statement and answers with canned data.
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Call>>,
    rows: Vec<Row>,
    count: i64,
    fail: Option<&'static str>,
}

impl Recorder {
    fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    fn failing(message: &'static str) -> Self {
        Self {
            fail: Some(message),
            ..Self::default()
        }
    }

    fn record(&self, tag: Option<&str>, sql: &str, params: &[Value]) -> DynqResult<()> {
        self.calls.lock().unwrap().push(Call {
            tag: tag.map(str::to_string),
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        match self.fail {
            Some(message) => Err(DynqError::Connection(message.to_string())),
            None => Ok(()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl GenericClient for Recorder {
    async fn query_rows(&self, sql: &str, params: &[Value]) -> DynqResult<Vec<Row>> {
        self.record(None, sql, params)?;
        Ok(self.rows.clone())
    }

    async fn query_count(&self, sql: &str, params: &[Value]) -> DynqResult<i64> {
        self.record(None, sql, params)?;
        Ok(self.count)
    }

    async fn query_rows_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[Value],
    ) -> DynqResult<Vec<Row>> {
        self.record(Some(tag), sql, params)?;
        Ok(self.rows.clone())
    }

    async fn query_count_tagged(&self, tag: &str, sql: &str, params: &[Value]) -> DynqResult<i64> {
        self.record(Some(tag), sql, params)?;
        Ok(self.count)
    }
}

fn user(id: i64, name: &str) -> Row {
    Row::new().with("id", id).with("name", name)
}

fn service(client: Recorder) -> DynamicQuery<Recorder> {
    DynamicQuery::new(client).with_logger(SqlLogger::disabled())
}

#[tokio::test]
async fn query_table_sends_plain_select() {
    let dq = service(Recorder::with_rows(vec![user(1, "a"), user(2, "b")]));

    let rows = dq.query_table("test_user", &["id", "name"]).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("name"), Some(&Value::Text("b".into())));
    assert_eq!(
        dq.client().calls(),
        vec![Call {
            tag: Some("dynq.query_table".into()),
            sql: "SELECT id, name FROM test_user".into(),
            params: vec![],
        }]
    );
}

#[tokio::test]
async fn query_with_conditions_binds_in_order() {
    let dq = service(Recorder::default());
    let groups = vec![
        ConditionGroup::new().eq("id", 1).eq("age", 25),
        ConditionGroup::new().any_of("age", [30, 35]),
    ];

    dq.query_with_conditions("test_user", &["id"], &groups)
        .await
        .unwrap();

    let calls = dq.client().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].tag.as_deref(), Some("dynq.query_with_conditions"));
    assert_eq!(
        calls[0].sql,
        "SELECT id FROM test_user WHERE (id = $1 AND age = $2) OR (age IN ($3, $4))"
    );
    assert_eq!(
        calls[0].params,
        vec![Value::Int(1), Value::Int(25), Value::Int(30), Value::Int(35)]
    );
}

#[tokio::test]
async fn query_with_pagination_binds_limit_and_offset() {
    let dq = service(Recorder::default());

    dq.query_with_pagination("test_user", &["*"], 4, 2)
        .await
        .unwrap();

    let calls = dq.client().calls();
    assert_eq!(calls[0].tag.as_deref(), Some("dynq.query_with_pagination"));
    assert_eq!(calls[0].sql, "SELECT * FROM test_user LIMIT $1 OFFSET $2");
    assert_eq!(calls[0].params, vec![Value::Int(2), Value::Int(4)]);
}

#[tokio::test]
async fn get_total_count_returns_executor_value() {
    let dq = service(Recorder {
        count: 5,
        ..Recorder::default()
    });

    assert_eq!(dq.get_total_count("test_user").await.unwrap(), 5);
    let calls = dq.client().calls();
    assert_eq!(calls[0].tag.as_deref(), Some("dynq.get_total_count"));
    assert_eq!(calls[0].sql, "SELECT COUNT(*) FROM test_user");
}

#[tokio::test]
async fn invalid_input_never_reaches_executor() {
    let dq = service(Recorder::default());
    let none: [&str; 0] = [];

    let errors = vec![
        dq.query_table("", &["id"]).await.unwrap_err(),
        dq.query_table("test_user", &none).await.unwrap_err(),
        dq.query_table("test-user; DROP TABLE", &["id"])
            .await
            .unwrap_err(),
        dq.query_table("test_user", &["name; DROP TABLE"])
            .await
            .unwrap_err(),
        dq.query_with_conditions("test_user", &["id"], &[])
            .await
            .unwrap_err(),
        dq.query_with_conditions("test_user", &["id"], &[ConditionGroup::new()])
            .await
            .unwrap_err(),
        dq.query_with_pagination("test_user", &["id"], -1, 2)
            .await
            .unwrap_err(),
        dq.query_with_pagination("test_user", &["id"], 0, 0)
            .await
            .unwrap_err(),
        dq.get_total_count("  ").await.unwrap_err(),
        dq.get_total_count("a;b").await.unwrap_err(),
    ];

    for err in &errors {
        assert!(err.is_invalid_argument(), "{err:?}");
    }
    assert!(dq.client().calls().is_empty());
}

#[tokio::test]
async fn common_parameters_are_checked_before_conditions() {
    let dq = service(Recorder::default());
    let err = dq
        .query_with_conditions("bad-table", &["id"], &[])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid table name"));

    let err = dq
        .query_with_pagination("t", &["bad col"], -1, 0)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid column name"));
}

#[tokio::test]
async fn executor_errors_pass_through() {
    let dq = service(Recorder::failing("connection refused"));

    let err = dq.query_table("test_user", &["id"]).await.unwrap_err();
    assert!(err.is_execution_failure());
    assert!(matches!(err, DynqError::Connection(ref m) if m == "connection refused"));

    let err = dq.get_total_count("test_user").await.unwrap_err();
    assert!(err.is_execution_failure());
    assert_eq!(dq.client().calls().len(), 2);
}

#[tokio::test]
async fn repeated_calls_issue_identical_statements() {
    let dq = service(Recorder::with_rows(vec![user(1, "a")]));
    let groups = vec![ConditionGroup::new().eq("name", "a")];

    let first = dq
        .query_with_conditions("test_user", &["id"], &groups)
        .await
        .unwrap();
    let second = dq
        .query_with_conditions("test_user", &["id"], &groups)
        .await
        .unwrap();

    assert_eq!(first, second);
    let calls = dq.client().calls();
    assert_eq!(calls[0], calls[1]);
}

#[tokio::test]
async fn works_through_a_reference() {
    let recorder = Recorder::default();
    let dq = DynamicQuery::new(&recorder);
    dq.query_table("t", &["id"]).await.unwrap();
    assert_eq!(recorder.calls().len(), 1);
}
