// tests/runner_tests.rs

use std::sync::{Arc, Mutex};

use advq::{
    Database, DatabaseError, MockDatabase, OutputShape, QueryRunner, RunError, RunnerConfig,
    StaticDatabase, Value,
};
use async_trait::async_trait;

/// Database double that records every query it receives.
#[derive(Default)]
struct RecordingDatabase {
    rows: Vec<Value>,
    fail: bool,
    calls: Mutex<Vec<String>>,
}

impl RecordingDatabase {
    fn with_rows(rows: Vec<Value>) -> Arc<Self> {
        Arc::new(RecordingDatabase {
            rows,
            ..Default::default()
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(RecordingDatabase {
            fail: true,
            ..Default::default()
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Database for RecordingDatabase {
    async fn query(&self, expression: &str) -> Result<Vec<Value>, DatabaseError> {
        self.calls.lock().unwrap().push(expression.to_string());
        if self.fail {
            return Err(DatabaseError::Unavailable("connection refused".into()));
        }
        Ok(self.rows.clone())
    }
}

fn tuple(id: &str, content: &str) -> Value {
    Value::Vector(vec![Value::string(id), Value::string(content)])
}

fn five_tuples() -> Vec<Value> {
    (1..=5)
        .map(|i| tuple(&format!("block{}", i), &format!("content{}", i)))
        .collect()
}

fn runner(db: &Arc<RecordingDatabase>) -> QueryRunner {
    QueryRunner::new(db.clone())
}

// ============================================================================
// Database Dispatch
// ============================================================================

#[tokio::test]
async fn test_query_dispatched_once_as_edn() {
    let db = RecordingDatabase::with_rows(vec![]);
    runner(&db)
        .run(r#"{:query [:find ?b :where [?b :block/refs #{"TODO"}]]}"#)
        .await
        .unwrap();
    assert_eq!(
        db.calls(),
        vec![r#"[:find ?b :where [?b :block/refs #{"TODO"}]]"#.to_string()]
    );
}

#[tokio::test]
async fn test_query_text_is_normalized() {
    let db = RecordingDatabase::with_rows(vec![]);
    runner(&db)
        .run("{:query [:find ?b\n  :where ; comment\n  [?b :block/marker ?m]]}")
        .await
        .unwrap();
    assert_eq!(db.calls(), vec!["[:find ?b :where [?b :block/marker ?m]]".to_string()]);
}

#[tokio::test]
async fn test_missing_query_never_reaches_database() {
    let db = RecordingDatabase::with_rows(five_tuples());
    let err = runner(&db)
        .run(r#"{:title "No query" :view (fn [data] (count data))}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::MissingQueryComponent));
    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_input_never_reaches_database() {
    let db = RecordingDatabase::with_rows(five_tuples());
    for input in ["{:query [:find ?b", "", "[:find ?b]", "{:query [] :query []}"] {
        let err = runner(&db).run(input).await.unwrap_err();
        assert!(
            matches!(err, RunError::MalformedInput(_)),
            "Failed for: {:?}",
            input
        );
    }
    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn test_database_failure() {
    let db = RecordingDatabase::failing();
    let err = runner(&db).run("{:query [:find ?b]}").await.unwrap_err();
    assert!(matches!(err, RunError::DatabaseQueryFailed(DatabaseError::Unavailable(_))));
    assert_eq!(
        err.to_string(),
        "database query failed: database unavailable: connection refused"
    );
    assert_eq!(db.calls().len(), 1);
}

// ============================================================================
// Stages
// ============================================================================

#[tokio::test]
async fn test_result_transform_runs_before_view() {
    let db = RecordingDatabase::with_rows(five_tuples());
    let output = runner(&db)
        .run(
            "{:query [:find ?b ?c]
              :view (fn [data] (map first data))
              :result-transform (fn [data] (take 3 data))}",
        )
        .await
        .unwrap();
    assert_eq!(
        output.results,
        Value::Vector(vec![
            Value::string("block1"),
            Value::string("block2"),
            Value::string("block3"),
        ])
    );
    assert_eq!(output.raw_results, five_tuples());
}

#[tokio::test]
async fn test_unsupported_view_keeps_raw_results() {
    let db = RecordingDatabase::with_rows(five_tuples());
    let output = runner(&db)
        .run("{:query [:find ?b] :view invalid-function}")
        .await
        .unwrap();
    assert_eq!(output.results, Value::Vector(five_tuples()));
    assert!(output.metadata.has_view);
}

#[tokio::test]
async fn test_reader_shorthand_in_view_keeps_raw_results() {
    let db = RecordingDatabase::with_rows(five_tuples());
    let output = runner(&db)
        .run(r#"{:query [:find ?b] :view (fn [rows] (sort-by #(first %) (filter #(re-find #"^b" (first %)) rows)))}"#)
        .await
        .unwrap();
    assert_eq!(db.calls().len(), 1);
    assert_eq!(output.results, Value::Vector(five_tuples()));
}

#[tokio::test]
async fn test_anonymous_function_result_transform_is_identity() {
    let db = RecordingDatabase::with_rows(five_tuples());
    let output = runner(&db)
        .run("{:query [:find ?b] :result-transform #(take 2 %)}")
        .await
        .unwrap();
    assert_eq!(output.results, Value::Vector(five_tuples()));
    assert!(output.metadata.has_result_transform);
}

#[tokio::test]
async fn test_anonymous_function_inside_fn_body_is_walked() {
    let db = RecordingDatabase::with_rows(five_tuples());
    let output = runner(&db)
        .run("{:query [] :view (fn [rows] (map #(nth % 1) (take 2 rows)))}")
        .await
        .unwrap();
    assert_eq!(output.results, Value::Vector(five_tuples()[..2].to_vec()));
}

#[tokio::test]
async fn test_deeply_chained_tags_are_malformed() {
    let db = RecordingDatabase::with_rows(five_tuples());
    let text = format!("{{:query {}1}}", "#a ".repeat(200_000));
    let err = runner(&db).run(&text).await.unwrap_err();
    assert!(matches!(err, RunError::MalformedInput(_)));
    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn test_count_view() {
    let db = RecordingDatabase::with_rows(five_tuples());
    let output = runner(&db)
        .run("{:query [:find ?b] :view (fn [data] (count data))}")
        .await
        .unwrap();
    assert_eq!(output.results, Value::Integer(5));
}

#[tokio::test]
async fn test_string_view_is_a_display_tag() {
    let db = RecordingDatabase::with_rows(five_tuples());
    let output = runner(&db)
        .run(r#"{:query [:find ?b] :view "table"}"#)
        .await
        .unwrap();
    assert_eq!(output.results, Value::Vector(five_tuples()));
}

#[tokio::test]
async fn test_empty_results_with_stages() {
    let db = RecordingDatabase::with_rows(vec![]);
    let output = runner(&db)
        .run(
            "{:query [:find ?b]
              :result-transform (fn [data] (take 3 data))
              :view (fn [data] (map first data))}",
        )
        .await
        .unwrap();
    assert_eq!(output.results, Value::Vector(vec![]));
    assert!(output.raw_results.is_empty());
}

// ============================================================================
// Metadata
// ============================================================================

#[tokio::test]
async fn test_metadata_defaults() {
    let db = RecordingDatabase::with_rows(vec![]);
    let output = runner(&db).run("{:query [:find ?b]}").await.unwrap();
    let metadata = output.metadata;
    assert_eq!(metadata.title, "Advanced Query");
    assert!(!metadata.collapsed);
    assert!(!metadata.has_view);
    assert!(!metadata.has_result_transform);
    assert!(!metadata.has_inputs);
    assert_eq!(metadata.query_components, vec!["query"]);
    assert!(output.bare_query);
}

#[tokio::test]
async fn test_metadata_reports_components_in_order() {
    let db = RecordingDatabase::with_rows(vec![]);
    let output = runner(&db)
        .run(
            r#"{:title "Tasks"
                :inputs [:current-page]
                :query [:find ?b]
                :collapsed? true
                :result-transform (fn [data] (take 1 data))}"#,
        )
        .await
        .unwrap();
    let metadata = output.metadata;
    assert_eq!(metadata.title, "Tasks");
    assert!(metadata.collapsed);
    assert!(metadata.has_inputs);
    assert!(metadata.has_result_transform);
    assert!(!metadata.has_view);
    assert_eq!(
        metadata.query_components,
        vec!["title", "inputs", "query", "collapsed?", "result-transform"]
    );
    assert!(!output.bare_query);
}

#[tokio::test]
async fn test_non_string_title_uses_default() {
    let db = RecordingDatabase::with_rows(vec![]);
    let output = runner(&db).run("{:title 42 :query []}").await.unwrap();
    assert_eq!(output.metadata.title, "Advanced Query");
}

#[tokio::test]
async fn test_configured_default_title() {
    let db = RecordingDatabase::with_rows(vec![]);
    let config = RunnerConfig {
        default_title: "Query".into(),
        ..Default::default()
    };
    let runner = QueryRunner::with_config(db.clone(), config);
    assert_eq!(runner.config().default_title, "Query");
    assert_eq!(runner.config().output, OutputShape::Auto);
    let output = runner.run("{:query [] :view :table}").await.unwrap();
    assert_eq!(output.metadata.title, "Query");
}

// ============================================================================
// Rendering
// ============================================================================

#[tokio::test]
async fn test_titled_query_with_empty_results_renders_full_structure() {
    let db = RecordingDatabase::with_rows(vec![]);
    let rendered = runner(&db)
        .run_to_string(r#"{:title "Empty" :query [:find ?b]}"#)
        .await
        .unwrap();
    assert_eq!(
        rendered,
        r#"{
  "results": [],
  "metadata": {
    "title": "Empty",
    "collapsed": false,
    "hasView": false,
    "hasResultTransform": false,
    "hasInputs": false,
    "queryComponents": [
      "title",
      "query"
    ]
  },
  "rawResults": []
}"#
    );
}

#[tokio::test]
async fn test_bare_query_renders_raw_tuples() {
    let db = RecordingDatabase::with_rows(vec![tuple("block1", "content1")]);
    let rendered = runner(&db).run_to_string("{:query [:find ?b]}").await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(json, serde_json::json!([["block1", "content1"]]));
}

#[tokio::test]
async fn test_render_shapes() {
    let db = RecordingDatabase::with_rows(five_tuples());
    let output = runner(&db)
        .run("{:query [:find ?b] :view (fn [data] (count data))}")
        .await
        .unwrap();

    assert_eq!(output.render(OutputShape::Results, false), "5");

    let full: serde_json::Value =
        serde_json::from_str(&output.render(OutputShape::Full, false)).unwrap();
    assert_eq!(full["results"], serde_json::json!(5));
    assert_eq!(full["metadata"]["hasView"], serde_json::json!(true));
    assert_eq!(full["rawResults"].as_array().map(Vec::len), Some(5));

    let auto: serde_json::Value =
        serde_json::from_str(&output.render(OutputShape::Auto, true)).unwrap();
    assert_eq!(auto, full);
}

#[tokio::test]
async fn test_forced_full_shape_for_bare_query() {
    let db = RecordingDatabase::with_rows(vec![]);
    let config = RunnerConfig {
        output: OutputShape::Full,
        pretty: false,
        ..Default::default()
    };
    let rendered = QueryRunner::with_config(db.clone(), config)
        .run_to_string("{:query [:find ?b]}")
        .await
        .unwrap();
    assert!(rendered.starts_with(r#"{"results":[],"metadata":{"title":"Advanced Query""#));
}

// ============================================================================
// Built-in Databases
// ============================================================================

#[tokio::test]
async fn test_mock_database_serves_seed_blocks() {
    let output = QueryRunner::new(Arc::new(MockDatabase::new()))
        .run("{:query [:find ?b] :view (fn [data] (count data))}")
        .await
        .unwrap();
    assert_eq!(output.results, Value::Integer(3));
    assert_eq!(output.raw_results.len(), 3);
    assert_eq!(
        output.raw_results[0].get_keyword("content"),
        Some(&Value::string("TODO Write documentation for the plugin"))
    );
}

#[tokio::test]
async fn test_runner_serves_overlapping_runs() {
    let runner = Arc::new(QueryRunner::new(Arc::new(StaticDatabase::new(five_tuples()))));
    let first = {
        let runner = runner.clone();
        tokio::spawn(async move {
            runner
                .run("{:query [] :view (fn [data] (take 1 data))}")
                .await
                .map(|output| output.results)
        })
    };
    let second = runner
        .run("{:query [] :view (fn [data] (count data))}")
        .await
        .unwrap();
    assert_eq!(second.results, Value::Integer(5));
    assert_eq!(
        first.await.unwrap().unwrap(),
        Value::Vector(vec![tuple("block1", "content1")])
    );
}
