//! Purpose: Answer a file of questions offline and write the reports as JSON.
//! Exports: `extract_query`, `read_questions`, `run_batch`, `BatchSummary`.
//! Role: Backs the `batch` subcommand.
//! Invariants: Items that yield an empty query are skipped; output order follows input order.
use crate::agent::{Agent, AgentReport};
use crate::core::error::{Error, ErrorKind};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchSummary {
    pub questions: usize,
    pub answered: usize,
    pub skipped: usize,
}

/// A question item is either a bare string or an object carrying a string
/// `input` (preferred) or `query` field.
pub fn extract_query(item: &Value) -> String {
    match item {
        Value::String(text) => text.trim().to_string(),
        Value::Object(map) => ["input", "query"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(|text| text.trim().to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

pub fn read_questions(path: &Path) -> Result<Vec<Value>, Error> {
    let text = fs::read_to_string(path).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read questions file")
            .with_path(path)
            .with_source(err)
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("questions file is not valid JSON")
            .with_path(path)
            .with_source(err)
    })?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(Error::new(ErrorKind::Usage)
            .with_message("questions file must contain a JSON array")
            .with_path(path)
            .with_hint("Use [\"question\", {\"input\": \"question\"}, ...].")),
    }
}

pub fn run_batch(agent: &Agent, input: &Path, output: &Path) -> Result<BatchSummary, Error> {
    let items = read_questions(input)?;
    let mut reports: Vec<AgentReport> = Vec::new();
    for item in &items {
        let query = extract_query(item);
        if query.is_empty() {
            continue;
        }
        reports.push(agent.answer(&query));
    }
    tracing::info!(
        questions = items.len(),
        answered = reports.len(),
        "batch answered"
    );
    write_reports(output, &reports)?;
    Ok(BatchSummary {
        questions: items.len(),
        answered: reports.len(),
        skipped: items.len() - reports.len(),
    })
}

fn write_reports(path: &Path, reports: &[AgentReport]) -> Result<(), Error> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    reports.serialize(&mut serializer).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode reports")
            .with_source(err)
    })?;
    buf.push(b'\n');
    fs::write(path, buf).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write answers file")
            .with_path(path)
            .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::{extract_query, read_questions, run_batch};
    use crate::agent::Agent;
    use crate::agent::providers::{Provider, ProviderAnswer};
    use crate::core::error::{Error, ErrorKind};
    use serde_json::{Value, json};
    use std::fs;
    use std::sync::Arc;

    struct Echo;

    impl Provider for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn fetch(&self, query: &str) -> Result<ProviderAnswer, Error> {
            Ok(ProviderAnswer {
                provider: "echo".to_string(),
                claim: query.to_string(),
                answer: query.to_uppercase(),
                sources: Vec::new(),
                base_confidence: 0.5,
                reasoning_notes: Vec::new(),
            })
        }
    }

    fn echo_agent() -> Agent {
        let echo: Arc<dyn Provider> = Arc::new(Echo);
        Agent::new(echo.clone(), echo.clone(), echo)
    }

    #[test]
    fn extract_query_accepts_strings_and_objects() {
        assert_eq!(extract_query(&json!("  hi  ")), "hi");
        assert_eq!(extract_query(&json!({"input": " a ", "query": "b"})), "a");
        assert_eq!(extract_query(&json!({"query": "b"})), "b");
        assert_eq!(extract_query(&json!({"input": 3, "query": "b"})), "b");
        assert_eq!(extract_query(&json!({"other": "x"})), "");
        assert_eq!(extract_query(&json!(42)), "");
    }

    #[test]
    fn read_questions_requires_an_array() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("q.json");
        fs::write(&path, r#"{"input": "x"}"#).expect("write");
        let err = read_questions(&path).expect_err("object rejected");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[test]
    fn read_questions_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.json");
        assert_eq!(
            read_questions(&missing).expect_err("missing").kind(),
            ErrorKind::Io
        );
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "[1,").expect("write");
        assert_eq!(read_questions(&bad).expect_err("bad").kind(), ErrorKind::Decode);
    }

    #[test]
    fn batch_answers_in_order_and_skips_empty_items() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        fs::write(
            &input,
            r#"["When was the Eiffel Tower completed?", {"query": "   "}, 7, {"input": "Who wrote Hamlet?"}]"#,
        )
        .expect("write");

        let summary = run_batch(&echo_agent(), &input, &output).expect("batch");
        assert_eq!(summary.questions, 4);
        assert_eq!(summary.answered, 2);
        assert_eq!(summary.skipped, 2);

        let text = fs::read_to_string(&output).expect("read");
        assert!(text.contains("\n    {\n        \"claim\""));
        let reports: Value = serde_json::from_str(&text).expect("json");
        let answers: Vec<&str> = reports
            .as_array()
            .expect("array")
            .iter()
            .map(|report| report["answer"].as_str().expect("answer"))
            .collect();
        assert_eq!(
            answers,
            ["WHEN WAS THE EIFFEL TOWER COMPLETED?", "WHO WROTE HAMLET?"]
        );
    }
}
