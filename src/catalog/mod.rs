pub mod prompts;

use crate::llm::CallExecutor;
use crate::parser::extract_json;
use serde_json::{Map, Value};
use tracing::warn;

use prompts::{SYSTEM_JSON, SYSTEM_LIST};

/// Marker written into every field an operation could not produce.
pub const LLM_ERROR: &str = "LLM error";

/// Marker for fields lost to an unexpected per-record failure, distinct from
/// the per-operation marker above.
pub const PROCESSING_ERROR: &str = "Processing error";

/// The named assessment operations, plus the startup connection check.
/// Used for logging and for dispatch in test stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ConnectionCheck,
    Completeness,
    ObjectiveFit,
    ExecutionFit,
    TypeFit,
    FrequencyFit,
    Dependencies,
    Segregation,
    OverallRating,
    Evidence,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::ConnectionCheck => "connection-check",
            Operation::Completeness => "completeness",
            Operation::ObjectiveFit => "objective-fit",
            Operation::ExecutionFit => "execution-fit",
            Operation::TypeFit => "type-fit",
            Operation::FrequencyFit => "frequency-fit",
            Operation::Dependencies => "dependencies",
            Operation::Segregation => "segregation-of-duties",
            Operation::OverallRating => "overall-rating",
            Operation::Evidence => "expected-evidence",
        };
        write!(f, "{}", name)
    }
}

/// A binary (or, for the overall rating, tri-state) judgment with reasoning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment {
    pub answer: String,
    pub explanation: String,
}

impl Judgment {
    pub fn error() -> Self {
        Self {
            answer: LLM_ERROR.to_string(),
            explanation: LLM_ERROR.to_string(),
        }
    }
}

/// 6W completeness breakdown, each field rendered as bullet lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completeness {
    pub present: String,
    pub missing: String,
    pub suggestions: String,
}

impl Completeness {
    pub fn error() -> Self {
        Self {
            present: LLM_ERROR.to_string(),
            missing: LLM_ERROR.to_string(),
            suggestions: LLM_ERROR.to_string(),
        }
    }

    /// Combined form used in the output table and the overall-rating prompt
    pub fn documentation(&self) -> String {
        format!("Present:\n{}\n\nMissing:\n{}", self.present, self.missing)
    }
}

/// Inputs the overall rating synthesizes. All five judgments (and the
/// completeness text) must exist before this struct can be built, which is
/// what enforces the dependency order.
#[derive(Debug)]
pub struct RatingSignals<'a> {
    pub objective: &'a str,
    pub execution: &'a str,
    pub control_type: &'a str,
    pub frequency: &'a str,
    pub systems: &'a str,
    pub present: &'a str,
    pub missing: &'a str,
}

/// Runs the assessment catalog against one record's fields. Every method
/// degrades to markers instead of failing; errors never cross this boundary.
pub struct Assessor<'a> {
    executor: &'a CallExecutor,
}

impl<'a> Assessor<'a> {
    pub fn new(executor: &'a CallExecutor) -> Self {
        Self { executor }
    }

    pub async fn completeness(&self, control_desc: &str) -> Completeness {
        let map = match self
            .call_json(Operation::Completeness, prompts::completeness(control_desc))
            .await
        {
            Some(map) => map,
            None => return Completeness::error(),
        };

        Completeness {
            present: bullet_field(&map, "present"),
            missing: bullet_field(&map, "missing"),
            suggestions: bullet_field(&map, "suggestions"),
        }
    }

    pub async fn objective_fit(&self, risk_desc: &str, control_desc: &str) -> Judgment {
        self.judgment(
            Operation::ObjectiveFit,
            prompts::objective_fit(risk_desc, control_desc),
            "answer",
        )
        .await
    }

    pub async fn execution_fit(
        &self,
        automation: &str,
        risk_desc: &str,
        control_desc: &str,
    ) -> Judgment {
        self.judgment(
            Operation::ExecutionFit,
            prompts::execution_fit(automation, risk_desc, control_desc),
            "answer",
        )
        .await
    }

    pub async fn type_fit(
        &self,
        control_type: &str,
        risk_desc: &str,
        control_desc: &str,
    ) -> Judgment {
        self.judgment(
            Operation::TypeFit,
            prompts::type_fit(control_type, risk_desc, control_desc),
            "answer",
        )
        .await
    }

    pub async fn frequency_fit(
        &self,
        frequency: &str,
        risk_desc: &str,
        control_desc: &str,
    ) -> Judgment {
        self.judgment(
            Operation::FrequencyFit,
            prompts::frequency_fit(frequency, risk_desc, control_desc),
            "answer",
        )
        .await
    }

    /// Comma-joined system/data source names, or the model's "None found"
    pub async fn dependencies(&self, control_desc: &str) -> String {
        match self
            .call_json(Operation::Dependencies, prompts::dependencies(control_desc))
            .await
        {
            Some(map) => field(&map, "systems"),
            None => LLM_ERROR.to_string(),
        }
    }

    pub async fn segregation(&self, control_desc: &str) -> Judgment {
        self.judgment(
            Operation::Segregation,
            prompts::segregation(control_desc),
            "answer",
        )
        .await
    }

    pub async fn overall_rating(&self, signals: &RatingSignals<'_>) -> Judgment {
        self.judgment(
            Operation::OverallRating,
            prompts::overall_rating(signals),
            "rating",
        )
        .await
    }

    /// The one operation whose response is free text, not JSON
    pub async fn evidence(&self, control_desc: &str) -> String {
        match self
            .executor
            .call(Operation::Evidence, SYSTEM_LIST, &prompts::evidence(control_desc))
            .await
        {
            Ok(raw) => raw.trim().to_string(),
            Err(e) => {
                warn!("{} degraded to marker: {}", Operation::Evidence, e);
                LLM_ERROR.to_string()
            }
        }
    }

    async fn judgment(&self, op: Operation, prompt: String, answer_key: &str) -> Judgment {
        match self.call_json(op, prompt).await {
            Some(map) => Judgment {
                answer: field(&map, answer_key),
                explanation: field(&map, "explanation"),
            },
            None => Judgment::error(),
        }
    }

    async fn call_json(&self, op: Operation, prompt: String) -> Option<Map<String, Value>> {
        let raw = match self.executor.call(op, SYSTEM_JSON, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("{} degraded to marker: {}", op, e);
                return None;
            }
        };
        extract_json(&raw)
    }
}

/// Expected key as a string; absent key becomes the error marker.
fn field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .map(value_text)
        .unwrap_or_else(|| LLM_ERROR.to_string())
}

/// Render an element → comment object as bullet lines, one per element.
/// An absent key is a shape violation and becomes the error marker; an empty
/// object legitimately renders as an empty string (e.g. nothing missing).
fn bullet_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::Object(inner)) => inner
            .iter()
            .map(|(k, v)| format!("• {}: {}", k, value_text(v)))
            .collect::<Vec<_>>()
            .join("\n"),
        Some(other) => value_text(other),
        None => LLM_ERROR.to_string(),
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::error::LlmError;
    use crate::llm::LlmClient;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedClient {
        body: String,
    }

    #[async_trait]
    impl LlmClient for FixedClient {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            Ok(self.body.clone())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl LlmClient for FailingClient {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            Err(LlmError::Http {
                status: 500,
                body: "boom".to_string(),
            })
        }
    }

    fn executor_with(body: &str) -> CallExecutor {
        CallExecutor::new(
            Arc::new(FixedClient {
                body: body.to_string(),
            }),
            RetryConfig {
                max_attempts: 1,
                backoff_base_ms: 1,
                backoff_max_ms: 1,
            },
        )
    }

    fn failing_executor() -> CallExecutor {
        CallExecutor::new(
            Arc::new(FailingClient),
            RetryConfig {
                max_attempts: 2,
                backoff_base_ms: 1,
                backoff_max_ms: 1,
            },
        )
    }

    #[tokio::test]
    async fn test_judgment_well_formed() {
        let executor = executor_with(r#"{"answer": "Yes", "explanation": "solid design"}"#);
        let assessor = Assessor::new(&executor);

        let j = assessor.objective_fit("risk", "control").await;
        assert_eq!(j.answer, "Yes");
        assert_eq!(j.explanation, "solid design");
    }

    #[tokio::test]
    async fn test_judgment_missing_key_defaults_per_key() {
        let executor = executor_with(r#"{"answer": "No"}"#);
        let assessor = Assessor::new(&executor);

        let j = assessor.segregation("control").await;
        assert_eq!(j.answer, "No");
        assert_eq!(j.explanation, LLM_ERROR);
    }

    #[tokio::test]
    async fn test_judgment_garbage_response() {
        let executor = executor_with("I'd rather not say.");
        let assessor = Assessor::new(&executor);

        let j = assessor.frequency_fit("daily", "risk", "control").await;
        assert_eq!(j, Judgment::error());
    }

    #[tokio::test]
    async fn test_judgment_call_failure() {
        let executor = failing_executor();
        let assessor = Assessor::new(&executor);

        let j = assessor.execution_fit("Manual", "risk", "control").await;
        assert_eq!(j, Judgment::error());
    }

    #[tokio::test]
    async fn test_completeness_bullets() {
        let executor = executor_with(
            r#"{"present": {"Who": "the manager", "What": "report review"},
                "missing": {"When": "no timeline stated"},
                "suggestions": {"When": "add a frequency"}}"#,
        );
        let assessor = Assessor::new(&executor);

        let c = assessor.completeness("desc").await;
        assert!(c.present.contains("• Who: the manager"));
        assert!(c.present.contains("• What: report review"));
        assert_eq!(c.missing, "• When: no timeline stated");
        assert_eq!(c.suggestions, "• When: add a frequency");
        assert!(c.documentation().starts_with("Present:\n"));
    }

    #[tokio::test]
    async fn test_completeness_empty_missing_object() {
        let executor =
            executor_with(r#"{"present": {"Who": "x"}, "missing": {}, "suggestions": {}}"#);
        let assessor = Assessor::new(&executor);

        let c = assessor.completeness("desc").await;
        assert_eq!(c.missing, "");
        assert_eq!(c.suggestions, "");
    }

    #[tokio::test]
    async fn test_completeness_absent_key_is_marker() {
        let executor = executor_with(r#"{"present": {"Who": "x"}}"#);
        let assessor = Assessor::new(&executor);

        let c = assessor.completeness("desc").await;
        assert_eq!(c.missing, LLM_ERROR);
        assert_eq!(c.suggestions, LLM_ERROR);
    }

    #[tokio::test]
    async fn test_dependencies_sentinel_passthrough() {
        let executor = executor_with(r#"{"systems": "None found"}"#);
        let assessor = Assessor::new(&executor);

        assert_eq!(assessor.dependencies("desc").await, "None found");
    }

    #[tokio::test]
    async fn test_overall_rating_reads_rating_key() {
        let executor = executor_with(r#"{"rating": "Effective", "explanation": "all green"}"#);
        let assessor = Assessor::new(&executor);

        let signals = RatingSignals {
            objective: "Yes",
            execution: "Yes",
            control_type: "Yes",
            frequency: "Yes",
            systems: "SAP",
            present: "• Who: manager",
            missing: "",
        };
        let j = assessor.overall_rating(&signals).await;
        assert_eq!(j.answer, "Effective");
    }

    #[tokio::test]
    async fn test_evidence_is_raw_text() {
        let executor = executor_with("1. Signed review log\n2. System report");
        let assessor = Assessor::new(&executor);

        let e = assessor.evidence("desc").await;
        assert_eq!(e, "1. Signed review log\n2. System report");
    }

    #[tokio::test]
    async fn test_evidence_failure_marker() {
        let executor = failing_executor();
        let assessor = Assessor::new(&executor);

        assert_eq!(assessor.evidence("desc").await, LLM_ERROR);
    }
}
