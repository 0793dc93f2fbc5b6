//! Pass/fail judgment of a query result against the active challenge.

use crate::decode;
use crate::errors::GenerationError;
use crate::model::{Challenge, Row, Verdict};
use crate::providers::llm::LlmClient;
use serde_json::json;
use std::sync::Arc;

/// Rows sampled from the result when judging. Bounds request size; verdict
/// accuracy on larger result sets is best-effort by design.
pub const VERDICT_SAMPLE_ROWS: usize = 3;

pub struct OutcomeJudge {
    client: Arc<dyn LlmClient>,
}

impl OutcomeJudge {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Judge the query against the challenge. `None` means no verdict was
    /// reached (service failure); callers must not read it as a fail.
    pub async fn evaluate(
        &self,
        challenge: &Challenge,
        query: &str,
        rows: &[Row],
    ) -> Option<Verdict> {
        match self.try_evaluate(challenge, query, rows).await {
            Ok(verdict) => Some(verdict),
            Err(e) => {
                tracing::warn!("validation check failed: {e}");
                None
            }
        }
    }

    async fn try_evaluate(
        &self,
        challenge: &Challenge,
        query: &str,
        rows: &[Row],
    ) -> Result<Verdict, GenerationError> {
        let sample = &rows[..rows.len().min(VERDICT_SAMPLE_ROWS)];
        let prompt = build_verdict_prompt(challenge, query, sample);
        let resp = self.client.complete(&prompt, Some(&response_schema())).await?;
        let verdict: Verdict = decode::extract_as(&resp.text)?;
        Ok(verdict)
    }
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "passed": { "type": "BOOLEAN" },
            "feedback": { "type": "STRING" },
            "explanation": { "type": "STRING" }
        },
        "required": ["passed", "feedback"]
    })
}

pub(crate) fn build_verdict_prompt(challenge: &Challenge, query: &str, sample: &[Row]) -> String {
    let sample_json = serde_json::to_string(sample).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Challenge Goal: {goal}\n\
         Validation Criteria: {criteria}\n\n\
         User Query: {query}\n\
         User Result Sample (First {n} rows): {sample}\n\n\
         Tasks:\n\
         1. Determine if the user solved the challenge (passed: boolean).\n\
         2. Provide feedback message (feedback: string).\n\
         3. Provide a brief educational explanation of WHY it is correct or what concept they missed (explanation: string).\n\
            If they missed it, explain the concept (e.g. \"You need a WHERE clause to filter\").\n\n\
         Return JSON.",
        goal = challenge.description,
        criteria = challenge.validation_criteria,
        n = VERDICT_SAMPLE_ROWS,
        sample = sample_json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use crate::providers::llm::FakeClient;

    fn challenge() -> Challenge {
        Challenge {
            id: "c1".into(),
            dataset_id: "nyc-taxi".into(),
            difficulty: Difficulty::Beginner,
            title: "Suspicious Fares".into(),
            description: "Pull up the suspiciously expensive trips.".into(),
            hints: vec!["a".into(), "b".into(), "c".into()],
            validation_criteria: "rows must have fare > 50".into(),
            points: 100,
        }
    }

    fn fare_rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                serde_json::json!({ "fare_amount": 51.0 + i as f64 })
                    .as_object()
                    .unwrap()
                    .clone()
            })
            .collect()
    }

    #[tokio::test]
    async fn passing_verdict_round_trips() {
        let client = Arc::new(FakeClient::scripted([
            r#"{"passed": true, "feedback": "Nailed it.", "explanation": "WHERE filtered the fares."}"#,
        ]));
        let judge = OutcomeJudge::new(client);
        let verdict = judge
            .evaluate(&challenge(), "SELECT * FROM trips WHERE fare_amount > 50", &fare_rows(2))
            .await
            .expect("verdict reached");
        assert!(verdict.passed);
        assert_eq!(verdict.feedback, "Nailed it.");
    }

    #[tokio::test]
    async fn prompt_samples_at_most_three_rows() {
        let client = Arc::new(FakeClient::scripted([
            r#"{"passed": false, "feedback": "no"}"#,
        ]));
        let judge = OutcomeJudge::new(client.clone());
        let _ = judge
            .evaluate(&challenge(), "SELECT * FROM trips", &fare_rows(10))
            .await;
        let prompt = client.prompts().pop().unwrap();
        // 3 sampled rows: fares 51, 52, 53 and nothing beyond.
        assert!(prompt.contains("51.0"));
        assert!(prompt.contains("53.0"));
        assert!(!prompt.contains("54.0"));
    }

    #[tokio::test]
    async fn service_failure_means_no_verdict_not_a_fail() {
        let judge = OutcomeJudge::new(Arc::new(FakeClient::new()));
        let verdict = judge
            .evaluate(&challenge(), "SELECT 1", &fare_rows(1))
            .await;
        assert!(verdict.is_none());
    }

    #[tokio::test]
    async fn malformed_judgment_means_no_verdict() {
        let client = Arc::new(FakeClient::scripted([r#"{"passed": "maybe"}"#]));
        let judge = OutcomeJudge::new(client);
        let verdict = judge
            .evaluate(&challenge(), "SELECT 1", &fare_rows(1))
            .await;
        assert!(verdict.is_none());
    }

    #[tokio::test]
    async fn missing_explanation_defaults_to_empty() {
        let client = Arc::new(FakeClient::scripted([
            r#"{"passed": true, "feedback": "ok"}"#,
        ]));
        let judge = OutcomeJudge::new(client);
        let verdict = judge
            .evaluate(&challenge(), "SELECT 1", &fare_rows(1))
            .await
            .unwrap();
        assert_eq!(verdict.explanation, "");
    }
}
