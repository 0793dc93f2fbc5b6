//! Orchestration of a single query run: safety gate, simulated execution,
//! then judgment when a challenge is active. One logical request per
//! invocation; no state shared between runs.

use crate::engine::QueryEngine;
use crate::judge::OutcomeJudge;
use crate::model::{Challenge, Dataset, QueryResult, Verdict};
use crate::providers::llm::LlmClient;
use crate::safety::{self, BLOCKED_MESSAGE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Success,
    Error,
    Blocked,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub result: QueryResult,
    /// Absent when no challenge was active, the run errored, or the judge
    /// was unreachable. Only `Some` carries a real pass/fail.
    pub verdict: Option<Verdict>,
    pub status: QueryStatus,
}

pub struct QueryPipeline {
    engine: QueryEngine,
    judge: OutcomeJudge,
}

impl QueryPipeline {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            engine: QueryEngine::new(client.clone()),
            judge: OutcomeJudge::new(client),
        }
    }

    pub async fn execute(
        &self,
        query: &str,
        dataset: &Dataset,
        challenge: Option<&Challenge>,
    ) -> QueryOutcome {
        let gate = safety::check(query);
        if gate.blocked {
            tracing::warn!(
                "query blocked: {}",
                gate.reason.as_deref().unwrap_or("deny-list match")
            );
            return QueryOutcome {
                result: QueryResult::failed(BLOCKED_MESSAGE),
                verdict: None,
                status: QueryStatus::Blocked,
            };
        }

        let result = self.engine.run(query, dataset).await;

        let verdict = match (challenge, result.is_error()) {
            (Some(challenge), false) => self.judge.evaluate(challenge, query, &result.rows).await,
            _ => None,
        };

        let status = if result.is_error() {
            QueryStatus::Error
        } else {
            QueryStatus::Success
        };

        QueryOutcome {
            result,
            verdict,
            status,
        }
    }
}
