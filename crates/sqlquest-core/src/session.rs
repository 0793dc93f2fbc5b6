//! Quest state for one player session: the active challenge, XP accrual,
//! and a per-query log. Nothing here persists; records are value objects the
//! caller may store or drop.

use crate::challenge::ChallengeGenerator;
use crate::model::{Challenge, Dataset, Difficulty};
use crate::pipeline::{QueryOutcome, QueryPipeline, QueryStatus};
use crate::providers::llm::LlmClient;
use serde::Serialize;
use std::sync::Arc;

pub const XP_PER_LEVEL: u64 = 1000;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryLogEntry {
    pub query: String,
    pub status: QueryStatus,
    pub bytes_processed: u64,
    pub dataset_id: String,
    pub difficulty: Difficulty,
    pub timestamp: String,
}

pub struct QuestSession {
    pipeline: QueryPipeline,
    generator: ChallengeGenerator,
    dataset: Dataset,
    difficulty: Difficulty,
    challenge: Option<Challenge>,
    xp: u64,
    completed: Vec<String>,
    log: Vec<QueryLogEntry>,
}

impl QuestSession {
    pub fn new(client: Arc<dyn LlmClient>, dataset: Dataset, difficulty: Difficulty) -> Self {
        Self {
            pipeline: QueryPipeline::new(client.clone()),
            generator: ChallengeGenerator::new(client),
            dataset,
            difficulty,
            challenge: None,
            xp: 0,
            completed: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Generate the next challenge and make it active. Used both to start a
    /// quest and to advance after a pass; generation never dead-ends (the
    /// generator falls back internally).
    pub async fn advance(&mut self) -> &Challenge {
        let challenge = self
            .generator
            .generate(&self.dataset, self.difficulty)
            .await;
        self.challenge.insert(challenge)
    }

    /// Run one query through the pipeline. On a passing verdict the active
    /// challenge's points are banked and the slot clears; call
    /// [`QuestSession::advance`] for the next one.
    pub async fn run_query(&mut self, query: &str) -> QueryOutcome {
        let outcome = self
            .pipeline
            .execute(query, &self.dataset, self.challenge.as_ref())
            .await;

        self.log.push(QueryLogEntry {
            query: query.to_string(),
            status: outcome.status,
            bytes_processed: outcome.result.bytes_processed,
            dataset_id: self.dataset.id.clone(),
            difficulty: self.difficulty,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });

        if outcome.verdict.as_ref().is_some_and(|v| v.passed) {
            if let Some(done) = self.challenge.take() {
                self.xp += u64::from(done.points);
                self.completed.push(done.id);
            }
        }

        outcome
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn level(&self) -> u64 {
        self.xp / XP_PER_LEVEL + 1
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn history(&self) -> &[QueryLogEntry] {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::providers::llm::FakeClient;

    fn taxi() -> Dataset {
        Catalog::builtin().get("nyc-taxi").unwrap().clone()
    }

    fn challenge_json() -> String {
        serde_json::json!({
            "title": "Suspicious Fares",
            "description": "Pull up the expensive trips.",
            "hints": ["h1", "h2", "h3"],
            "validationCriteria": "rows must have fare > 50",
            "points": 120,
        })
        .to_string()
    }

    fn engine_json() -> String {
        serde_json::json!({
            "columns": ["fare_amount"],
            "rows": [{ "fare_amount": 62.5 }],
            "totalRowCount": 9000,
            "bytesProcessed": 4096,
            "durationMs": 210,
        })
        .to_string()
    }

    #[tokio::test]
    async fn passing_a_challenge_banks_points_and_clears_the_slot() {
        let client = Arc::new(FakeClient::scripted([
            challenge_json(),
            engine_json(),
            r#"{"passed": true, "feedback": "Correct!", "explanation": "WHERE did the work."}"#.to_string(),
        ]));
        let mut session = QuestSession::new(client, taxi(), Difficulty::Beginner);

        let id = session.advance().await.id.clone();
        let outcome = session
            .run_query("SELECT * FROM trips WHERE fare_amount > 50")
            .await;

        assert!(outcome.verdict.unwrap().passed);
        assert_eq!(session.xp(), 120);
        assert_eq!(session.completed(), &[id]);
        assert!(session.challenge().is_none());
    }

    #[tokio::test]
    async fn failing_verdict_keeps_the_challenge_and_xp() {
        let client = Arc::new(FakeClient::scripted([
            challenge_json(),
            engine_json(),
            r#"{"passed": false, "feedback": "Not yet.", "explanation": "You need a WHERE clause to filter."}"#.to_string(),
        ]));
        let mut session = QuestSession::new(client, taxi(), Difficulty::Beginner);

        session.advance().await;
        let outcome = session.run_query("SELECT * FROM trips").await;

        assert!(!outcome.verdict.unwrap().passed);
        assert_eq!(session.xp(), 0);
        assert!(session.challenge().is_some());
    }

    #[tokio::test]
    async fn level_math_matches_thousand_xp_per_level() {
        let client = Arc::new(FakeClient::new());
        let mut session = QuestSession::new(client, taxi(), Difficulty::Beginner);
        assert_eq!(session.level(), 1);
        session.xp = 2400;
        assert_eq!(session.level(), 3);
    }

    #[tokio::test]
    async fn query_log_records_status_per_run() {
        let client = Arc::new(FakeClient::scripted([engine_json()]));
        let mut session = QuestSession::new(client, taxi(), Difficulty::Intermediate);

        session.run_query("SELECT * FROM trips").await;
        session.run_query("DROP TABLE trips").await;

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, QueryStatus::Success);
        assert_eq!(history[0].bytes_processed, 4096);
        assert_eq!(history[1].status, QueryStatus::Blocked);
        assert_eq!(history[1].bytes_processed, 0);
        assert_eq!(history[1].difficulty, Difficulty::Intermediate);
    }

    #[tokio::test]
    async fn advance_survives_generator_outage_via_fallback() {
        let client = Arc::new(FakeClient::new());
        let mut session = QuestSession::new(client, taxi(), Difficulty::Beginner);
        let challenge = session.advance().await;
        assert_eq!(challenge.title, "Data Exploration 101");
    }
}
