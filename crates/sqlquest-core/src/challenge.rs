//! Procedural challenge generation, bounded by a per-tier constraint policy.

use crate::decode;
use crate::errors::{DecodeError, GenerationError};
use crate::model::{Challenge, Dataset, Difficulty};
use crate::providers::llm::LlmClient;
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Business-role framings rotated into the prompt so challenges read as real
/// requests instead of "select X".
const SCENARIOS: [&str; 8] = [
    "Fraud Detection Specialist",
    "Marketing Analytics Manager",
    "Product Growth Lead",
    "Financial Auditor",
    "Data Quality Engineer",
    "Customer Success Ops",
    "Supply Chain Logistican",
    "Compliance Officer",
];

pub const HINT_COUNT: usize = 3;

/// One tier's constraint policy: the SQL feature set a generated challenge
/// may require, and where its points land. Adding a tier means adding an
/// entry here, nothing else.
#[derive(Debug)]
pub struct DifficultyPolicy {
    pub tier: Difficulty,
    pub min_points: u32,
    pub max_points: u32,
    /// Verbatim prompt block pinning the feature set.
    pub constraints: &'static str,
}

pub static POLICIES: [DifficultyPolicy; 3] = [
    DifficultyPolicy {
        tier: Difficulty::Beginner,
        min_points: 50,
        max_points: 150,
        constraints: "STRICT CONSTRAINT: BEGINNER LEVEL ONLY.\n\
            - ABSOLUTELY NO JOINs.\n\
            - ABSOLUTELY NO GROUP BY or AGGREGATE FUNCTIONS (COUNT, SUM, AVG).\n\
            - ABSOLUTELY NO SUBQUERIES.\n\
            - Task MUST be solvable with: SELECT [columns] FROM [table] WHERE [simple_condition] ORDER BY [column] LIMIT [n].\n\
            - Keep logic very simple: \"Find trips where fare is > 50\" or \"List users from Canada\".",
    },
    DifficultyPolicy {
        tier: Difficulty::Intermediate,
        min_points: 150,
        max_points: 300,
        constraints: "STRICT CONSTRAINT: INTERMEDIATE LEVEL.\n\
            - MUST use basic Aggregation (COUNT, SUM, AVG, MIN, MAX) with GROUP BY.\n\
            - OR use INNER/LEFT JOIN between two tables.\n\
            - Goal: Reporting and summarization.",
    },
    DifficultyPolicy {
        tier: Difficulty::Advanced,
        min_points: 300,
        max_points: 500,
        constraints: "STRICT CONSTRAINT: ADVANCED LEVEL.\n\
            - MUST use Window Functions (ROW_NUMBER, LEAD, LAG) OR CTEs (WITH clause).\n\
            - OR use Complex Multi-Joins (3+ tables).\n\
            - OR use Subqueries in WHERE or HAVING.\n\
            - Goal: Complex analytical reasoning or cleaning.",
    },
];

impl Difficulty {
    pub fn policy(&self) -> &'static DifficultyPolicy {
        match self {
            Difficulty::Beginner => &POLICIES[0],
            Difficulty::Intermediate => &POLICIES[1],
            Difficulty::Advanced => &POLICIES[2],
        }
    }
}

/// Shape the service is asked to fill in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeDraft {
    title: String,
    description: String,
    hints: Vec<String>,
    validation_criteria: String,
    points: u32,
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "description": { "type": "STRING" },
            "hints": { "type": "ARRAY", "items": { "type": "STRING" } },
            "validationCriteria": { "type": "STRING" },
            "points": { "type": "INTEGER" }
        },
        "required": ["title", "description", "hints", "validationCriteria", "points"]
    })
}

pub(crate) fn build_generation_prompt(
    dataset: &Dataset,
    difficulty: Difficulty,
    scenario: &str,
) -> String {
    format!(
        "You are a Senior SQL Instructor acting as a {scenario}.\n\
         Your goal is to create a realistic business challenge for a junior analyst using the provided dataset.\n\n\
         Dataset: {name}\n\
         Difficulty: {difficulty}\n\n\
         {constraints}\n\n\
         Schema:\n{schema}\n\n\
         Create a unique SQL challenge.\n\
         1. The 'title' should be catchy and related to the scenario (e.g. \"Suspicious Fares\", \"Viral Post Analysis\").\n\
         2. The 'description' should be a clear business question requesting data. Do not just say \"Select X\", say \"The marketing team needs...\" or \"We found a bug...\".\n\
         3. Provide 3 progressive 'hints'.\n\
            - Hint 1: Conceptual (What fields to look at).\n\
            - Hint 2: Structural (Keywords to use).\n\
            - Hint 3: Partial Syntax (e.g. \"Try using WHERE payment_type = ...\").\n\
         4. Define 'validationCriteria' describing what the result set should contain.\n\
         5. Set 'points' between {min_points} and {max_points} based on difficulty.\n\n\
         Response must be JSON.",
        name = dataset.name,
        constraints = difficulty.policy().constraints,
        schema = dataset.schema_inventory(),
        min_points = difficulty.policy().min_points,
        max_points = difficulty.policy().max_points,
    )
}

/// The hardcoded challenge handed out when the service fails. A quest must
/// always be playable, so this path can never error.
pub fn fallback_challenge(dataset: &Dataset, difficulty: Difficulty) -> Challenge {
    Challenge {
        id: Uuid::new_v4().to_string(),
        dataset_id: dataset.id.clone(),
        difficulty,
        title: "Data Exploration 101".to_string(),
        description: "We need to verify the integrity of our main table. Select the first 10 rows to inspect the data formats.".to_string(),
        hints: vec![
            "Every column can come back at once; you do not need to name them.".to_string(),
            "Use SELECT * and cap the result with LIMIT.".to_string(),
            "Try: SELECT * FROM <table> LIMIT 10".to_string(),
        ],
        validation_criteria: "Returns 10 rows from the primary table.".to_string(),
        points: 50,
    }
}

pub struct ChallengeGenerator {
    client: Arc<dyn LlmClient>,
}

impl ChallengeGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Generate a challenge for the dataset at the given tier. Never fails:
    /// service or decode trouble degrades to [`fallback_challenge`].
    pub async fn generate(&self, dataset: &Dataset, difficulty: Difficulty) -> Challenge {
        match self.try_generate(dataset, difficulty).await {
            Ok(challenge) => challenge,
            Err(e) => {
                tracing::warn!("challenge generation failed, using fallback: {e}");
                fallback_challenge(dataset, difficulty)
            }
        }
    }

    async fn try_generate(
        &self,
        dataset: &Dataset,
        difficulty: Difficulty,
    ) -> Result<Challenge, GenerationError> {
        let scenario = SCENARIOS[rand::thread_rng().gen_range(0..SCENARIOS.len())];
        let prompt = build_generation_prompt(dataset, difficulty, scenario);
        let resp = self.client.complete(&prompt, Some(&response_schema())).await?;
        let draft: ChallengeDraft = decode::extract_as(&resp.text)?;

        if draft.hints.len() < HINT_COUNT {
            return Err(DecodeError::MissingField("hints").into());
        }
        let mut hints = draft.hints;
        hints.truncate(HINT_COUNT);

        let policy = difficulty.policy();
        Ok(Challenge {
            id: Uuid::new_v4().to_string(),
            dataset_id: dataset.id.clone(),
            difficulty,
            title: draft.title,
            description: draft.description,
            hints,
            validation_criteria: draft.validation_criteria,
            points: draft.points.clamp(policy.min_points, policy.max_points),
        })
    }
}
