//! Value objects flowing through the quest pipeline. Every stage produces a
//! fresh record consumed by the next; nothing here is shared mutable state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single result row: column name to scalar (or null).
pub type Row = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "Beginner"),
            Difficulty::Intermediate => write!(f, "Intermediate"),
            Difficulty::Advanced => write!(f, "Advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!(
                "unknown difficulty '{other}' (expected beginner, intermediate or advanced)"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

/// Static description of a public dataset: the universe of table and column
/// names a query may reference. Supplied by the catalog, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tables: Vec<TableSchema>,
}

impl Dataset {
    /// Render the table/column inventory the way prompts embed it:
    /// one `Table: <name>` block per table with typed column lists.
    pub fn schema_inventory(&self) -> String {
        self.tables
            .iter()
            .map(|t| {
                let cols = t
                    .columns
                    .iter()
                    .map(|c| format!("{} ({})", c.name, c.column_type))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Table: {}\nColumns: {}", t.name, cols)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub dataset_id: String,
    pub difficulty: Difficulty,
    pub title: String,
    pub description: String,
    /// Exactly 3, escalating: conceptual, structural, syntactic.
    pub hints: Vec<String>,
    /// Natural-language grading instructions for the judge.
    pub validation_criteria: String,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub duration_ms: u64,
    pub bytes_processed: u64,
    /// Estimated rows the query would return against the full-scale dataset.
    pub total_row_count: u64,
    /// USD. Derived locally from `bytes_processed`, never by the engine.
    pub cost_estimate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// A terminal error result. All numeric fields zero, no rows: `error`
    /// and populated `rows` are mutually exclusive by construction.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            duration_ms: 0,
            bytes_processed: 0,
            total_row_count: 0,
            cost_estimate: 0.0,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Pass/fail judgment for a submitted query against the active challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    pub feedback: String,
    /// Teaching moment on success, concept gap on failure.
    #[serde(default)]
    pub explanation: String,
}
