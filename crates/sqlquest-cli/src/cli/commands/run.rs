use crate::exit_codes;
use anyhow::{Context, Result};
use sqlquest_core::catalog::Catalog;
use sqlquest_core::model::Challenge;
use sqlquest_core::pipeline::{QueryPipeline, QueryStatus};
use std::path::Path;

/// What the fixture engine answers in offline mode: a small, plausible
/// result so `run --offline` shows the whole flow without a network.
const OFFLINE_ENGINE_FIXTURE: &str = r#"{
  "columns": ["pickup_datetime", "fare_amount", "payment_type"],
  "rows": [
    { "pickup_datetime": "2024-03-14T08:12:44Z", "fare_amount": 62.5, "payment_type": "credit_card" },
    { "pickup_datetime": "2024-03-14T09:03:10Z", "fare_amount": 71.0, "payment_type": "cash" },
    { "pickup_datetime": "2024-03-14T11:47:02Z", "fare_amount": 55.25, "payment_type": "credit_card" }
  ],
  "totalRowCount": 14502,
  "bytesProcessed": 524288,
  "durationMs": 230
}"#;

pub async fn execute(
    catalog: &Catalog,
    dataset_id: &str,
    challenge_path: Option<&Path>,
    json: bool,
    offline: bool,
    query: &str,
) -> Result<i32> {
    let dataset = super::resolve_dataset(catalog, dataset_id)?;

    let challenge: Option<Challenge> = match challenge_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read challenge {}", path.display()))?;
            Some(serde_json::from_str(&raw).context("challenge file is not valid JSON")?)
        }
        None => None,
    };

    let client = super::build_client(offline, Some(OFFLINE_ENGINE_FIXTURE))?;
    let pipeline = QueryPipeline::new(client);

    let outcome = pipeline.execute(query, dataset, challenge.as_ref()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if let Some(error) = &outcome.result.error {
        eprintln!("error: {error}");
    } else {
        println!("columns: {}", outcome.result.columns.join(", "));
        for row in &outcome.result.rows {
            println!("{}", serde_json::to_string(row)?);
        }
        println!(
            "-- {} rows shown of ~{} total | {} bytes | {} ms | est. ${:.6}",
            outcome.result.rows.len(),
            outcome.result.total_row_count,
            outcome.result.bytes_processed,
            outcome.result.duration_ms,
            outcome.result.cost_estimate,
        );
        match &outcome.verdict {
            Some(v) if v.passed => {
                println!("PASSED: {}", v.feedback);
                if !v.explanation.is_empty() {
                    println!("why: {}", v.explanation);
                }
            }
            Some(v) => {
                println!("FAILED: {}", v.feedback);
                if !v.explanation.is_empty() {
                    println!("why: {}", v.explanation);
                }
            }
            None if challenge.is_some() => {
                println!("(no verdict reached; the result above still stands)");
            }
            None => {}
        }
    }

    Ok(match outcome.status {
        QueryStatus::Success => exit_codes::OK,
        QueryStatus::Error | QueryStatus::Blocked => exit_codes::QUERY_ERROR,
    })
}
