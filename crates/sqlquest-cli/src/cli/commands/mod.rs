mod challenge;
mod datasets;
mod run;

use crate::cli::args::{Cli, Command};
use anyhow::{anyhow, Result};
use sqlquest_core::catalog::Catalog;
use sqlquest_core::providers::llm::{FakeClient, GeminiClient, LlmClient};
use std::sync::Arc;

pub async fn dispatch(cli: Cli) -> Result<i32> {
    let catalog = match &cli.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };

    match cli.command {
        Command::Datasets => datasets::execute(&catalog),
        Command::Challenge {
            dataset,
            difficulty,
            json,
            offline,
        } => challenge::execute(&catalog, &dataset, difficulty, json, offline).await,
        Command::Run {
            dataset,
            challenge,
            json,
            offline,
            query,
        } => run::execute(&catalog, &dataset, challenge.as_deref(), json, offline, &query).await,
    }
}

/// Live Gemini client, or the scripted fixture in offline mode. `fixture`
/// is what the fixture answers with; commands pick something stage-shaped.
pub(crate) fn build_client(
    offline: bool,
    fixture: Option<&str>,
) -> Result<Arc<dyn LlmClient>> {
    if offline {
        return Ok(match fixture {
            Some(text) => Arc::new(FakeClient::with_response(text)),
            None => Arc::new(FakeClient::new()),
        });
    }
    let key = std::env::var("GEMINI_API_KEY").map_err(|_| {
        anyhow!("GEMINI_API_KEY is not set (use --offline for the fixture provider)")
    })?;
    Ok(Arc::new(GeminiClient::new(key)))
}

pub(crate) fn resolve_dataset<'a>(
    catalog: &'a Catalog,
    id: &str,
) -> Result<&'a sqlquest_core::model::Dataset> {
    catalog.get(id).ok_or_else(|| {
        anyhow!("unknown dataset '{id}' (run `sqlquest datasets` to list the catalog)")
    })
}
