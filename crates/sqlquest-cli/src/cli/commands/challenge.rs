use crate::exit_codes;
use anyhow::Result;
use sqlquest_core::catalog::Catalog;
use sqlquest_core::challenge::ChallengeGenerator;
use sqlquest_core::model::Difficulty;

pub async fn execute(
    catalog: &Catalog,
    dataset_id: &str,
    difficulty: Difficulty,
    json: bool,
    offline: bool,
) -> Result<i32> {
    let dataset = super::resolve_dataset(catalog, dataset_id)?;
    // Offline: the empty fixture makes the generator take its fallback
    // path, which is exactly the deterministic demo we want.
    let client = super::build_client(offline, None)?;
    let generator = ChallengeGenerator::new(client);

    let challenge = generator.generate(dataset, difficulty).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&challenge)?);
        return Ok(exit_codes::OK);
    }

    println!("{} [{} pts, {}]", challenge.title, challenge.points, challenge.difficulty);
    println!();
    println!("{}", challenge.description);
    println!();
    for (i, hint) in challenge.hints.iter().enumerate() {
        println!("hint {}: {}", i + 1, hint);
    }
    println!();
    println!("graded on: {}", challenge.validation_criteria);
    Ok(exit_codes::OK)
}
