use clap::{Parser, Subcommand};
use sqlquest_core::model::Difficulty;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sqlquest",
    version,
    about = "Procedural SQL challenges against simulated public datasets"
)]
pub struct Cli {
    /// Path to a YAML dataset catalog (defaults to the built-in one).
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the datasets available for quests.
    Datasets,

    /// Generate a challenge for a dataset.
    Challenge {
        /// Dataset id (see `sqlquest datasets`).
        #[arg(long)]
        dataset: String,

        #[arg(long, default_value = "beginner")]
        difficulty: Difficulty,

        /// Emit the challenge as JSON (reusable via `run --challenge`).
        #[arg(long)]
        json: bool,

        /// Use the offline fixture provider; no API key needed.
        #[arg(long)]
        offline: bool,
    },

    /// Run a query through the safety gate and the simulated engine.
    Run {
        /// Dataset id the query targets.
        #[arg(long)]
        dataset: String,

        /// Active challenge to grade against, as written by `challenge --json`.
        #[arg(long)]
        challenge: Option<PathBuf>,

        /// Emit the full outcome as JSON.
        #[arg(long)]
        json: bool,

        /// Use the offline fixture provider; no API key needed.
        #[arg(long)]
        offline: bool,

        /// The SQL text to execute.
        query: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_parses_query_and_flags() {
        let cli = Cli::try_parse_from([
            "sqlquest",
            "run",
            "--dataset",
            "nyc-taxi",
            "--offline",
            "SELECT * FROM trips LIMIT 5",
        ])
        .unwrap();
        match cli.command {
            Command::Run {
                dataset,
                offline,
                query,
                ..
            } => {
                assert_eq!(dataset, "nyc-taxi");
                assert!(offline);
                assert_eq!(query, "SELECT * FROM trips LIMIT 5");
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn challenge_difficulty_defaults_to_beginner() {
        let cli =
            Cli::try_parse_from(["sqlquest", "challenge", "--dataset", "hacker_news"]).unwrap();
        match cli.command {
            Command::Challenge { difficulty, .. } => {
                assert_eq!(difficulty, Difficulty::Beginner);
            }
            _ => panic!("expected challenge"),
        }
    }

    #[test]
    fn bad_difficulty_is_rejected() {
        let err = Cli::try_parse_from([
            "sqlquest",
            "challenge",
            "--dataset",
            "nyc-taxi",
            "--difficulty",
            "expert",
        ]);
        assert!(err.is_err());
    }
}
