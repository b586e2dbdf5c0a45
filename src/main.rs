use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::info;
use wound_coverage::models::PolicyCandidate;
use wound_coverage::utils::init_logging;
use wound_coverage::{
    CoverageConfig, EpisodeCase, InMemoryPolicyStore, InMemoryTelemetry, PolicySelector,
    PreEligibilityOrchestrator,
};

/// Pre-eligibility evaluation of wound-care episodes
#[derive(Parser, Debug)]
#[command(name = "wound-coverage")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON array of episodes with their encounters
    cases: PathBuf,

    /// Path to a JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of candidate policies to select from
    #[arg(long, requires = "jurisdiction")]
    policies: Option<PathBuf>,

    /// MAC jurisdiction code used for policy selection
    #[arg(long, requires = "policies")]
    jurisdiction: Option<String>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => CoverageConfig::from_path(path)?,
        None => CoverageConfig::default(),
    };
    info!("{config}");

    let cases: Vec<EpisodeCase> = read_json(&args.cases)?;
    info!("Loaded {} episodes from {}", cases.len(), args.cases.display());

    let orchestrator = PreEligibilityOrchestrator::new(config.clone());
    let start = Instant::now();

    let results = match (&args.policies, &args.jurisdiction) {
        (Some(policies), Some(jurisdiction)) => {
            let candidates: Vec<PolicyCandidate> = read_json(policies)?;
            let store = InMemoryPolicyStore::default();
            for candidate in candidates {
                store.insert(candidate).await;
            }
            let telemetry = Arc::new(InMemoryTelemetry::new());
            let selector =
                PolicySelector::new(Arc::new(store), telemetry.clone(), config.selection.clone());

            let mut results = Vec::with_capacity(cases.len());
            for case in &cases {
                results.push(
                    orchestrator
                        .perform_with_policy_selection(
                            &case.episode,
                            &case.encounters,
                            &selector,
                            jurisdiction,
                        )
                        .await?,
                );
            }
            info!("Selection telemetry: {:?}", telemetry.snapshot());
            results
        }
        _ => orchestrator.evaluate_batch(&cases),
    };

    info!(
        "Evaluated {} episodes in {:?}",
        results.len(),
        start.elapsed()
    );
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from([
            "wound-coverage",
            "cases.json",
            "--policies",
            "lcds.json",
            "--jurisdiction",
            "J5",
        ])
        .unwrap();
        assert_eq!(cli.cases, PathBuf::from("cases.json"));
        assert_eq!(cli.jurisdiction.as_deref(), Some("J5"));
        assert!(cli.config.is_none());

        assert!(Cli::try_parse_from(["wound-coverage"]).is_err());
        assert!(Cli::try_parse_from(["wound-coverage", "cases.json", "--policies", "lcds.json"]).is_err());
    }
}
