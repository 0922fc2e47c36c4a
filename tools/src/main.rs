//! amlrank-runner: batch AML risk analysis over a JSON dataset file.
//!
//! Usage:
//!   amlrank-runner --input dataset.json --top-k 25 --output report.json
//!   amlrank-runner --input dataset.json --config config.json --account acct-17

use amlrank_core::{
    export, mass_analysis, Account, AnalysisConfig, AnalysisDataset, Partner, Transaction,
};
use anyhow::{Context, Result};
use std::env;
use std::path::Path;

/// On-disk input shape: the three record collections in one document.
#[derive(serde::Deserialize)]
struct DatasetFile {
    transactions: Vec<Transaction>,
    accounts: Vec<Account>,
    partners: Vec<Partner>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(input) = find_arg(&args, "--input") else {
        eprintln!("usage: amlrank-runner --input <dataset.json> [--config <config.json>] [--top-k N] [--output <report.json>] [--account <id>]");
        std::process::exit(2);
    };
    let top_k = parse_top_k(&args)?;
    let output = find_arg(&args, "--output");
    let single_account = find_arg(&args, "--account");

    let config = match find_arg(&args, "--config") {
        Some(path) => AnalysisConfig::load(path).with_context(|| format!("loading {path}"))?,
        None => AnalysisConfig::default_illustrative(),
    };

    let raw = std::fs::read_to_string(input).with_context(|| format!("reading {input}"))?;
    let file: DatasetFile = serde_json::from_str(&raw).with_context(|| format!("parsing {input}"))?;
    log::info!(
        "input={input} transactions={} accounts={} partners={}",
        file.transactions.len(),
        file.accounts.len(),
        file.partners.len()
    );

    let dataset = AnalysisDataset::build(file.transactions, file.accounts, file.partners)?;
    if dataset.dropped_transactions() > 0 {
        log::warn!(
            "dropped_transactions={} (invalid amounts)",
            dataset.dropped_transactions()
        );
    }

    if let Some(account_id) = single_account {
        let assessment = amlrank_core::ranker::analyze_account(account_id, &dataset, &config)?;
        println!("{}", export::assessment_to_json(&assessment)?);
        return Ok(());
    }

    let report = mass_analysis(&dataset, &config, top_k)?;

    if let Some(path) = output {
        export::write_report(&report, Path::new(path))?;
        println!("report written to {path}");
    } else {
        println!("{}", export::report_to_json(&report)?);
    }

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &amlrank_core::MassAnalysisReport) {
    eprintln!("=== MASS ANALYSIS SUMMARY ===");
    eprintln!("  analyzed:  {}", report.total_accounts_analyzed);
    eprintln!("  excluded:  {}", report.excluded.len());
    eprintln!("  suspects:  {}", report.suspects.len());
    for suspect in report.suspects.iter().take(10) {
        eprintln!(
            "  {:>3} {:<8?} {}",
            suspect.overall_score, suspect.overall_level, suspect.account_id
        );
    }
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// A malformed `--top-k` is a usage error, not a silent fallback to the
/// default of 25.
fn parse_top_k(args: &[String]) -> Result<usize> {
    match find_arg(args, "--top-k") {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid --top-k value '{raw}', expected a non-negative integer")),
        None => Ok(25),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_top_k;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn top_k_defaults_when_absent() {
        assert_eq!(parse_top_k(&args(&["amlrank-runner", "--input", "d.json"])).unwrap(), 25);
    }

    #[test]
    fn top_k_parses_an_explicit_value() {
        assert_eq!(parse_top_k(&args(&["x", "--top-k", "7"])).unwrap(), 7);
    }

    #[test]
    fn malformed_top_k_is_a_usage_error() {
        let err = parse_top_k(&args(&["x", "--top-k", "abc"])).unwrap_err();
        assert!(err.to_string().contains("--top-k"), "error must name the flag: {err}");
    }
}
