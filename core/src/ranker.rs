//! Dataset-wide ranking: score every account, order by risk, keep the top.
//!
//! The multiplicity pass runs once up front; the per-account detector
//! registry then fans out across accounts in parallel. Output ordering is
//! fully deterministic: score descending, account id ascending on ties.

use crate::aggregator;
use crate::assessment::{OverallAssessment, RiskAssessment};
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detector::per_account_registry;
use crate::detectors::multiplicity::MultiplicityDetector;
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::AccountId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Account left out of the ranking, with the structural reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludedAccount {
    pub account_id: AccountId,
    pub reason: String,
}

/// Result of one full mass-analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MassAnalysisReport {
    /// Highest-risk accounts, score descending, at most `top_k` entries.
    pub suspects: Vec<OverallAssessment>,
    /// Accounts that were actually scored (excluded ones do not count).
    pub total_accounts_analyzed: usize,
    /// Structurally invalid accounts dropped before scoring.
    pub excluded: Vec<ExcludedAccount>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    /// The configuration the run used, embedded for reproducibility.
    pub config: AnalysisConfig,
}

fn assess_one(
    account_id: &str,
    dataset: &AnalysisDataset,
    config: &AnalysisConfig,
    multiplicity: &BTreeMap<AccountId, RiskAssessment>,
) -> OverallAssessment {
    let mut assessments = BTreeMap::new();
    for detector in per_account_registry() {
        assessments.insert(
            detector.name().to_string(),
            detector.assess(account_id, dataset, config),
        );
    }
    let multiplicity_assessment = multiplicity.get(account_id).cloned().unwrap_or_else(|| {
        RiskAssessment::insufficient_data(
            "multiplicity",
            &config.thresholds,
            "Account record not found; multiplicity not evaluated",
        )
    });
    assessments.insert("multiplicity".to_string(), multiplicity_assessment);
    aggregator::aggregate(account_id, assessments, config, dataset.reference_time())
}

/// Scores one account end to end.
///
/// Errors with [`AnalysisError::UnknownAccount`] when the id is not in the
/// dataset and [`AnalysisError::InvalidAccount`] when the account was
/// structurally excluded at load time.
pub fn analyze_account(
    account_id: &str,
    dataset: &AnalysisDataset,
    config: &AnalysisConfig,
) -> AnalysisResult<OverallAssessment> {
    config.validate()?;
    if let Some((_, reason)) = dataset
        .invalid_accounts()
        .iter()
        .find(|(id, _)| id == account_id)
    {
        return Err(AnalysisError::InvalidAccount {
            id: account_id.to_string(),
            reason: reason.clone(),
        });
    }
    if dataset.account(account_id).is_none() {
        return Err(AnalysisError::UnknownAccount {
            id: account_id.to_string(),
        });
    }
    let multiplicity = MultiplicityDetector::evaluate(dataset, config);
    Ok(assess_one(account_id, dataset, config, &multiplicity))
}

/// Scores every valid account, ranks them, keeps the `top_k` riskiest.
///
/// Configuration problems and an account-free dataset are fatal; a
/// structurally invalid account is not, it lands in `excluded` and the run
/// carries on.
pub fn mass_analysis(
    dataset: &AnalysisDataset,
    config: &AnalysisConfig,
    top_k: usize,
) -> AnalysisResult<MassAnalysisReport> {
    config.validate()?;

    // Already warned about at dataset build; here they only go on record.
    let excluded: Vec<ExcludedAccount> = dataset
        .invalid_accounts()
        .iter()
        .map(|(id, reason)| ExcludedAccount {
            account_id: id.clone(),
            reason: reason.clone(),
        })
        .collect();

    let account_ids = dataset.valid_account_ids();
    if account_ids.is_empty() {
        return Err(AnalysisError::EmptyDataset(
            "no structurally valid accounts to analyze".to_string(),
        ));
    }

    let multiplicity = MultiplicityDetector::evaluate(dataset, config);

    let mut scored: Vec<OverallAssessment> = account_ids
        .par_iter()
        .map(|id| assess_one(id, dataset, config, &multiplicity))
        .collect();

    let total = scored.len();
    scored.sort_by(|a, b| {
        b.overall_score
            .cmp(&a.overall_score)
            .then_with(|| a.account_id.cmp(&b.account_id))
    });
    scored.truncate(top_k);

    log::info!(
        "mass analysis complete: analyzed={total} excluded={} suspects={}",
        excluded.len(),
        scored.len()
    );

    Ok(MassAnalysisReport {
        suspects: scored,
        total_accounts_analyzed: total,
        excluded,
        generated_at: dataset.reference_time(),
        config: config.clone(),
    })
}
