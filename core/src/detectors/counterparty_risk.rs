//! Counterparty risk feature: aggregated risk categories of the distinct
//! partners the account transacted with.
//!
//! Contamination rule, not a pure average: a single sanctioned-adjacent
//! partner sets a floor score and the contamination flag regardless of
//! transaction volume.

use crate::assessment::RiskAssessment;
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detector::FeatureDetector;
use crate::model::RiskCategory;
use crate::stats;
use std::collections::BTreeMap;

pub struct CounterpartyRiskDetector;

const SANCTIONED_FLOOR: f64 = 85.0;

impl FeatureDetector for CounterpartyRiskDetector {
    fn name(&self) -> &'static str {
        "counterparty_risk"
    }

    fn assess(
        &self,
        account_id: &str,
        dataset: &AnalysisDataset,
        config: &AnalysisConfig,
    ) -> RiskAssessment {
        let txns = dataset.account_transactions(account_id);
        if txns.is_empty() {
            return RiskAssessment::insufficient_data(
                self.name(),
                &config.thresholds,
                "No transactions on record; counterparty risk not evaluated",
            );
        }

        // Distinct partners reachable through internal counterparty
        // accounts. External counterparties have no partner record; they
        // count as unresolved and reduce confidence, not as errors.
        let mut partners: BTreeMap<&str, RiskCategory> = BTreeMap::new();
        let mut sanctioned_names: Vec<&str> = Vec::new();
        let mut unresolved = 0usize;
        for txn in &txns {
            match dataset.counterparty_partner(account_id, txn) {
                Some(partner) => {
                    if partners
                        .insert(partner.id.as_str(), partner.risk_category)
                        .is_none()
                        && partner.risk_category == RiskCategory::SanctionedAdjacent
                    {
                        sanctioned_names.push(partner.name.as_str());
                    }
                }
                None => unresolved += 1,
            }
        }

        if partners.is_empty() {
            return RiskAssessment::new(self.name(), 0, &config.thresholds)
                .with_reason(
                    "No counterparty could be resolved to a partner record; confidence reduced"
                        .into(),
                )
                .with_metric("distinct_partners", 0)
                .with_metric("unresolved_counterparties", unresolved);
        }

        let total = partners.len();
        let elevated = partners
            .values()
            .filter(|c| **c == RiskCategory::Elevated)
            .count();
        let sanctioned = partners
            .values()
            .filter(|c| **c == RiskCategory::SanctionedAdjacent)
            .count();
        let elevated_fraction = elevated as f64 / total as f64;

        let base = (elevated as f64 * 15.0 + elevated_fraction * 30.0).min(100.0);
        let contaminated = sanctioned > 0;
        let score = if contaminated {
            stats::clamp_score(base.max(SANCTIONED_FLOOR))
        } else {
            stats::clamp_score(base)
        };

        let mut assessment = RiskAssessment::new(self.name(), score, &config.thresholds)
            .with_metric("distinct_partners", total)
            .with_metric("elevated_partners", elevated)
            .with_metric("sanctioned_adjacent_partners", sanctioned)
            .with_metric("unresolved_counterparties", unresolved);

        if contaminated {
            assessment = assessment.mark_contaminated().with_reason(format!(
                "Transacted with sanctioned-adjacent partner(s): {}",
                sanctioned_names.join(", ")
            ));
        }
        if elevated > 0 {
            assessment = assessment.with_reason(format!(
                "{elevated} of {total} distinct counterpart(ies) carry elevated risk"
            ));
        }
        if assessment.reasons.is_empty() {
            assessment = assessment
                .with_reason("All resolved counterparties carry standard risk".into());
        }
        if unresolved > 0 {
            assessment = assessment.with_reason(format!(
                "{unresolved} counterpart(ies) could not be resolved to partner records; confidence reduced"
            ));
        }

        assessment
    }
}
