//! Irregularity feature: dispersion of the account's own rhythm.
//!
//! Coefficients of variation over inter-transaction time gaps and over
//! successive amount deltas. The account is compared against its own
//! history, not a population norm.

use crate::assessment::RiskAssessment;
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detector::FeatureDetector;
use crate::stats;

pub struct IrregularityDetector;

const MIN_SAMPLE: usize = 3;

impl FeatureDetector for IrregularityDetector {
    fn name(&self) -> &'static str {
        "irregularity"
    }

    fn assess(
        &self,
        account_id: &str,
        dataset: &AnalysisDataset,
        config: &AnalysisConfig,
    ) -> RiskAssessment {
        let txns = dataset.account_transactions(account_id);
        if txns.len() < MIN_SAMPLE {
            return RiskAssessment::insufficient_data(
                self.name(),
                &config.thresholds,
                "Fewer than three transactions; no rhythm to measure",
            );
        }

        // Gaps in hours between consecutive transactions (sorted order).
        let gaps: Vec<f64> = txns
            .windows(2)
            .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds() as f64 / 3600.0)
            .collect();
        let cv_gaps = stats::coefficient_of_variation(&gaps);

        let deltas: Vec<f64> = txns
            .windows(2)
            .map(|pair| (pair[1].amount - pair[0].amount).abs())
            .collect();
        let cv_deltas = stats::coefficient_of_variation(&deltas);

        let score = stats::clamp_score(cv_gaps * 25.0 + cv_deltas * 25.0);

        let mut assessment = RiskAssessment::new(self.name(), score, &config.thresholds)
            .with_metric("total_transactions", txns.len())
            .with_metric("cv_time_gaps", (cv_gaps * 1000.0).round() / 1000.0)
            .with_metric("cv_amount_deltas", (cv_deltas * 1000.0).round() / 1000.0);

        if cv_gaps > 1.5 {
            assessment = assessment.with_reason(format!(
                "Highly irregular transaction timing (gap CV {cv_gaps:.2})"
            ));
        }
        if cv_deltas > 1.5 {
            assessment = assessment.with_reason(format!(
                "Highly variable amount jumps between consecutive transactions (delta CV {cv_deltas:.2})"
            ));
        }
        if assessment.reasons.is_empty() {
            assessment = assessment.with_reason(format!(
                "Timing and amount patterns consistent with the account's own history (gap CV {cv_gaps:.2}, delta CV {cv_deltas:.2})"
            ));
        }

        assessment
    }
}
