//! Account age feature: age versus activity volume.
//!
//! New accounts moving disproportionate volume score higher. Age is
//! computed relative to the dataset reference time (the latest transaction
//! timestamp), never the wall clock, so historical datasets score
//! identically on every run.

use crate::assessment::RiskAssessment;
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detector::FeatureDetector;
use crate::stats;

pub struct AccountAgeDetector;

impl FeatureDetector for AccountAgeDetector {
    fn name(&self) -> &'static str {
        "account_age"
    }

    fn assess(
        &self,
        account_id: &str,
        dataset: &AnalysisDataset,
        config: &AnalysisConfig,
    ) -> RiskAssessment {
        let Some(account) = dataset.account(account_id) else {
            return RiskAssessment::insufficient_data(
                self.name(),
                &config.thresholds,
                "Account record not found; age not evaluated",
            );
        };

        let txns = dataset.account_transactions(account_id);
        if txns.is_empty() {
            return RiskAssessment::insufficient_data(
                self.name(),
                &config.thresholds,
                "No transactions on record; age/volume ratio not evaluated",
            );
        }

        let age_days = (dataset.reference_time() - account.created_at)
            .num_days()
            .max(0);
        let volume = dataset.account_volume(account_id).unwrap_or(0.0);

        // Population median volume across accounts with activity, as the
        // yardstick for "disproportionately high".
        let median_volume = stats::quantile(dataset.population_volumes_sorted(), 0.5);
        let volume_ratio = if median_volume > 0.0 {
            volume / median_volume
        } else {
            1.0
        };

        let horizon = config.account_age.new_account_days;
        let score = if age_days < horizon {
            let youth = 1.0 - age_days as f64 / horizon as f64;
            stats::clamp_score(youth * 40.0 * volume_ratio.clamp(0.0, 2.5))
        } else {
            0
        };

        let mut assessment = RiskAssessment::new(self.name(), score, &config.thresholds)
            .with_metric("age_days", age_days)
            .with_metric("total_volume", (volume * 100.0).round() / 100.0)
            .with_metric("volume_ratio", (volume_ratio * 100.0).round() / 100.0);

        if age_days < horizon && volume_ratio > 1.0 {
            assessment = assessment.with_reason(format!(
                "Account only {age_days} day(s) old at dataset end yet moves {volume_ratio:.1}× the median account volume"
            ));
        } else if age_days < horizon {
            assessment = assessment.with_reason(format!(
                "New account ({age_days} day(s) old) with unremarkable volume"
            ));
        } else {
            assessment = assessment.with_reason(format!(
                "Established account ({age_days} day(s) old)"
            ));
        }

        assessment
    }
}
