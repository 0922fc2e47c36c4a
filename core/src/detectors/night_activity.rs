//! Night activity feature: fraction of transactions inside the configured
//! off-hours window.
//!
//! Accounts under the minimum sample size get a capped low score with an
//! explicit reason, never a missing assessment.

use crate::assessment::RiskAssessment;
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detector::FeatureDetector;
use crate::stats;
use chrono::Timelike;

pub struct NightActivityDetector;

const THIN_SAMPLE_CAP: u8 = 15;

fn in_off_hours(hour: u32, start: u32, end: u32) -> bool {
    if start > end {
        // Window wraps midnight, e.g. 22 → 6.
        hour >= start || hour < end
    } else {
        hour >= start && hour < end
    }
}

impl FeatureDetector for NightActivityDetector {
    fn name(&self) -> &'static str {
        "night_activity"
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
                "No transactions on record; night activity not evaluated",
            );
        }

        let start = config.off_hours.start_hour;
        let end = config.off_hours.end_hour;
        let night_count = txns
            .iter()
            .filter(|t| in_off_hours(t.timestamp.hour(), start, end))
            .count();
        let fraction = night_count as f64 / txns.len() as f64;

        let raw = stats::clamp_score(fraction * 200.0);
        let thin_sample = txns.len() < config.off_hours.min_transactions;
        let score = if thin_sample { raw.min(THIN_SAMPLE_CAP) } else { raw };

        let mut assessment = RiskAssessment::new(self.name(), score, &config.thresholds)
            .with_metric("total_transactions", txns.len())
            .with_metric("night_count", night_count)
            .with_metric("night_fraction", (fraction * 1000.0).round() / 1000.0)
            .with_metric("sample_floor_applied", thin_sample);

        assessment = assessment.with_reason(format!(
            "{night_count} of {} transaction(s) ({:.0}%) fall in the {start:02}:00-{end:02}:00 off-hours window",
            txns.len(),
            fraction * 100.0
        ));
        if thin_sample {
            assessment = assessment.with_reason(format!(
                "Below the {}-transaction minimum sample; score capped to avoid a false positive",
                config.off_hours.min_transactions
            ));
        }

        assessment
    }
}
