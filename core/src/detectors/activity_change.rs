//! Abnormal activity change feature: recent window versus trailing
//! baseline for the same account.
//!
//! Both windows end-align to the dataset reference time; their sizes and
//! the significance ratio are configuration, not constants.

use crate::assessment::RiskAssessment;
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detector::FeatureDetector;
use crate::model::Transaction;
use crate::stats;
use chrono::Duration;

pub struct ActivityChangeDetector;

const NO_BASELINE_SCORE: u8 = 15;

fn window_stats(txns: &[&Transaction]) -> (usize, f64) {
    let count = txns.len();
    let avg = if count > 0 {
        txns.iter().map(|t| t.amount).sum::<f64>() / count as f64
    } else {
        0.0
    };
    (count, avg)
}

impl FeatureDetector for ActivityChangeDetector {
    fn name(&self) -> &'static str {
        "activity_change"
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
                "No transactions on record; activity change not evaluated",
            );
        }

        let reference = dataset.reference_time();
        let recent_days = config.activity_change.recent_window_days;
        let baseline_days = config.activity_change.baseline_window_days;
        let recent_start = reference - Duration::days(recent_days);
        let baseline_start = recent_start - Duration::days(baseline_days);

        let recent: Vec<&Transaction> = txns
            .iter()
            .filter(|t| t.timestamp > recent_start)
            .copied()
            .collect();
        let baseline: Vec<&Transaction> = txns
            .iter()
            .filter(|t| t.timestamp > baseline_start && t.timestamp <= recent_start)
            .copied()
            .collect();

        let (recent_count, recent_avg) = window_stats(&recent);
        let (baseline_count, baseline_avg) = window_stats(&baseline);

        if baseline_count == 0 {
            let score = if recent_count > 0 { NO_BASELINE_SCORE } else { 0 };
            return RiskAssessment::new(self.name(), score, &config.thresholds)
                .with_reason(
                    "No baseline-window activity to compare against; change not measurable"
                        .into(),
                )
                .with_metric("recent_count", recent_count)
                .with_metric("baseline_count", 0);
        }

        let recent_rate = recent_count as f64 / recent_days as f64;
        let baseline_rate = baseline_count as f64 / baseline_days as f64;
        let volume_ratio = if baseline_rate > 0.0 {
            recent_rate / baseline_rate
        } else {
            0.0
        };
        let amount_ratio = if baseline_avg > 0.0 {
            recent_avg / baseline_avg
        } else {
            0.0
        };
        let worst_ratio = volume_ratio.max(amount_ratio);

        let significance = config.activity_change.significance_ratio;
        let score = if worst_ratio >= significance {
            stats::clamp_score(40.0 + (worst_ratio - significance) * 20.0)
        } else {
            stats::clamp_score(((worst_ratio - 1.0).max(0.0)) * 20.0)
        };

        let mut assessment = RiskAssessment::new(self.name(), score, &config.thresholds)
            .with_metric("recent_count", recent_count)
            .with_metric("baseline_count", baseline_count)
            .with_metric("volume_ratio", (volume_ratio * 100.0).round() / 100.0)
            .with_metric("amount_ratio", (amount_ratio * 100.0).round() / 100.0);

        if worst_ratio >= significance {
            if volume_ratio >= amount_ratio {
                assessment = assessment.with_reason(format!(
                    "Recent transaction rate is {volume_ratio:.1}× the trailing baseline (significance at {significance:.1}×)"
                ));
            } else {
                assessment = assessment.with_reason(format!(
                    "Recent average amount is {amount_ratio:.1}× the trailing baseline (significance at {significance:.1}×)"
                ));
            }
        } else {
            assessment = assessment.with_reason(format!(
                "Recent activity within {worst_ratio:.1}× of the trailing baseline; no significant shift"
            ));
        }

        assessment
    }
}
