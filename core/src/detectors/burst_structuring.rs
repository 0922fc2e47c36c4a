//! Burst & structuring feature — two sub-signals combined.
//!
//! Burst: a rolling time-window count of transactions exceeding the
//! configured threshold. Structuring: amounts falling inside the band just
//! under the reporting threshold (`[band_lower, reporting_threshold)`,
//! inclusive lower bound). Either sub-signal alone yields a partial score;
//! both together earn a compounding bonus, capped at 100.

use crate::assessment::RiskAssessment;
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detector::FeatureDetector;
use crate::stats;
use chrono::Duration;

pub struct BurstStructuringDetector;

const BURST_COMPONENT_CAP: f64 = 55.0;
const STRUCTURING_COMPONENT_CAP: f64 = 55.0;
const COMPOUND_BONUS: f64 = 15.0;

impl FeatureDetector for BurstStructuringDetector {
    fn name(&self) -> &'static str {
        "burst_structuring"
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
                "No transactions on record; burst/structuring not evaluated",
            );
        }

        // Burst sub-signal: sliding window over the (already sorted)
        // timestamps. `max_burst` is the largest count inside any window;
        // `burst_windows` counts window starts that exceed the threshold.
        let window = Duration::hours(config.burst.window_hours);
        let threshold = config.burst.count_threshold;
        let mut max_burst = 0usize;
        let mut burst_windows = 0usize;
        let mut end = 0usize;
        for start in 0..txns.len() {
            if end < start {
                end = start;
            }
            while end < txns.len() && txns[end].timestamp - txns[start].timestamp < window {
                end += 1;
            }
            let count = end - start;
            max_burst = max_burst.max(count);
            if count > threshold {
                burst_windows += 1;
            }
        }

        let burst_component = if max_burst > threshold {
            let ratio = max_burst as f64 / threshold as f64;
            ((ratio - 1.0) * 30.0 + 20.0).min(BURST_COMPONENT_CAP)
        } else {
            0.0
        };

        // Structuring sub-signal: inclusive lower bound, exclusive upper.
        let band_lower = config.structuring.band_lower;
        let reporting = config.structuring.reporting_threshold;
        let structured: Vec<f64> = txns
            .iter()
            .filter(|t| t.amount >= band_lower && t.amount < reporting)
            .map(|t| t.amount)
            .collect();
        let structuring_count = structured.len();
        let structuring_fraction = structuring_count as f64 / txns.len() as f64;

        let structuring_component = if structuring_count > 0 {
            (structuring_count as f64 * 12.0 + structuring_fraction * 20.0)
                .min(STRUCTURING_COMPONENT_CAP)
        } else {
            0.0
        };

        let bonus = if burst_component > 0.0 && structuring_component > 0.0 {
            COMPOUND_BONUS
        } else {
            0.0
        };
        let score = stats::clamp_score(burst_component + structuring_component + bonus);

        let mut assessment = RiskAssessment::new(self.name(), score, &config.thresholds)
            .with_metric("total_transactions", txns.len())
            .with_metric("max_burst", max_burst)
            .with_metric("burst_windows", burst_windows)
            .with_metric("structuring_count", structuring_count)
            .with_metric(
                "structuring_total",
                (structured.iter().sum::<f64>() * 100.0).round() / 100.0,
            );

        if burst_component > 0.0 {
            assessment = assessment.with_reason(format!(
                "Up to {max_burst} transactions inside a {}h window (threshold {threshold})",
                config.burst.window_hours
            ));
        }
        if structuring_component > 0.0 {
            assessment = assessment.with_reason(format!(
                "{structuring_count} transaction(s) in the [{band_lower:.0}, {reporting:.0}) band just under the reporting threshold"
            ));
        }
        if bonus > 0.0 {
            assessment = assessment
                .with_reason("Burst and structuring signals fire together; compounding".into());
        }
        if assessment.reasons.is_empty() {
            assessment = assessment
                .with_reason("No burst or under-threshold structuring patterns detected".into());
        }

        assessment
    }
}
