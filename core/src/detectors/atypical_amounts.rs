//! Atypical amounts feature: IQR outlier test over the account's own
//! transaction-amount distribution.
//!
//! Amounts below `Q1 - 1.5*IQR` or above `Q3 + 1.5*IQR` are flagged. The
//! score scales with the fraction of transactions that are outliers and
//! with the worst outlier's distance beyond the fence relative to the IQR.

use crate::assessment::RiskAssessment;
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detector::FeatureDetector;
use crate::stats;

pub struct AtypicalAmountsDetector;

const IQR_MULTIPLIER: f64 = 1.5;
const MIN_SAMPLE: usize = 4;

impl FeatureDetector for AtypicalAmountsDetector {
    fn name(&self) -> &'static str {
        "atypical_amounts"
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
                "Fewer than four transactions; quartiles not meaningful",
            );
        }

        let mut amounts: Vec<f64> = txns.iter().map(|t| t.amount).collect();
        amounts.sort_by(|a, b| a.total_cmp(b));

        let q1 = stats::quantile(&amounts, 0.25);
        let q3 = stats::quantile(&amounts, 0.75);
        let iqr = q3 - q1;
        let lower_fence = q1 - IQR_MULTIPLIER * iqr;
        let upper_fence = q3 + IQR_MULTIPLIER * iqr;
        let median = stats::quantile(&amounts, 0.5);

        // Distance beyond the fence, in IQR units. A degenerate IQR of
        // zero falls back to median units so identical-amount accounts
        // with one spike still grade the spike's magnitude.
        let magnitude_unit = if iqr > 0.0 { iqr } else { median.max(1.0) };
        let mut outlier_count = 0usize;
        let mut worst_multiplier = 0.0f64;
        for amount in &amounts {
            let excess = if *amount < lower_fence {
                lower_fence - amount
            } else if *amount > upper_fence {
                amount - upper_fence
            } else {
                continue;
            };
            outlier_count += 1;
            worst_multiplier = worst_multiplier.max(excess / magnitude_unit);
        }

        let outlier_fraction = outlier_count as f64 / amounts.len() as f64;
        let score = if outlier_count > 0 {
            stats::clamp_score(outlier_fraction * 60.0 + (worst_multiplier * 8.0).min(40.0))
        } else {
            0
        };

        let mut assessment = RiskAssessment::new(self.name(), score, &config.thresholds)
            .with_metric("total_transactions", amounts.len())
            .with_metric("outlier_count", outlier_count)
            .with_metric(
                "outlier_fraction",
                (outlier_fraction * 1000.0).round() / 1000.0,
            )
            .with_metric("iqr", (iqr * 100.0).round() / 100.0)
            .with_metric(
                "iqr_multiplier",
                (worst_multiplier * 100.0).round() / 100.0,
            );

        if outlier_count > 0 {
            assessment = assessment.with_reason(format!(
                "{outlier_count} of {} amounts fall outside the {IQR_MULTIPLIER}×IQR fences, worst at {worst_multiplier:.1}× beyond",
                amounts.len()
            ));
        } else {
            assessment = assessment
                .with_reason("All amounts within the account's own 1.5×IQR fences".into());
        }

        assessment
    }
}
