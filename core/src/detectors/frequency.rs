//! Frequency feature: transaction rate versus the population norm.
//!
//! Places the account's transactions-per-day within the distribution of
//! per-account rates the dataset computed once at build time. The score
//! rises with percentile rank and with the z-score above the population
//! mean.

use crate::assessment::RiskAssessment;
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detector::FeatureDetector;
use crate::stats;

pub struct FrequencyDetector;

impl FeatureDetector for FrequencyDetector {
    fn name(&self) -> &'static str {
        "frequency"
    }

    fn assess(
        &self,
        account_id: &str,
        dataset: &AnalysisDataset,
        config: &AnalysisConfig,
    ) -> RiskAssessment {
        let txns = dataset.account_transactions(account_id);
        let Some(rate) = dataset.account_rate(account_id) else {
            return RiskAssessment::insufficient_data(
                self.name(),
                &config.thresholds,
                "No transactions on record; frequency not evaluated",
            );
        };

        let population = dataset.population_rates();
        let pop_mean = stats::mean(population);
        let pop_std = stats::std_dev(population);
        let z_score = if pop_std > 0.0 {
            (rate - pop_mean) / pop_std
        } else {
            0.0
        };
        let percentile = stats::percentile_rank(population, rate);

        let score = stats::clamp_score(percentile * 55.0 + z_score.clamp(0.0, 4.0) * 11.25);

        let mut assessment = RiskAssessment::new(self.name(), score, &config.thresholds)
            .with_metric("total_transactions", txns.len())
            .with_metric("tx_per_day", (rate * 100.0).round() / 100.0)
            .with_metric("population_mean", (pop_mean * 100.0).round() / 100.0)
            .with_metric("z_score", (z_score * 100.0).round() / 100.0)
            .with_metric("percentile", (percentile * 100.0).round() / 100.0);

        if z_score > 2.0 {
            assessment = assessment.with_reason(format!(
                "Transaction rate {rate:.2}/day is {z_score:.1} standard deviations above the population mean of {pop_mean:.2}/day"
            ));
        } else if percentile > 0.9 {
            assessment = assessment.with_reason(format!(
                "Transaction rate {rate:.2}/day sits in the top {:.0}% of the population",
                (1.0 - percentile) * 100.0
            ));
        } else {
            assessment = assessment.with_reason(format!(
                "Transaction rate {rate:.2}/day within the population norm"
            ));
        }

        assessment
    }
}
