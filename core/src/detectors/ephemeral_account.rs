//! Ephemeral account feature: lifespan combined with transacted volume.
//!
//! A closed account with a short lifespan and high volume drives the score
//! up. An account without a `closed_at` is unresolved: it gets a neutral
//! score, never a maximally suspicious one.

use crate::assessment::RiskAssessment;
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detector::FeatureDetector;
use crate::stats;

pub struct EphemeralAccountDetector;

const UNRESOLVED_NEUTRAL_SCORE: u8 = 10;

impl FeatureDetector for EphemeralAccountDetector {
    fn name(&self) -> &'static str {
        "ephemeral_account"
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
                "Account record not found; lifespan not evaluated",
            );
        };

        let txns = dataset.account_transactions(account_id);
        if txns.is_empty() {
            return RiskAssessment::insufficient_data(
                self.name(),
                &config.thresholds,
                "No transactions on record; lifespan/volume not evaluated",
            );
        }
        let volume: f64 = txns.iter().map(|t| t.amount).sum();

        let Some(closed_at) = account.closed_at else {
            return RiskAssessment::new(self.name(), UNRESOLVED_NEUTRAL_SCORE, &config.thresholds)
                .with_reason("Account still open; lifespan unresolved, neutral score".into())
                .with_metric("lifespan_resolved", false)
                .with_metric("total_volume", (volume * 100.0).round() / 100.0);
        };

        let lifespan_days = (closed_at - account.created_at).num_days().max(0);
        let short_limit = config.ephemeral.short_lifespan_days;
        let high_volume = config.ephemeral.high_volume;

        let score = if lifespan_days < short_limit {
            let youth = 1.0 - lifespan_days as f64 / short_limit as f64;
            let volume_factor = (volume / high_volume).min(2.0);
            stats::clamp_score(youth * 50.0 + volume_factor * 25.0)
        } else {
            stats::clamp_score(((volume / high_volume).min(1.0)) * 15.0)
        };

        let mut assessment = RiskAssessment::new(self.name(), score, &config.thresholds)
            .with_metric("lifespan_resolved", true)
            .with_metric("lifespan_days", lifespan_days)
            .with_metric("total_volume", (volume * 100.0).round() / 100.0)
            .with_metric("transaction_count", txns.len());

        if lifespan_days < short_limit {
            assessment = assessment.with_reason(format!(
                "Account closed after {lifespan_days} day(s) (under the {short_limit}-day ephemeral cut-off) having moved {volume:.2}"
            ));
        } else {
            assessment = assessment.with_reason(format!(
                "Account lived {lifespan_days} day(s); not ephemeral"
            ));
        }

        assessment
    }
}
