//! Feature detector trait and registry.
//!
//! RULE: Every feature implements FeatureDetector with the identical
//! signature, so detectors can be added or removed without touching the
//! aggregator. Detectors are pure functions over the dataset snapshot:
//! no randomness, no wall clock, no mutation.

use crate::assessment::RiskAssessment;
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detectors;

/// The contract every feature detector must fulfill.
pub trait FeatureDetector: Send + Sync {
    /// Unique stable feature name; must match a key in the weight map.
    fn name(&self) -> &'static str;

    /// Assess one account against the full dataset snapshot.
    ///
    /// Must never panic on missing or thin data — degraded inputs produce
    /// a degraded assessment with an explicit reason, never an error.
    fn assess(
        &self,
        account_id: &str,
        dataset: &AnalysisDataset,
        config: &AnalysisConfig,
    ) -> RiskAssessment;
}

/// The ten per-account detectors, in catalogue order.
///
/// The multiplicity detector is deliberately absent: it needs whole-dataset
/// structure, runs once per run, and is fanned out by the ranker (see
/// `detectors::multiplicity`).
pub fn per_account_registry() -> Vec<Box<dyn FeatureDetector>> {
    vec![
        Box::new(detectors::frequency::FrequencyDetector),
        Box::new(detectors::burst_structuring::BurstStructuringDetector),
        Box::new(detectors::atypical_amounts::AtypicalAmountsDetector),
        Box::new(detectors::cross_border::CrossBorderDetector),
        Box::new(detectors::counterparty_risk::CounterpartyRiskDetector),
        Box::new(detectors::irregularity::IrregularityDetector),
        Box::new(detectors::night_activity::NightActivityDetector),
        Box::new(detectors::ephemeral_account::EphemeralAccountDetector),
        Box::new(detectors::account_age::AccountAgeDetector),
        Box::new(detectors::activity_change::ActivityChangeDetector),
    ]
}
