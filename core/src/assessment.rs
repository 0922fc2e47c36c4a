//! Assessment records — the engine's structured output contract.
//!
//! `RiskAssessment` is one detector's verdict for one account;
//! `OverallAssessment` is the aggregated per-account record consumed by
//! downstream reporting and agent layers. Both are pure computed outputs
//! with no identity beyond the run.

use crate::config::LevelThresholds;
use crate::types::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Output of one feature detector for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub feature_name: String,
    /// Integer 0–100.
    pub score: u8,
    pub level: RiskLevel,
    /// Ordered human-readable justifications, each tied to a concrete metric.
    pub reasons: Vec<String>,
    /// Metric name → numeric/categorical value.
    pub metrics: BTreeMap<String, serde_json::Value>,
    /// Set when this detector observed a contamination condition that must
    /// floor the overall score regardless of the weighted average.
    #[serde(default)]
    pub contaminated: bool,
}

impl RiskAssessment {
    pub fn new(feature_name: &str, score: u8, thresholds: &LevelThresholds) -> Self {
        Self {
            feature_name: feature_name.to_string(),
            score: score.min(100),
            level: thresholds.level_for(score.min(100)),
            reasons: Vec::new(),
            metrics: BTreeMap::new(),
            contaminated: false,
        }
    }

    /// The degraded assessment a detector returns when it cannot compute:
    /// score 0, LOW, and an explicit insufficient-data reason. Never an
    /// error — one thin account must not abort analysis of the others.
    pub fn insufficient_data(
        feature_name: &str,
        thresholds: &LevelThresholds,
        reason: &str,
    ) -> Self {
        let mut assessment = Self::new(feature_name, 0, thresholds);
        assessment.reasons.push(reason.to_string());
        assessment
            .metrics
            .insert("insufficient_data".into(), serde_json::Value::Bool(true));
        assessment
    }

    pub fn with_reason(mut self, reason: String) -> Self {
        self.reasons.push(reason);
        self
    }

    pub fn with_metric(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metrics.insert(name.to_string(), value.into());
        self
    }

    pub fn mark_contaminated(mut self) -> Self {
        self.contaminated = true;
        self
    }
}

/// Aggregated per-account record: eleven feature assessments folded into
/// one score, one level, and a short triage narrative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallAssessment {
    pub account_id: AccountId,
    pub overall_score: u8,
    pub overall_level: RiskLevel,
    /// Highest-scoring 1–3 individual feature reasons, for downstream
    /// natural-language reporting. Not a flattened union of all eleven.
    pub top_reasons: Vec<String>,
    pub per_feature: BTreeMap<String, RiskAssessment>,
    pub generated_at: DateTime<Utc>,
}
