//! Analysis configuration.
//!
//! Every tunable in the engine lives here and is passed explicitly into
//! each detector call — nothing is read from ambient/global state, which
//! keeps runs deterministic and detectors testable in isolation.
//!
//! Configuration errors are fatal at run start, before any detector
//! executes: a partially-configured run would silently produce misleading
//! scores.

use crate::assessment::RiskLevel;
use crate::error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature names in catalogue order. Weight maps must cover exactly
/// this set.
pub const FEATURE_NAMES: [&str; 11] = [
    "frequency",
    "burst_structuring",
    "atypical_amounts",
    "cross_border",
    "counterparty_risk",
    "irregularity",
    "night_activity",
    "ephemeral_account",
    "account_age",
    "activity_change",
    "multiplicity",
];

/// Score → level buckets, shared by per-feature and overall classification
/// so the two stay consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelThresholds {
    /// Scores >= this are MEDIUM.
    pub medium: u8,
    /// Scores >= this are HIGH.
    pub high: u8,
}

impl LevelThresholds {
    pub fn level_for(&self, score: u8) -> RiskLevel {
        if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Structuring sub-signal: amounts in `[band_lower, reporting_threshold)`
/// are flagged as sitting just under the reporting threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuringConfig {
    pub reporting_threshold: f64,
    pub band_lower: f64,
}

/// Burst sub-signal: more than `count_threshold` transactions inside any
/// rolling window of `window_hours`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstConfig {
    pub window_hours: i64,
    pub count_threshold: usize,
}

/// Off-hours window for the night-activity detector. The window wraps
/// midnight when `start_hour > end_hour` (e.g. 22 → 6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffHoursConfig {
    pub start_hour: u32,
    pub end_hour: u32,
    /// Accounts with fewer transactions get a capped low score instead of
    /// a full assessment, to avoid false positives from thin data.
    pub min_transactions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemeralConfig {
    /// Closed accounts with a shorter lifespan are considered ephemeral.
    pub short_lifespan_days: i64,
    /// Transacted volume at which a short-lived account is fully suspicious.
    pub high_volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountAgeConfig {
    /// Accounts younger than this (at the dataset reference time) are "new".
    pub new_account_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityChangeConfig {
    pub recent_window_days: i64,
    pub baseline_window_days: i64,
    /// Recent/baseline rate ratio at which the shift counts as significant.
    pub significance_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiplicityConfig {
    /// Components larger than this elevate every member's score.
    pub cluster_size_limit: usize,
    /// Components larger than this additionally set the contamination flag.
    pub contamination_size_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Per-feature aggregation weights, keyed by feature name. Must cover
    /// exactly `FEATURE_NAMES` and sum to 1.0.
    pub weights: BTreeMap<String, f64>,
    pub thresholds: LevelThresholds,
    /// High-risk jurisdiction set: ISO country code → severity in (0, 1].
    pub high_risk_jurisdictions: BTreeMap<String, f64>,
    pub structuring: StructuringConfig,
    pub burst: BurstConfig,
    pub off_hours: OffHoursConfig,
    pub ephemeral: EphemeralConfig,
    pub account_age: AccountAgeConfig,
    pub activity_change: ActivityChangeConfig,
    pub multiplicity: MultiplicityConfig,
    /// Lower bound applied to the overall score when any single detector
    /// signals a contamination condition.
    pub contamination_floor: u8,
}

impl AnalysisConfig {
    /// Load from a JSON file. The runner uses this; tests use
    /// `default_illustrative()`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AnalysisConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Documented illustrative defaults. The exact weights, threshold
    /// boundaries, and jurisdiction list are deployment configuration, not
    /// ground truth; callers are expected to override them.
    pub fn default_illustrative() -> Self {
        let weights = [
            ("frequency", 0.10),
            ("burst_structuring", 0.12),
            ("atypical_amounts", 0.10),
            ("cross_border", 0.12),
            ("counterparty_risk", 0.12),
            ("irregularity", 0.08),
            ("night_activity", 0.06),
            ("ephemeral_account", 0.08),
            ("account_age", 0.06),
            ("activity_change", 0.10),
            ("multiplicity", 0.06),
        ]
        .into_iter()
        .map(|(name, w)| (name.to_string(), w))
        .collect();

        let high_risk_jurisdictions = [
            ("IR", 1.0),
            ("KP", 1.0),
            ("SY", 1.0),
            ("MM", 0.9),
            ("AF", 0.9),
            ("YE", 0.8),
            ("PA", 0.6),
            ("KY", 0.6),
            ("VE", 0.7),
            ("NG", 0.5),
        ]
        .into_iter()
        .map(|(cc, sev): (&str, f64)| (cc.to_string(), sev))
        .collect();

        Self {
            weights,
            thresholds: LevelThresholds { medium: 34, high: 67 },
            high_risk_jurisdictions,
            structuring: StructuringConfig {
                reporting_threshold: 10_000.0,
                band_lower: 9_000.0,
            },
            burst: BurstConfig {
                window_hours: 1,
                count_threshold: 5,
            },
            off_hours: OffHoursConfig {
                start_hour: 22,
                end_hour: 6,
                min_transactions: 5,
            },
            ephemeral: EphemeralConfig {
                short_lifespan_days: 90,
                high_volume: 50_000.0,
            },
            account_age: AccountAgeConfig {
                new_account_days: 180,
            },
            activity_change: ActivityChangeConfig {
                recent_window_days: 30,
                baseline_window_days: 120,
                significance_ratio: 2.0,
            },
            multiplicity: MultiplicityConfig {
                cluster_size_limit: 4,
                contamination_size_limit: 8,
            },
            contamination_floor: 70,
        }
    }

    /// Fatal validation, run before any detector executes.
    pub fn validate(&self) -> AnalysisResult<()> {
        for name in FEATURE_NAMES {
            match self.weights.get(name) {
                None => {
                    return Err(AnalysisError::Config(format!(
                        "missing weight for feature '{name}'"
                    )))
                }
                Some(w) if !w.is_finite() || *w < 0.0 => {
                    return Err(AnalysisError::Config(format!(
                        "weight for feature '{name}' must be a non-negative number, got {w}"
                    )))
                }
                Some(_) => {}
            }
        }
        for name in self.weights.keys() {
            if !FEATURE_NAMES.contains(&name.as_str()) {
                return Err(AnalysisError::Config(format!(
                    "weight for unknown feature '{name}'"
                )));
            }
        }
        let sum: f64 = self.weights.values().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(AnalysisError::Config(format!(
                "feature weights must sum to 1.0, got {sum}"
            )));
        }

        if self.thresholds.medium == 0 || self.thresholds.medium >= self.thresholds.high {
            return Err(AnalysisError::Config(format!(
                "level thresholds must satisfy 0 < medium < high, got medium={} high={}",
                self.thresholds.medium, self.thresholds.high
            )));
        }
        if self.thresholds.high > 100 {
            return Err(AnalysisError::Config(format!(
                "high threshold must be <= 100, got {}",
                self.thresholds.high
            )));
        }

        if !(self.structuring.band_lower > 0.0
            && self.structuring.band_lower < self.structuring.reporting_threshold)
        {
            return Err(AnalysisError::Config(format!(
                "structuring band [{}, {}) must sit strictly below the reporting threshold",
                self.structuring.band_lower, self.structuring.reporting_threshold
            )));
        }

        if self.burst.window_hours <= 0 || self.burst.count_threshold == 0 {
            return Err(AnalysisError::Config(
                "burst window and count threshold must be positive".into(),
            ));
        }

        if self.off_hours.start_hour > 23 || self.off_hours.end_hour > 23 {
            return Err(AnalysisError::Config(format!(
                "off-hours window {}..{} must use hours 0-23",
                self.off_hours.start_hour, self.off_hours.end_hour
            )));
        }

        if self.ephemeral.short_lifespan_days <= 0 || self.ephemeral.high_volume <= 0.0 {
            return Err(AnalysisError::Config(
                "ephemeral lifespan and volume cut-offs must be positive".into(),
            ));
        }

        if self.account_age.new_account_days <= 0 {
            return Err(AnalysisError::Config(
                "new-account age horizon must be positive".into(),
            ));
        }

        if self.activity_change.recent_window_days <= 0
            || self.activity_change.baseline_window_days <= 0
        {
            return Err(AnalysisError::Config(
                "activity-change windows must be positive".into(),
            ));
        }
        if self.activity_change.significance_ratio <= 1.0 {
            return Err(AnalysisError::Config(format!(
                "significance ratio must exceed 1.0, got {}",
                self.activity_change.significance_ratio
            )));
        }

        if self.multiplicity.cluster_size_limit < 2 {
            return Err(AnalysisError::Config(
                "multiplicity cluster size limit must be at least 2".into(),
            ));
        }
        if self.multiplicity.contamination_size_limit < self.multiplicity.cluster_size_limit {
            return Err(AnalysisError::Config(
                "multiplicity contamination limit cannot be below the cluster limit".into(),
            ));
        }

        for (country, severity) in &self.high_risk_jurisdictions {
            if !severity.is_finite() || *severity <= 0.0 || *severity > 1.0 {
                return Err(AnalysisError::Config(format!(
                    "jurisdiction severity for '{country}' must be in (0, 1], got {severity}"
                )));
            }
        }

        Ok(())
    }
}
