//! Weighted aggregation of per-feature assessments into one overall
//! account score.
//!
//! The weighted average is the base; if any contributing feature carries
//! the contamination flag the overall score is floored at the configured
//! contamination floor, so structural red flags cannot be diluted away by
//! a sea of quiet features.

use crate::assessment::{OverallAssessment, RiskAssessment};
use crate::config::AnalysisConfig;
use crate::stats;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// How many feature lead reasons surface into the overall summary.
const TOP_REASON_LIMIT: usize = 3;

/// Combines the per-feature assessments for one account.
///
/// Assumes `config.validate()` has already passed, so every assessment's
/// feature name has a weight and the weights sum to 1. Features absent
/// from the map contribute nothing, which only happens when a detector
/// was deliberately skipped upstream.
pub fn aggregate(
    account_id: &str,
    assessments: BTreeMap<String, RiskAssessment>,
    config: &AnalysisConfig,
    generated_at: DateTime<Utc>,
) -> OverallAssessment {
    let mut weighted = 0.0;
    let mut contaminated = false;
    for (name, assessment) in &assessments {
        let weight = config.weights.get(name).copied().unwrap_or(0.0);
        weighted += assessment.score as f64 * weight;
        contaminated |= assessment.contaminated;
    }

    let base = stats::clamp_score(weighted);
    let overall_score = if contaminated {
        base.max(config.contamination_floor)
    } else {
        base
    };

    // Lead reasons of the strongest nonzero features, strongest first,
    // feature name breaking score ties for stable output.
    let mut ranked: Vec<&RiskAssessment> =
        assessments.values().filter(|a| a.score > 0).collect();
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.feature_name.cmp(&b.feature_name))
    });
    let top_reasons: Vec<String> = ranked
        .iter()
        .take(TOP_REASON_LIMIT)
        .filter_map(|a| {
            a.reasons
                .first()
                .map(|r| format!("[{}] {}", a.feature_name, r))
        })
        .collect();

    OverallAssessment {
        account_id: account_id.to_string(),
        overall_score,
        overall_level: config.thresholds.level_for(overall_score),
        top_reasons,
        per_feature: assessments,
        generated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::RiskLevel;

    fn assessment(name: &str, score: u8) -> RiskAssessment {
        RiskAssessment::new(name, score, &AnalysisConfig::default_illustrative().thresholds)
            .with_reason(format!("{name} fired at {score}"))
    }

    #[test]
    fn weighted_average_stays_in_range() {
        let config = AnalysisConfig::default_illustrative();
        let mut map = BTreeMap::new();
        for name in crate::config::FEATURE_NAMES {
            map.insert(name.to_string(), assessment(name, 100));
        }
        let overall = aggregate("acct-1", map, &config, Utc::now());
        assert_eq!(overall.overall_score, 100);
        assert_eq!(overall.overall_level, RiskLevel::High);
    }

    #[test]
    fn contamination_floors_a_quiet_account() {
        let config = AnalysisConfig::default_illustrative();
        let mut map = BTreeMap::new();
        for name in crate::config::FEATURE_NAMES {
            map.insert(name.to_string(), assessment(name, 0));
        }
        map.insert(
            "multiplicity".to_string(),
            assessment("multiplicity", 10).mark_contaminated(),
        );
        let overall = aggregate("acct-1", map, &config, Utc::now());
        assert_eq!(overall.overall_score, config.contamination_floor);
    }

    #[test]
    fn top_reasons_follow_score_order() {
        let config = AnalysisConfig::default_illustrative();
        let mut map = BTreeMap::new();
        map.insert("frequency".into(), assessment("frequency", 80));
        map.insert("night_activity".into(), assessment("night_activity", 40));
        map.insert("cross_border".into(), assessment("cross_border", 90));
        map.insert("irregularity".into(), assessment("irregularity", 0));
        let overall = aggregate("acct-1", map, &config, Utc::now());
        assert_eq!(overall.top_reasons.len(), 3);
        assert!(overall.top_reasons[0].starts_with("[cross_border]"));
        assert!(overall.top_reasons[1].starts_with("[frequency]"));
        assert!(overall.top_reasons[2].starts_with("[night_activity]"));
    }
}
