//! JSON export of assessments and mass-analysis reports.
//!
//! All serialization goes through serde; maps inside assessments are
//! BTreeMaps, so the emitted JSON is byte-stable across runs on the same
//! input.

use crate::assessment::OverallAssessment;
use crate::error::AnalysisResult;
use crate::ranker::MassAnalysisReport;
use std::path::Path;

/// One account's overall assessment as a serde value, for callers that
/// post-process rather than print.
pub fn assessment_to_value(assessment: &OverallAssessment) -> AnalysisResult<serde_json::Value> {
    Ok(serde_json::to_value(assessment)?)
}

/// One account's overall assessment, pretty-printed.
pub fn assessment_to_json(assessment: &OverallAssessment) -> AnalysisResult<String> {
    Ok(serde_json::to_string_pretty(assessment)?)
}

/// A full mass-analysis report, pretty-printed.
pub fn report_to_json(report: &MassAnalysisReport) -> AnalysisResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Serializes the report and writes it to `path`.
pub fn write_report(report: &MassAnalysisReport, path: &Path) -> AnalysisResult<()> {
    let json = report_to_json(report)?;
    std::fs::write(path, json).map_err(|e| {
        anyhow::anyhow!("cannot write report to {}: {e}", path.display()).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{RiskAssessment, RiskLevel};
    use crate::config::AnalysisConfig;
    use std::collections::BTreeMap;

    #[test]
    fn assessment_json_carries_levels_as_uppercase() {
        let config = AnalysisConfig::default_illustrative();
        let mut per_feature = BTreeMap::new();
        per_feature.insert(
            "frequency".to_string(),
            RiskAssessment::new("frequency", 80, &config.thresholds),
        );
        let overall = OverallAssessment {
            account_id: "acct-1".into(),
            overall_score: 80,
            overall_level: RiskLevel::High,
            top_reasons: vec![],
            per_feature,
            generated_at: chrono::DateTime::UNIX_EPOCH,
        };
        let json = assessment_to_json(&overall).unwrap();
        assert!(json.contains("\"HIGH\""));
        assert!(json.contains("\"account_id\": \"acct-1\""));
    }
}
