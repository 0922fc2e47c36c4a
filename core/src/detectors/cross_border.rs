//! Cross-border feature: external counterparty jurisdictions matched
//! against the configured, severity-graded high-risk set.
//!
//! Transactions with a missing counterparty country are "unknown
//! jurisdiction": they degrade coverage (surfaced as a metric and reason),
//! they never abort the assessment.

use crate::assessment::RiskAssessment;
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detector::FeatureDetector;
use crate::stats;
use std::collections::BTreeSet;

pub struct CrossBorderDetector;

impl FeatureDetector for CrossBorderDetector {
    fn name(&self) -> &'static str {
        "cross_border"
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
                "No transactions on record; cross-border exposure not evaluated",
            );
        }

        let mut cross_border = 0usize;
        let mut unknown_jurisdiction = 0usize;
        let mut flagged_count = 0usize;
        let mut severity_sum = 0.0f64;
        let mut flagged_countries: BTreeSet<String> = BTreeSet::new();

        for txn in &txns {
            if txn.is_internal {
                continue;
            }
            cross_border += 1;
            match txn.external_counterparty_country.as_deref() {
                None => unknown_jurisdiction += 1,
                Some(country) => {
                    if let Some(severity) = config.high_risk_jurisdictions.get(country) {
                        flagged_count += 1;
                        severity_sum += severity;
                        flagged_countries.insert(country.to_string());
                    }
                }
            }
        }

        if cross_border == 0 {
            return RiskAssessment::new(self.name(), 0, &config.thresholds)
                .with_reason("All transactions are internal; no cross-border exposure".into())
                .with_metric("total_transactions", txns.len())
                .with_metric("cross_border_count", 0);
        }

        let flagged_fraction = flagged_count as f64 / cross_border as f64;
        let avg_severity = if flagged_count > 0 {
            severity_sum / flagged_count as f64
        } else {
            0.0
        };
        let score = stats::clamp_score(
            avg_severity * (flagged_fraction * 70.0 + (flagged_count as f64 * 6.0).min(30.0)),
        );

        let mut assessment = RiskAssessment::new(self.name(), score, &config.thresholds)
            .with_metric("total_transactions", txns.len())
            .with_metric("cross_border_count", cross_border)
            .with_metric("flagged_count", flagged_count)
            .with_metric(
                "flagged_fraction",
                (flagged_fraction * 1000.0).round() / 1000.0,
            )
            .with_metric("avg_severity", (avg_severity * 100.0).round() / 100.0)
            .with_metric("unknown_jurisdiction_count", unknown_jurisdiction)
            .with_metric(
                "flagged_countries",
                flagged_countries
                    .iter()
                    .cloned()
                    .collect::<Vec<String>>(),
            );

        if flagged_count > 0 {
            let countries: Vec<&str> =
                flagged_countries.iter().map(String::as_str).take(3).collect();
            assessment = assessment.with_reason(format!(
                "{flagged_count} of {cross_border} cross-border transaction(s) touch high-risk jurisdictions ({})",
                countries.join(", ")
            ));
        } else {
            assessment = assessment.with_reason(
                "Cross-border activity touches no configured high-risk jurisdiction".into(),
            );
        }
        if unknown_jurisdiction > 0 {
            assessment = assessment.with_reason(format!(
                "{unknown_jurisdiction} external transaction(s) with unknown jurisdiction; coverage reduced"
            ));
        }

        assessment
    }
}
