//! Per-feature detector behavior against small handcrafted datasets.
//!
//! Each test builds the smallest dataset that isolates one detector's
//! signal and asserts on the score band and the metrics that justify it,
//! not on exact score values that would pin down tuning constants.

use amlrank_core::detector::per_account_registry;
use amlrank_core::{
    Account, AnalysisConfig, AnalysisDataset, Direction, Partner, RiskCategory, Transaction,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn ts(day: i64, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap() + Duration::days(day)
}

fn internal_txn(id: &str, day: i64, hour: u32, amount: f64, src: &str, dst: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        timestamp: ts(day, hour),
        amount,
        currency: "USD".to_string(),
        direction: Direction::Debit,
        source_account_id: src.to_string(),
        target_account_id: dst.to_string(),
        is_internal: true,
        external_counterparty_account: None,
        external_counterparty_country: None,
    }
}

fn external_txn(
    id: &str,
    day: i64,
    amount: f64,
    src: &str,
    country: Option<&str>,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        timestamp: ts(day, 12),
        amount,
        currency: "USD".to_string(),
        direction: Direction::Debit,
        source_account_id: src.to_string(),
        target_account_id: "external".to_string(),
        is_internal: false,
        external_counterparty_account: Some("ext-9000".to_string()),
        external_counterparty_country: country.map(str::to_string),
    }
}

fn account(id: &str, owner: &str, created_day: i64) -> Account {
    Account {
        id: id.to_string(),
        owner_partner_id: owner.to_string(),
        created_at: ts(created_day, 0),
        closed_at: None,
    }
}

fn partner(id: &str, category: RiskCategory) -> Partner {
    Partner {
        id: id.to_string(),
        name: format!("Partner {id}"),
        jurisdiction: "US".to_string(),
        risk_category: category,
        address: None,
        contact: None,
        device_fingerprint: None,
    }
}

fn assess(dataset: &AnalysisDataset, feature: &str, account_id: &str) -> amlrank_core::RiskAssessment {
    let config = AnalysisConfig::default_illustrative();
    per_account_registry()
        .into_iter()
        .find(|d| d.name() == feature)
        .unwrap_or_else(|| panic!("no detector named {feature}"))
        .assess(account_id, dataset, &config)
}

#[test]
fn structuring_band_is_inclusive_below_exclusive_at_threshold() {
    // 9,500 and 9,000 sit in the [9000, 10000) band; 10,500 does not.
    let dataset = AnalysisDataset::build(
        vec![
            internal_txn("t1", 1, 10, 9_500.0, "a1", "a2"),
            internal_txn("t2", 3, 10, 9_000.0, "a1", "a2"),
            internal_txn("t3", 5, 10, 10_500.0, "a1", "a2"),
        ],
        vec![account("a1", "p1", 0), account("a2", "p2", 0)],
        vec![
            partner("p1", RiskCategory::Standard),
            partner("p2", RiskCategory::Standard),
        ],
    )
    .expect("dataset");

    let result = assess(&dataset, "burst_structuring", "a1");
    assert_eq!(
        result.metrics.get("structuring_count"),
        Some(&serde_json::json!(2)),
        "exactly the two in-band amounts must count: {:?}",
        result.metrics
    );
    assert!(result.score > 0, "structuring must raise the score");
}

#[test]
fn burst_inside_one_window_fires() {
    // Seven transactions within 30 minutes against a threshold of 5/hour.
    let txns: Vec<Transaction> = (0..7)
        .map(|i| {
            let mut t = internal_txn(&format!("t{i}"), 1, 10, 100.0, "a1", "a2");
            t.timestamp = ts(1, 10) + Duration::minutes(i * 4);
            t
        })
        .collect();
    let dataset = AnalysisDataset::build(
        txns,
        vec![account("a1", "p1", 0), account("a2", "p2", 0)],
        vec![
            partner("p1", RiskCategory::Standard),
            partner("p2", RiskCategory::Standard),
        ],
    )
    .expect("dataset");

    let result = assess(&dataset, "burst_structuring", "a1");
    assert_eq!(result.metrics.get("max_burst"), Some(&serde_json::json!(7)));
    assert!(result.score > 0, "burst above threshold must score");
}

#[test]
fn amount_spike_over_flat_history_is_an_outlier() {
    let mut txns: Vec<Transaction> = (0..5)
        .map(|i| internal_txn(&format!("t{i}"), i, 10, 10.0, "a1", "a2"))
        .collect();
    txns.push(internal_txn("spike", 6, 10, 1_000.0, "a1", "a2"));
    let dataset = AnalysisDataset::build(
        txns,
        vec![account("a1", "p1", 0), account("a2", "p2", 0)],
        vec![
            partner("p1", RiskCategory::Standard),
            partner("p2", RiskCategory::Standard),
        ],
    )
    .expect("dataset");

    let result = assess(&dataset, "atypical_amounts", "a1");
    assert_eq!(
        result.metrics.get("outlier_count"),
        Some(&serde_json::json!(1)),
        "the 1000.0 spike over a flat 10.0 history must be flagged"
    );
    assert!(result.score > 0);
}

#[test]
fn uniform_amounts_produce_no_outliers() {
    let txns: Vec<Transaction> = (0..5)
        .map(|i| internal_txn(&format!("t{i}"), i, 10, 10.0, "a1", "a2"))
        .collect();
    let dataset = AnalysisDataset::build(
        txns,
        vec![account("a1", "p1", 0), account("a2", "p2", 0)],
        vec![
            partner("p1", RiskCategory::Standard),
            partner("p2", RiskCategory::Standard),
        ],
    )
    .expect("dataset");

    let result = assess(&dataset, "atypical_amounts", "a1");
    assert_eq!(result.score, 0, "identical amounts cannot be atypical");
}

#[test]
fn thin_night_sample_is_capped_not_maximal() {
    // Three transactions, all at 23:00 — 100% night, but below the
    // 5-transaction minimum sample.
    let txns: Vec<Transaction> = (0..3)
        .map(|i| internal_txn(&format!("t{i}"), i, 23, 50.0, "a1", "a2"))
        .collect();
    let dataset = AnalysisDataset::build(
        txns,
        vec![account("a1", "p1", 0), account("a2", "p2", 0)],
        vec![
            partner("p1", RiskCategory::Standard),
            partner("p2", RiskCategory::Standard),
        ],
    )
    .expect("dataset");

    let result = assess(&dataset, "night_activity", "a1");
    assert!(
        result.score <= 15,
        "thin sample must be capped low, got {}",
        result.score
    );
    assert_eq!(
        result.metrics.get("sample_floor_applied"),
        Some(&serde_json::json!(true))
    );
}

#[test]
fn full_night_sample_scores_high() {
    let txns: Vec<Transaction> = (0..8)
        .map(|i| internal_txn(&format!("t{i}"), i, 23, 50.0, "a1", "a2"))
        .collect();
    let dataset = AnalysisDataset::build(
        txns,
        vec![account("a1", "p1", 0), account("a2", "p2", 0)],
        vec![
            partner("p1", RiskCategory::Standard),
            partner("p2", RiskCategory::Standard),
        ],
    )
    .expect("dataset");

    let result = assess(&dataset, "night_activity", "a1");
    assert!(
        result.score >= 67,
        "100% off-hours over a full sample must be high, got {}",
        result.score
    );
}

#[test]
fn high_risk_jurisdiction_drives_cross_border_score() {
    let txns: Vec<Transaction> = (0..3)
        .map(|i| external_txn(&format!("t{i}"), i, 5_000.0, "a1", Some("IR")))
        .collect();
    let dataset = AnalysisDataset::build(
        txns,
        vec![account("a1", "p1", 0)],
        vec![partner("p1", RiskCategory::Standard)],
    )
    .expect("dataset");

    let result = assess(&dataset, "cross_border", "a1");
    assert!(
        result.score >= 67,
        "all-IR traffic must land in the high band, got {}",
        result.score
    );
}

#[test]
fn missing_jurisdiction_reduces_confidence_instead_of_failing() {
    let dataset = AnalysisDataset::build(
        vec![external_txn("t1", 1, 5_000.0, "a1", None)],
        vec![account("a1", "p1", 0)],
        vec![partner("p1", RiskCategory::Standard)],
    )
    .expect("dataset");

    let result = assess(&dataset, "cross_border", "a1");
    assert_eq!(
        result.metrics.get("unknown_jurisdiction_count"),
        Some(&serde_json::json!(1))
    );
}

#[test]
fn sanctioned_adjacent_counterparty_contaminates() {
    let dataset = AnalysisDataset::build(
        vec![internal_txn("t1", 1, 10, 200.0, "a1", "a2")],
        vec![account("a1", "p1", 0), account("a2", "p2", 0)],
        vec![
            partner("p1", RiskCategory::Standard),
            partner("p2", RiskCategory::SanctionedAdjacent),
        ],
    )
    .expect("dataset");

    let result = assess(&dataset, "counterparty_risk", "a1");
    assert!(result.contaminated, "sanctioned-adjacent must contaminate");
    assert!(
        result.score >= 85,
        "contamination floors the feature score, got {}",
        result.score
    );
}

#[test]
fn open_account_gets_neutral_ephemeral_score() {
    // Lifespan is unresolved for an open account; the score must be
    // neutral-low, never maximally suspicious.
    let dataset = AnalysisDataset::build(
        vec![internal_txn("t1", 1, 10, 100_000.0, "a1", "a2")],
        vec![account("a1", "p1", 0), account("a2", "p2", 0)],
        vec![
            partner("p1", RiskCategory::Standard),
            partner("p2", RiskCategory::Standard),
        ],
    )
    .expect("dataset");

    let result = assess(&dataset, "ephemeral_account", "a1");
    assert!(result.score <= 15, "open account must stay neutral");
    assert_eq!(
        result.metrics.get("lifespan_resolved"),
        Some(&serde_json::json!(false))
    );
}

#[test]
fn short_lived_high_volume_account_scores_high() {
    let mut closed = account("a1", "p1", 0);
    closed.closed_at = Some(ts(10, 0));
    let txns: Vec<Transaction> = (0..4)
        .map(|i| internal_txn(&format!("t{i}"), i, 10, 20_000.0, "a1", "a2"))
        .collect();
    let dataset = AnalysisDataset::build(
        txns,
        vec![closed, account("a2", "p2", 0)],
        vec![
            partner("p1", RiskCategory::Standard),
            partner("p2", RiskCategory::Standard),
        ],
    )
    .expect("dataset");

    let result = assess(&dataset, "ephemeral_account", "a1");
    assert!(
        result.score >= 67,
        "10-day lifespan moving 80k must be high, got {}",
        result.score
    );
}

#[test]
fn zero_transaction_account_degrades_with_explicit_reasons() {
    let dataset = AnalysisDataset::build(
        vec![internal_txn("t1", 1, 10, 100.0, "a2", "a3")],
        vec![
            account("a1", "p1", 0),
            account("a2", "p2", 0),
            account("a3", "p3", 0),
        ],
        vec![
            partner("p1", RiskCategory::Standard),
            partner("p2", RiskCategory::Standard),
            partner("p3", RiskCategory::Standard),
        ],
    )
    .expect("dataset");

    for detector in per_account_registry() {
        let config = AnalysisConfig::default_illustrative();
        let result = detector.assess("a1", &dataset, &config);
        assert!(
            !result.reasons.is_empty(),
            "{} must justify its verdict even with no data",
            detector.name()
        );
        assert!(
            result.score <= 15,
            "{} must not raise risk on an inactive account, got {}",
            detector.name(),
            result.score
        );
    }
}

#[test]
fn rate_far_above_the_population_scores_high() {
    // Five background accounts trickle two transactions over a month each;
    // the hot account fires thirty in three days.
    let mut accounts = vec![account("hot", "p-hot", 0), account("sink", "p-sink", 0)];
    let mut partners = vec![
        partner("p-hot", RiskCategory::Standard),
        partner("p-sink", RiskCategory::Standard),
    ];
    let mut txns = Vec::new();
    for i in 0..5 {
        let id = format!("slow{i}");
        accounts.push(account(&id, &format!("p-{id}"), 0));
        partners.push(partner(&format!("p-{id}"), RiskCategory::Standard));
        txns.push(internal_txn(&format!("s{i}a"), 0, 9, 100.0, &id, "sink"));
        txns.push(internal_txn(&format!("s{i}b"), 30, 9, 100.0, &id, "sink"));
    }
    for i in 0..30 {
        txns.push(internal_txn(&format!("h{i}"), i / 10, 9, 100.0, "hot", "sink"));
    }
    let dataset = AnalysisDataset::build(txns, accounts, partners).expect("dataset");

    let hot = assess(&dataset, "frequency", "hot");
    let slow = assess(&dataset, "frequency", "slow0");
    assert!(
        hot.score >= 67,
        "ten transactions a day against a trickling population must be high, got {}",
        hot.score
    );
    assert!(
        hot.score > slow.score,
        "the hot account must outrank a background one ({} vs {})",
        hot.score,
        slow.score
    );
}

#[test]
fn erratic_rhythm_scores_against_a_steady_one() {
    // Erratic account: gaps swing between an hour and three weeks and one
    // amount jumps 500x. Steady account: daily, identical amounts.
    let base = ts(0, 10);
    let gap_hours = [1i64, 1, 500, 1, 500];
    let amounts = [10.0, 10.0, 10.0, 5_000.0, 10.0, 10.0];
    let mut at = base;
    let mut txns = Vec::new();
    for (i, amount) in amounts.iter().enumerate() {
        let mut t = internal_txn(&format!("e{i}"), 0, 10, *amount, "erratic", "sink");
        t.timestamp = at;
        txns.push(t);
        if i < gap_hours.len() {
            at += Duration::hours(gap_hours[i]);
        }
    }
    for i in 0..6 {
        txns.push(internal_txn(&format!("r{i}"), i, 10, 100.0, "steady", "sink"));
    }
    let dataset = AnalysisDataset::build(
        txns,
        vec![
            account("erratic", "p1", 0),
            account("steady", "p2", 0),
            account("sink", "p3", 0),
        ],
        vec![
            partner("p1", RiskCategory::Standard),
            partner("p2", RiskCategory::Standard),
            partner("p3", RiskCategory::Standard),
        ],
    )
    .expect("dataset");

    let erratic = assess(&dataset, "irregularity", "erratic");
    let steady = assess(&dataset, "irregularity", "steady");
    assert!(
        erratic.score >= 34,
        "wild gap and amount dispersion must land at least medium, got {}",
        erratic.score
    );
    assert_eq!(
        steady.score, 0,
        "a perfectly regular account has no dispersion to score"
    );
}

#[test]
fn days_old_account_moving_outsized_volume_scores_high() {
    // Background accounts are over a year old with 1,000 in volume; the
    // fresh one is four days old at dataset end and moves 20,000.
    let mut accounts = vec![account("fresh", "p-fresh", 95), account("sink", "p-sink", -400)];
    let mut partners = vec![
        partner("p-fresh", RiskCategory::Standard),
        partner("p-sink", RiskCategory::Standard),
    ];
    let mut txns = Vec::new();
    for i in 0..4 {
        let id = format!("old{i}");
        accounts.push(account(&id, &format!("p-{id}"), -400));
        partners.push(partner(&format!("p-{id}"), RiskCategory::Standard));
    }
    txns.push(internal_txn("o1", 0, 9, 500.0, "old0", "old1"));
    txns.push(internal_txn("o2", 60, 9, 500.0, "old0", "old1"));
    txns.push(internal_txn("o3", 0, 9, 500.0, "old2", "old3"));
    txns.push(internal_txn("o4", 60, 9, 500.0, "old2", "old3"));
    for i in 0..4 {
        txns.push(internal_txn(&format!("f{i}"), 96 + i, 9, 5_000.0, "fresh", "sink"));
    }
    let dataset = AnalysisDataset::build(txns, accounts, partners).expect("dataset");

    let fresh = assess(&dataset, "account_age", "fresh");
    let old = assess(&dataset, "account_age", "old0");
    assert!(
        fresh.score >= 67,
        "four days old moving 20x the median volume must be high, got {}",
        fresh.score
    );
    assert_eq!(old.score, 0, "established accounts score zero on age");
}

#[test]
fn recent_activity_surge_is_significant() {
    // Quiet baseline (one txn/month), then a 30x surge in the recent window.
    let mut txns: Vec<Transaction> = (0..4)
        .map(|i| internal_txn(&format!("b{i}"), i * 30, 10, 100.0, "a1", "a2"))
        .collect();
    for i in 0..30 {
        txns.push(internal_txn(
            &format!("r{i}"),
            125 + (i % 25),
            10,
            100.0,
            "a1",
            "a2",
        ));
    }
    let dataset = AnalysisDataset::build(
        txns,
        vec![account("a1", "p1", 0), account("a2", "p2", 0)],
        vec![
            partner("p1", RiskCategory::Standard),
            partner("p2", RiskCategory::Standard),
        ],
    )
    .expect("dataset");

    let result = assess(&dataset, "activity_change", "a1");
    assert!(
        result.score >= 40,
        "a surge past the significance ratio must score, got {}",
        result.score
    );
}
