//! Multiplicity: connected components over ownership, shared identity
//! attributes, and internal fund flows.

use amlrank_core::detectors::multiplicity::MultiplicityDetector;
use amlrank_core::{
    Account, AnalysisConfig, AnalysisDataset, Direction, Partner, RiskCategory, Transaction,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn ts(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::days(day)
}

fn internal_txn(id: &str, day: i64, src: &str, dst: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        timestamp: ts(day),
        amount: 500.0,
        currency: "USD".to_string(),
        direction: Direction::Debit,
        source_account_id: src.to_string(),
        target_account_id: dst.to_string(),
        is_internal: true,
        external_counterparty_account: None,
        external_counterparty_country: None,
    }
}

fn account(id: &str, owner: &str) -> Account {
    Account {
        id: id.to_string(),
        owner_partner_id: owner.to_string(),
        created_at: ts(0),
        closed_at: None,
    }
}

fn partner(id: &str) -> Partner {
    Partner {
        id: id.to_string(),
        name: format!("Partner {id}"),
        jurisdiction: "US".to_string(),
        risk_category: RiskCategory::Standard,
        address: None,
        contact: None,
        device_fingerprint: None,
    }
}

#[test]
fn same_owner_accounts_form_one_component() {
    // Five accounts, one owner: over the default cluster limit of 4.
    let accounts: Vec<Account> = (0..5).map(|i| account(&format!("a{i}"), "p1")).collect();
    let dataset = AnalysisDataset::build(vec![internal_txn("t", 0, "a0", "a1")], accounts, vec![partner("p1")])
        .expect("dataset");
    let config = AnalysisConfig::default_illustrative();

    let results = MultiplicityDetector::evaluate(&dataset, &config);
    assert_eq!(results.len(), 5);
    for (id, result) in &results {
        assert_eq!(
            result.metrics.get("component_size"),
            Some(&serde_json::json!(5)),
            "{id} must sit in the 5-account component"
        );
        assert!(
            result.score >= 50,
            "{id}: component over the cluster limit must elevate, got {}",
            result.score
        );
        assert!(!result.contaminated, "size 5 is under the hard limit of 8");
    }
}

#[test]
fn shared_address_links_distinct_owners() {
    let mut p1 = partner("p1");
    let mut p2 = partner("p2");
    p1.address = Some("1 Harbour Way".to_string());
    p2.address = Some("1 Harbour Way".to_string());
    let dataset = AnalysisDataset::build(
        vec![internal_txn("t", 0, "a1", "a1")],
        vec![account("a1", "p1"), account("a2", "p2")],
        vec![p1, p2],
    )
    .expect("dataset");
    let config = AnalysisConfig::default_illustrative();

    let results = MultiplicityDetector::evaluate(&dataset, &config);
    let a1 = &results["a1"];
    assert_eq!(
        a1.metrics.get("component_size"),
        Some(&serde_json::json!(2)),
        "shared address must merge the two owners' accounts"
    );
    assert!(a1.score > 0 && a1.score <= 30, "small component scores low");
}

#[test]
fn isolated_account_scores_zero() {
    let dataset = AnalysisDataset::build(
        vec![],
        vec![account("a1", "p1"), account("a2", "p2")],
        vec![partner("p1"), partner("p2")],
    )
    .expect("dataset");
    let config = AnalysisConfig::default_illustrative();

    let results = MultiplicityDetector::evaluate(&dataset, &config);
    assert_eq!(results["a1"].score, 0);
    assert_eq!(results["a2"].score, 0);
}

#[test]
fn star_shaped_fund_flow_earns_pattern_bonus() {
    // Hub h moves funds to four spokes, all distinct owners. The component
    // of 5 exceeds the limit and the hub shape adds the bonus.
    let mut accounts = vec![account("h", "ph")];
    let mut partners = vec![partner("ph")];
    let mut txns = Vec::new();
    for i in 0..4 {
        accounts.push(account(&format!("s{i}"), &format!("ps{i}")));
        partners.push(partner(&format!("ps{i}")));
        txns.push(internal_txn(&format!("t{i}"), i as i64, "h", &format!("s{i}")));
    }
    let dataset = AnalysisDataset::build(txns, accounts, partners).expect("dataset");
    let config = AnalysisConfig::default_illustrative();

    let results = MultiplicityDetector::evaluate(&dataset, &config);
    let hub = &results["h"];
    assert_eq!(hub.metrics.get("component_size"), Some(&serde_json::json!(5)));
    assert_eq!(hub.metrics.get("star_pattern"), Some(&serde_json::json!(true)));
    assert!(
        hub.score >= 65,
        "size excess plus star bonus, got {}",
        hub.score
    );
}

#[test]
fn oversized_component_sets_contamination() {
    // Nine accounts under one owner: past the hard limit of 8.
    let accounts: Vec<Account> = (0..9).map(|i| account(&format!("a{i}"), "p1")).collect();
    let dataset =
        AnalysisDataset::build(vec![], accounts, vec![partner("p1")]).expect("dataset");
    let config = AnalysisConfig::default_illustrative();

    let results = MultiplicityDetector::evaluate(&dataset, &config);
    for result in results.values() {
        assert!(
            result.contaminated,
            "a 9-account component must contaminate every member"
        );
    }
}

#[test]
fn per_account_view_matches_the_global_pass() {
    use amlrank_core::detector::FeatureDetector;

    let accounts: Vec<Account> = (0..3).map(|i| account(&format!("a{i}"), "p1")).collect();
    let dataset =
        AnalysisDataset::build(vec![], accounts, vec![partner("p1")]).expect("dataset");
    let config = AnalysisConfig::default_illustrative();

    let global = MultiplicityDetector::evaluate(&dataset, &config);
    let single = MultiplicityDetector.assess("a1", &dataset, &config);
    assert_eq!(single.score, global["a1"].score);
    assert_eq!(single.metrics, global["a1"].metrics);
}
