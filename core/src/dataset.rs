//! The materialized dataset snapshot detectors read from.
//!
//! Built once per run from the three input record collections, then
//! treated as immutable. Index maps are keyed by stable entity identifiers
//! so whole-dataset passes stay allocation-predictable and reads are
//! parallel-safe.

use crate::error::{AnalysisError, AnalysisResult};
use crate::model::{Account, Partner, Transaction};
use crate::types::{AccountId, PartnerId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug)]
pub struct AnalysisDataset {
    transactions: Vec<Transaction>,
    accounts: Vec<Account>,
    partners: Vec<Partner>,
    /// account id → indices into `transactions`, sorted by (timestamp, id).
    txns_by_account: HashMap<AccountId, Vec<usize>>,
    account_index: HashMap<AccountId, usize>,
    partner_index: HashMap<PartnerId, usize>,
    /// Latest transaction timestamp; the deterministic "now" for age math.
    reference_time: DateTime<Utc>,
    /// Accounts excluded from ranking for invariant breaches, with reasons.
    invalid_accounts: Vec<(AccountId, String)>,
    dropped_transactions: usize,
    /// Per-account activity profiles over accounts with at least one
    /// transaction, computed once so detectors that compare against the
    /// population do not rescan the dataset per account.
    rates_by_account: HashMap<AccountId, f64>,
    volumes_by_account: HashMap<AccountId, f64>,
    population_rates: Vec<f64>,
    population_volumes_sorted: Vec<f64>,
}

impl AnalysisDataset {
    /// Materialize the snapshot. Fails only on whole-dataset
    /// unavailability (no accounts at all); bad individual records are
    /// dropped or excluded with a logged reason.
    pub fn build(
        transactions: Vec<Transaction>,
        accounts: Vec<Account>,
        partners: Vec<Partner>,
    ) -> AnalysisResult<Self> {
        if accounts.is_empty() {
            return Err(AnalysisError::EmptyDataset(
                "no account records supplied".into(),
            ));
        }

        let mut kept = Vec::with_capacity(transactions.len());
        let mut dropped = 0usize;
        for txn in transactions {
            if !txn.amount.is_finite() || txn.amount < 0.0 {
                log::warn!(
                    "transaction={} dropped: amount {} violates the non-negative invariant",
                    txn.id,
                    txn.amount
                );
                dropped += 1;
                continue;
            }
            kept.push(txn);
        }

        let mut invalid_accounts = Vec::new();
        for account in &accounts {
            if let Some(reason) = account.structural_violation() {
                log::warn!("account={} excluded from ranking: {reason}", account.id);
                invalid_accounts.push((account.id.clone(), reason));
            }
        }

        let account_index: HashMap<AccountId, usize> = accounts
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.clone(), i))
            .collect();
        let partner_index: HashMap<PartnerId, usize> = partners
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();

        let mut txns_by_account: HashMap<AccountId, Vec<usize>> = HashMap::new();
        for (i, txn) in kept.iter().enumerate() {
            for side in [&txn.source_account_id, &txn.target_account_id] {
                if account_index.contains_key(side) {
                    let entry = txns_by_account.entry(side.clone()).or_default();
                    // Self-transfers appear once, not twice.
                    if entry.last() != Some(&i) {
                        entry.push(i);
                    }
                }
            }
        }
        for indices in txns_by_account.values_mut() {
            indices.sort_by(|a, b| {
                kept[*a]
                    .timestamp
                    .cmp(&kept[*b].timestamp)
                    .then_with(|| kept[*a].id.cmp(&kept[*b].id))
            });
        }

        let reference_time = kept
            .iter()
            .map(|t| t.timestamp)
            .max()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let mut rates_by_account = HashMap::new();
        let mut volumes_by_account = HashMap::new();
        let mut population_rates = Vec::new();
        let mut population_volumes = Vec::new();
        for account in &accounts {
            let Some(indices) = txns_by_account.get(&account.id) else {
                continue;
            };
            if indices.is_empty() {
                continue;
            }
            let first = kept[indices[0]].timestamp;
            let last = kept[indices[indices.len() - 1]].timestamp;
            let days = ((last - first).num_days() + 1).max(1) as f64;
            let rate = indices.len() as f64 / days;
            let volume: f64 = indices.iter().map(|i| kept[*i].amount).sum();
            rates_by_account.insert(account.id.clone(), rate);
            volumes_by_account.insert(account.id.clone(), volume);
            population_rates.push(rate);
            population_volumes.push(volume);
        }
        population_volumes.sort_by(|a, b| a.total_cmp(b));

        Ok(Self {
            transactions: kept,
            accounts,
            partners,
            txns_by_account,
            account_index,
            partner_index,
            reference_time,
            invalid_accounts,
            dropped_transactions: dropped,
            rates_by_account,
            volumes_by_account,
            population_rates,
            population_volumes_sorted: population_volumes,
        })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn partners(&self) -> &[Partner] {
        &self.partners
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.account_index.get(id).map(|i| &self.accounts[*i])
    }

    pub fn partner(&self, id: &str) -> Option<&Partner> {
        self.partner_index.get(id).map(|i| &self.partners[*i])
    }

    /// This account's transactions, sorted by timestamp then id.
    pub fn account_transactions(&self, id: &str) -> Vec<&Transaction> {
        self.txns_by_account
            .get(id)
            .map(|indices| indices.iter().map(|i| &self.transactions[*i]).collect())
            .unwrap_or_default()
    }

    /// The partner on the other side of an internal transaction, resolved
    /// through the counterparty account's owner.
    pub fn counterparty_partner(&self, account_id: &str, txn: &Transaction) -> Option<&Partner> {
        let other = txn.internal_counterparty(account_id)?;
        let account = self.account(other)?;
        self.partner(&account.owner_partner_id)
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }

    pub fn invalid_accounts(&self) -> &[(AccountId, String)] {
        &self.invalid_accounts
    }

    pub fn dropped_transactions(&self) -> usize {
        self.dropped_transactions
    }

    /// Transactions per day over the account's first-to-last span, with a
    /// one-day floor. None for accounts without activity.
    pub fn account_rate(&self, id: &str) -> Option<f64> {
        self.rates_by_account.get(id).copied()
    }

    /// Total transacted volume. None for accounts without activity.
    pub fn account_volume(&self, id: &str) -> Option<f64> {
        self.volumes_by_account.get(id).copied()
    }

    /// Per-account transaction rates across every account with activity.
    pub fn population_rates(&self) -> &[f64] {
        &self.population_rates
    }

    /// Per-account transacted volumes across every account with activity,
    /// sorted ascending for quantile lookups.
    pub fn population_volumes_sorted(&self) -> &[f64] {
        &self.population_volumes_sorted
    }

    /// Ids of structurally valid accounts, sorted for reproducible
    /// iteration regardless of input order.
    pub fn valid_account_ids(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self
            .accounts
            .iter()
            .filter(|a| a.structural_violation().is_none())
            .map(|a| a.id.clone())
            .collect();
        ids.sort();
        ids
    }
}
