//! Normalized entity records consumed by the engine.
//!
//! These are read-only inputs, sourced once per analysis run. Detectors
//! read them and never mutate them; assessments carry no back-references
//! into this model.

use crate::types::{AccountId, PartnerId, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether money moved out of (`debit`) or into (`credit`) the source side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

/// Graded counterparty risk as assigned by onboarding/screening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "elevated")]
    Elevated,
    #[serde(rename = "sanctioned-adjacent")]
    SanctionedAdjacent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub timestamp: DateTime<Utc>,
    /// Non-negative. Records violating this are dropped at dataset build.
    pub amount: f64,
    pub currency: String,
    pub direction: Direction,
    pub source_account_id: AccountId,
    pub target_account_id: AccountId,
    pub is_internal: bool,
    #[serde(default)]
    pub external_counterparty_account: Option<String>,
    /// ISO country code. Absence on an external transaction means
    /// "unknown jurisdiction", not an error.
    #[serde(default)]
    pub external_counterparty_country: Option<String>,
}

impl Transaction {
    /// True if the given account is either side of this transaction.
    pub fn involves(&self, account_id: &str) -> bool {
        self.source_account_id == account_id || self.target_account_id == account_id
    }

    /// The opposite internal account, if this transaction is internal.
    pub fn internal_counterparty(&self, account_id: &str) -> Option<&str> {
        if !self.is_internal {
            return None;
        }
        if self.source_account_id == account_id {
            Some(&self.target_account_id)
        } else if self.target_account_id == account_id {
            Some(&self.source_account_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub owner_partner_id: PartnerId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Invariant check: `closed_at`, if present, must be >= `created_at`.
    /// Violations exclude the account from ranking; they never abort a run.
    pub fn structural_violation(&self) -> Option<String> {
        match self.closed_at {
            Some(closed) if closed < self.created_at => Some(format!(
                "closed_at {} precedes created_at {}",
                closed.to_rfc3339(),
                self.created_at.to_rfc3339()
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    /// ISO country code of the partner's home jurisdiction.
    pub jurisdiction: String,
    pub risk_category: RiskCategory,
    // Shared identifying attributes used for multiplicity detection.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub device_fingerprint: Option<String>,
}
