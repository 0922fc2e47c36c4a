//! The eleven feature detectors, one module each.

pub mod account_age;
pub mod activity_change;
pub mod atypical_amounts;
pub mod burst_structuring;
pub mod counterparty_risk;
pub mod cross_border;
pub mod ephemeral_account;
pub mod frequency;
pub mod irregularity;
pub mod multiplicity;
pub mod night_activity;
