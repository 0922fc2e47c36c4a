//! Shared primitive types used across the entire engine.

/// A stable, unique identifier for an account.
pub type AccountId = String;

/// A stable, unique identifier for a partner (account owner or counterparty).
pub type PartnerId = String;

/// A stable, unique identifier for a transaction.
pub type TransactionId = String;
