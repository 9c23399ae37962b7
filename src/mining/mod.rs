//! Offline frequent-itemset mining over symptom profiles.
//!
//! Independent of the request path: reads a vocabulary snapshot, never the
//! matching engine.

pub mod apriori;

pub use apriori::{apriori, transactions_from_snapshot, FrequentItemset, Transaction};

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum MiningError {
    #[error("Minimum support must be in (0, 1], got {0}")]
    InvalidSupport(f64),

    #[error("No transactions to mine")]
    EmptyTransactions,
}
