//! Core transaction components
//!
//! This module contains:
//! - Transactions (inputs, outputs, coinbase shape)
//! - Canonical encoding and transaction ids
//! - Per-input sighash, signing and verification
//! - The factory that builds coinbase and payment transactions
//! - Interfaces to the ledger's UTXO set

pub mod encoding;
pub mod factory;
pub mod sighash;
pub mod signing;
pub mod transaction;
pub mod utxo;
pub mod verification;

pub use encoding::{compute_id, CanonicalEncode};
pub use factory::TransactionFactory;
pub use transaction::{
    format_amount, Amount, Transaction, TransactionError, TxId, TxInput, TxOutput, BLOCK_REWARD,
    COIN, COINBASE_OUTPUT_INDEX,
};
pub use utxo::{OutPoint, PriorTransactions, SpendableOutputs, UtxoSource};
