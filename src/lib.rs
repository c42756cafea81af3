//! Transaction layer of a UTXO ledger
//!
//! This crate provides:
//! - Canonical transaction encoding and SHA-256 transaction ids
//! - Coinbase and payment construction with change outputs
//! - Per-input ECDSA signatures (secp256k1) over an isolated sighash
//! - Verification that binds each input's key to the output it spends
//! - Base58Check pay-to-public-key-hash addresses
//!
//! Wallet storage and the UTXO set are collaborators passed in through the
//! [`wallet::WalletStore`] and [`core::UtxoSource`] traits; an in-memory
//! [`storage::MemoryLedger`] is included for wiring things together.
//!
//! # Example
//!
//! ```rust
//! use utxo_tx::config::FactoryConfig;
//! use utxo_tx::core::{TransactionFactory, COIN};
//! use utxo_tx::crypto::KeyPair;
//! use utxo_tx::storage::MemoryLedger;
//! use utxo_tx::wallet::Wallets;
//!
//! let mut wallets = Wallets::new();
//! let alice = wallets.add(KeyPair::generate());
//! let bob = wallets.add(KeyPair::generate());
//!
//! let factory = TransactionFactory::new(&wallets, FactoryConfig::default());
//! let mut ledger = MemoryLedger::new();
//!
//! // Reward alice, then pay bob 5 coins out of it
//! ledger.accept(factory.new_coinbase(&alice, "genesis").unwrap()).unwrap();
//! let tx = factory.new_transaction(&alice, &bob, 5 * COIN, &ledger).unwrap();
//!
//! let prior = ledger.prior_transactions(&tx).unwrap();
//! assert!(tx.verify(&prior));
//! ledger.accept(tx).unwrap();
//! ```

pub mod config;
pub mod core;
pub mod crypto;
pub mod storage;
pub mod wallet;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::FactoryConfig;
pub use crate::core::{
    Amount, PriorTransactions, Transaction, TransactionError, TransactionFactory, TxId, TxInput,
    TxOutput, UtxoSource, BLOCK_REWARD, COIN,
};
pub use crypto::{AddressCodec, Base58Check, KeyPair, PubKeyHash};
pub use storage::MemoryLedger;
pub use wallet::{WalletManager, WalletStore, Wallets};
