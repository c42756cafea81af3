//! Wallet module: key lookup for the transaction factory

pub mod wallet;

pub use wallet::{Wallet, WalletError, WalletManager, WalletStore, Wallets};
