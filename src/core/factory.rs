//! Transaction factory
//!
//! Builds coinbase transactions and standard payments. Wallet keys, the
//! UTXO set and the address policy are passed in, never reached for.

use std::collections::BTreeSet;

use chrono::Utc;

use crate::config::FactoryConfig;
use crate::crypto::{AddressCodec, Base58Check};
use crate::wallet::WalletStore;

use super::transaction::{format_amount, Amount, Transaction, TransactionError, TxInput, TxOutput};
use super::utxo::{PriorTransactions, UtxoSource};

/// Builds and signs transactions for the wallets in `W`
pub struct TransactionFactory<'w, W: WalletStore, C: AddressCodec = Base58Check> {
    wallets: &'w W,
    codec: C,
    config: FactoryConfig,
}

impl<'w, W: WalletStore> TransactionFactory<'w, W, Base58Check> {
    /// Factory using Base58Check addresses with the configured version byte
    pub fn new(wallets: &'w W, config: FactoryConfig) -> Self {
        let codec = Base58Check::new(config.address_version);
        Self::with_codec(wallets, codec, config)
    }
}

impl<'w, W: WalletStore, C: AddressCodec> TransactionFactory<'w, W, C> {
    pub fn with_codec(wallets: &'w W, codec: C, config: FactoryConfig) -> Self {
        Self {
            wallets,
            codec,
            config,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Miner reward paying `coinbase_reward` to `miner_address`
    ///
    /// `data` is recorded in the synthetic input's public key slot.
    pub fn new_coinbase(
        &self,
        miner_address: &str,
        data: &str,
    ) -> Result<Transaction, TransactionError> {
        let locking_hash = self.codec.address_to_locking_hash(miner_address)?;
        let tx = Transaction::coinbase(
            locking_hash,
            self.config.coinbase_reward,
            data.as_bytes(),
            Utc::now().timestamp(),
        );

        log::info!(
            "Created coinbase {} paying {} to {}",
            tx.id,
            format_amount(self.config.coinbase_reward),
            miner_address
        );
        Ok(tx)
    }

    /// Pay `amount` from `from` to `to`, returning change to `from`
    ///
    /// Nothing is created unless every input is signed.
    pub fn new_transaction<U: UtxoSource>(
        &self,
        from: &str,
        to: &str,
        amount: Amount,
        utxos: &U,
    ) -> Result<Transaction, TransactionError> {
        if amount == 0 {
            return Err(TransactionError::InvalidTransaction(
                "amount must be positive".to_string(),
            ));
        }

        let key_pair = self
            .wallets
            .lookup(from)
            .ok_or_else(|| TransactionError::WalletNotFound(from.to_string()))?;
        let public_key = key_pair.raw_public_key();
        let from_hash = self.codec.public_key_to_locking_hash(public_key.as_bytes());
        let to_hash = self.codec.address_to_locking_hash(to)?;

        let spendable = utxos.find_spendable_outputs(&from_hash, amount);
        if spendable.total < amount {
            return Err(TransactionError::InsufficientFunds {
                have: spendable.total,
                need: amount,
            });
        }

        let inputs: Vec<TxInput> = spendable
            .out_points()
            .map(|point| TxInput::spending(point.tx_id, point.index, public_key.as_bytes().to_vec()))
            .collect();

        let mut outputs = vec![TxOutput::new(amount, to_hash)];
        let change = spendable.total - amount;
        if change > 0 {
            outputs.push(TxOutput::new(change, from_hash));
        }

        let mut tx = Transaction::new(inputs, outputs, Utc::now().timestamp());

        let referenced: BTreeSet<_> = tx.inputs.iter().filter_map(|i| i.prev_tx_id).collect();
        let prior: PriorTransactions = referenced
            .into_iter()
            .filter_map(|id| utxos.transaction(&id).map(|prev| (id, prev.clone())))
            .collect();

        tx.sign(&key_pair.secret_key, &prior).map_err(|e| match e {
            failed @ TransactionError::SigningFailed(_) => failed,
            other => TransactionError::SigningFailed(other.to_string()),
        })?;

        log::info!(
            "Created transaction {} sending {} from {} to {} ({} inputs, change {})",
            tx.id,
            format_amount(amount),
            from,
            to,
            tx.inputs.len(),
            format_amount(change)
        );
        Ok(tx)
    }
}
