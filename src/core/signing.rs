//! Signing engine
//!
//! Produces one signature per input over that input's isolated digest.

use secp256k1::SecretKey;

use crate::crypto::sign_digest;

use super::sighash::{input_sighash, referenced_output};
use super::transaction::{Transaction, TransactionError};
use super::utxo::PriorTransactions;

impl Transaction {
    /// Sign every input in sequence order
    ///
    /// Coinbase transactions are left untouched. On error, inputs before the
    /// failing one may already carry signatures; the caller must discard the
    /// transaction.
    pub fn sign(
        &mut self,
        secret_key: &SecretKey,
        prior: &PriorTransactions,
    ) -> Result<(), TransactionError> {
        if self.is_coinbase() {
            return Ok(());
        }

        if self.inputs.is_empty() {
            return Err(TransactionError::InvalidTransaction(
                "transaction has no inputs".to_string(),
            ));
        }

        let mut working = self.trimmed_copy();

        for index in 0..self.inputs.len() {
            let locking_hash = referenced_output(&self.inputs[index], prior)?.locking_hash;
            let digest = input_sighash(&mut working, index, &locking_hash);

            let signature = sign_digest(secret_key, &digest)
                .map_err(|e| TransactionError::SigningFailed(e.to_string()))?;

            log::debug!("Signed input {} of transaction {}", index, self.id);
            self.inputs[index].signature = signature.as_bytes().to_vec();
        }

        Ok(())
    }
}
