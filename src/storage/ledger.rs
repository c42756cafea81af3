//! In-memory reference ledger
//!
//! Records accepted transactions and tracks which of their outputs are
//! still unspent. Serves as the `UtxoSource` for the transaction factory
//! and as the supplier of prior transactions for signing and verification.

use std::collections::{HashMap, HashSet};

use crate::core::transaction::{format_amount, Amount, Transaction, TransactionError, TxId};
use crate::core::utxo::{OutPoint, PriorTransactions, SpendableOutputs, UtxoSource};
use crate::crypto::PubKeyHash;

/// Accepted transactions plus the unspent subset of their outputs
#[derive(Debug, Default)]
pub struct MemoryLedger {
    /// Transactions by id
    transactions: HashMap<TxId, Transaction>,
    /// Acceptance order, used for stable UTXO selection
    order: Vec<TxId>,
    /// Outputs not yet consumed by an accepted input
    unspent: HashSet<OutPoint>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_unspent(&self, out_point: &OutPoint) -> bool {
        self.unspent.contains(out_point)
    }

    /// Prior transactions referenced by `tx`'s inputs
    pub fn prior_transactions(&self, tx: &Transaction) -> Result<PriorTransactions, TransactionError> {
        let mut prior = PriorTransactions::new();
        if tx.is_coinbase() {
            return Ok(prior);
        }

        for input in &tx.inputs {
            let Some(prev_id) = input.prev_tx_id else {
                continue;
            };
            let prev = self
                .transactions
                .get(&prev_id)
                .ok_or(TransactionError::MissingPriorTransaction(prev_id))?;
            prior.entry(prev_id).or_insert_with(|| prev.clone());
        }

        Ok(prior)
    }

    /// Verify `tx` and record it
    ///
    /// Rejects duplicates, bad signatures, already-spent or repeated
    /// inputs, and outputs worth more than the inputs.
    pub fn accept(&mut self, tx: Transaction) -> Result<(), TransactionError> {
        if self.transactions.contains_key(&tx.id) {
            return Err(TransactionError::InvalidTransaction(format!(
                "transaction {} already recorded",
                tx.id
            )));
        }

        let total = tx.total_output().ok_or_else(|| {
            TransactionError::InvalidTransaction(format!(
                "outputs of {} overflow the amount range",
                tx.id
            ))
        })?;

        let spent = if tx.is_coinbase() {
            Vec::new()
        } else {
            let prior = self.prior_transactions(&tx)?;
            tx.check_signatures(&prior)?;
            self.check_spendable(&tx, &prior, total)?
        };

        for point in &spent {
            self.unspent.remove(point);
        }
        for index in 0..tx.outputs.len() {
            self.unspent.insert(OutPoint::new(tx.id, index as u32));
        }

        log::info!(
            "Accepted transaction {} ({} inputs, {} outputs, {})",
            tx.id,
            tx.inputs.len(),
            tx.outputs.len(),
            format_amount(total)
        );
        self.order.push(tx.id);
        self.transactions.insert(tx.id, tx);
        Ok(())
    }

    /// Out points consumed by `tx`, once they are known to be spendable
    fn check_spendable(
        &self,
        tx: &Transaction,
        prior: &PriorTransactions,
        output_total: Amount,
    ) -> Result<Vec<OutPoint>, TransactionError> {
        let mut spent = Vec::with_capacity(tx.inputs.len());
        let mut input_total: Amount = 0;

        for input in &tx.inputs {
            let (Some(prev_id), Ok(index)) = (input.prev_tx_id, u32::try_from(input.output_index))
            else {
                return Err(TransactionError::InvalidTransaction(
                    "input does not reference an output".to_string(),
                ));
            };
            let point = OutPoint::new(prev_id, index);

            if !self.unspent.contains(&point) || spent.contains(&point) {
                return Err(TransactionError::InvalidTransaction(format!(
                    "output {} is already spent",
                    point
                )));
            }

            // checked during signature verification
            if let Some(output) = prior
                .get(&prev_id)
                .and_then(|prev| prev.outputs.get(index as usize))
            {
                input_total = input_total.checked_add(output.value).ok_or_else(|| {
                    TransactionError::InvalidTransaction(format!(
                        "inputs of {} overflow the amount range",
                        tx.id
                    ))
                })?;
            }
            spent.push(point);
        }

        if output_total > input_total {
            return Err(TransactionError::InvalidTransaction(format!(
                "outputs {} exceed inputs {}",
                format_amount(output_total),
                format_amount(input_total)
            )));
        }

        Ok(spent)
    }

    /// Sum of unspent outputs locked to `locking_hash`
    pub fn balance(&self, locking_hash: &PubKeyHash) -> Amount {
        self.unspent_outputs(locking_hash)
            .fold(0, |total: Amount, (_, value)| total.saturating_add(value))
    }

    fn unspent_outputs<'a>(
        &'a self,
        locking_hash: &'a PubKeyHash,
    ) -> impl Iterator<Item = (OutPoint, Amount)> + 'a {
        self.order
            .iter()
            .filter_map(move |id| self.transactions.get(id))
            .flat_map(move |tx| {
                tx.outputs
                    .iter()
                    .enumerate()
                    .filter(move |(_, output)| output.is_locked_with(locking_hash))
                    .map(move |(index, output)| (OutPoint::new(tx.id, index as u32), output.value))
            })
            .filter(move |(point, _)| self.unspent.contains(point))
    }
}

impl UtxoSource for MemoryLedger {
    /// First fit in acceptance order, stopping once `min_amount` is covered
    fn find_spendable_outputs(
        &self,
        locking_hash: &PubKeyHash,
        min_amount: Amount,
    ) -> SpendableOutputs {
        let mut selected = SpendableOutputs::default();

        for (point, value) in self.unspent_outputs(locking_hash) {
            if selected.total >= min_amount {
                break;
            }
            if let Err(e) = selected.add(point, value) {
                log::warn!("Stopping selection for {}: {}", locking_hash, e);
                break;
            }
        }

        log::debug!(
            "Selected {} for {} (wanted {})",
            format_amount(selected.total),
            locking_hash,
            format_amount(min_amount)
        );
        selected
    }

    fn transaction(&self, id: &TxId) -> Option<&Transaction> {
        self.transactions.get(id)
    }
}
