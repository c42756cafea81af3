//! Per-input signature digest
//!
//! The digest for input `i` is the id of a working copy of the transaction
//! in which every input's signature and public key are blank, except that
//! input `i`'s public key slot holds the locking hash of the output it
//! spends. Only one input is ever "visible" at a time.

use crate::crypto::PubKeyHash;

use super::encoding::compute_id;
use super::transaction::{Transaction, TransactionError, TxInput, TxOutput};
use super::utxo::PriorTransactions;

impl Transaction {
    /// Copy with every input's signature and public key cleared
    pub(crate) fn trimmed_copy(&self) -> Transaction {
        let inputs = self
            .inputs
            .iter()
            .map(|input| TxInput {
                prev_tx_id: input.prev_tx_id,
                output_index: input.output_index,
                signature: Vec::new(),
                public_key: Vec::new(),
            })
            .collect();

        Transaction {
            id: self.id,
            inputs,
            outputs: self.outputs.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// Resolve the output an input spends
pub(crate) fn referenced_output<'a>(
    input: &TxInput,
    prior: &'a PriorTransactions,
) -> Result<&'a TxOutput, TransactionError> {
    let prev_tx_id = input.prev_tx_id.ok_or_else(|| {
        TransactionError::InvalidTransaction("input does not reference a transaction".to_string())
    })?;

    let prev_tx = prior
        .get(&prev_tx_id)
        .ok_or(TransactionError::MissingPriorTransaction(prev_tx_id))?;

    usize::try_from(input.output_index)
        .ok()
        .and_then(|index| prev_tx.outputs.get(index))
        .ok_or(TransactionError::OutputIndexOutOfRange {
            tx_id: prev_tx_id,
            index: input.output_index,
        })
}

/// Digest for input `index` of a trimmed working copy
///
/// Leaves the working copy blank again so it can be reused for the next
/// input.
pub(crate) fn input_sighash(
    working: &mut Transaction,
    index: usize,
    locking_hash: &PubKeyHash,
) -> [u8; 32] {
    working.inputs[index].public_key = locking_hash.as_bytes().to_vec();
    working.set_id();
    working.inputs[index].public_key.clear();
    *working.id.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{TxId, BLOCK_REWARD};

    fn prior_with(tx: &Transaction) -> PriorTransactions {
        PriorTransactions::from([(tx.id, tx.clone())])
    }

    fn spend(prev: TxId, index: u32) -> Transaction {
        let mut input = TxInput::spending(prev, index, vec![4; 64]);
        input.signature = vec![5; 64];
        Transaction::new(
            vec![input, TxInput::spending(prev, index + 1, vec![6; 64])],
            vec![TxOutput::new(100, PubKeyHash([8; 20]))],
            99,
        )
    }

    #[test]
    fn test_trimmed_copy_blanks_unlock_data() {
        let tx = spend(TxId([1; 32]), 0);
        let copy = tx.trimmed_copy();

        assert_eq!(copy.outputs, tx.outputs);
        assert_eq!(copy.timestamp, tx.timestamp);
        for (blank, original) in copy.inputs.iter().zip(&tx.inputs) {
            assert!(blank.signature.is_empty());
            assert!(blank.public_key.is_empty());
            assert_eq!(blank.prev_tx_id, original.prev_tx_id);
            assert_eq!(blank.output_index, original.output_index);
        }
    }

    #[test]
    fn test_sighash_is_per_input_and_restores_copy() {
        let tx = spend(TxId([1; 32]), 0);
        let hash = PubKeyHash([3; 20]);
        let mut working = tx.trimmed_copy();
        let pristine = working.clone();

        let first = input_sighash(&mut working, 0, &hash);
        assert_eq!(working.inputs, pristine.inputs);

        let second = input_sighash(&mut working, 1, &hash);
        assert_ne!(first, second);

        // same construction from a fresh copy gives the same digest
        let mut fresh = tx.trimmed_copy();
        assert_eq!(input_sighash(&mut fresh, 0, &hash), first);
    }

    #[test]
    fn test_sighash_ignores_unlock_data_of_original() {
        let tx = spend(TxId([1; 32]), 0);
        let mut other = tx.clone();
        other.inputs[0].signature = vec![0xee; 64];
        other.inputs[1].public_key = vec![0xdd; 64];

        let hash = PubKeyHash([3; 20]);
        assert_eq!(
            input_sighash(&mut tx.trimmed_copy(), 1, &hash),
            input_sighash(&mut other.trimmed_copy(), 1, &hash)
        );
    }

    #[test]
    fn test_referenced_output_resolution() {
        let prev = Transaction::coinbase(PubKeyHash([2; 20]), BLOCK_REWARD, b"x", 1);
        let prior = prior_with(&prev);

        let ok = TxInput::spending(prev.id, 0, vec![]);
        assert_eq!(
            referenced_output(&ok, &prior).unwrap().locking_hash,
            PubKeyHash([2; 20])
        );

        let out_of_range = TxInput::spending(prev.id, 1, vec![]);
        assert_eq!(
            referenced_output(&out_of_range, &prior),
            Err(TransactionError::OutputIndexOutOfRange {
                tx_id: prev.id,
                index: 1
            })
        );

        let missing = TxInput::spending(TxId([9; 32]), 0, vec![]);
        assert_eq!(
            referenced_output(&missing, &prior),
            Err(TransactionError::MissingPriorTransaction(TxId([9; 32])))
        );

        let mut negative = TxInput::spending(prev.id, 0, vec![]);
        negative.output_index = -1;
        assert!(matches!(
            referenced_output(&negative, &prior),
            Err(TransactionError::OutputIndexOutOfRange { .. })
        ));
    }
}
