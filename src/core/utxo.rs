//! Interfaces to the ledger that owns committed transactions

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::crypto::PubKeyHash;

use super::transaction::{Amount, Transaction, TransactionError, TxId};

/// Prior transactions referenced by a transaction's inputs, keyed by id
pub type PriorTransactions = HashMap<TxId, Transaction>;

/// Reference to one output of one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutPoint {
    pub tx_id: TxId,
    pub index: u32,
}

impl OutPoint {
    pub fn new(tx_id: TxId, index: u32) -> Self {
        Self { tx_id, index }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.index)
    }
}

/// Outputs picked to fund a payment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpendableOutputs {
    /// Referenced transaction -> selected output indices
    pub outputs: BTreeMap<TxId, Vec<u32>>,
    /// Sum of the selected outputs' values
    pub total: Amount,
}

impl SpendableOutputs {
    /// Select `out_point`; nothing is selected if the total would overflow
    pub fn add(&mut self, out_point: OutPoint, value: Amount) -> Result<(), TransactionError> {
        self.total = self.total.checked_add(value).ok_or_else(|| {
            TransactionError::InvalidTransaction(format!(
                "selecting {} overflows the selected total",
                out_point
            ))
        })?;
        self.outputs
            .entry(out_point.tx_id)
            .or_default()
            .push(out_point.index);
        Ok(())
    }

    /// Selected out points, in the order inputs will be built from them
    pub fn out_points(&self) -> impl Iterator<Item = OutPoint> + '_ {
        self.outputs.iter().flat_map(|(tx_id, indices)| {
            indices.iter().map(move |index| OutPoint::new(*tx_id, *index))
        })
    }
}

/// Source of unspent outputs and the transactions that hold them
pub trait UtxoSource {
    /// Select unspent outputs locked to `locking_hash` until their total
    /// reaches `min_amount`, or return everything available if it never does
    fn find_spendable_outputs(&self, locking_hash: &PubKeyHash, min_amount: Amount)
        -> SpendableOutputs;

    /// Look up a recorded transaction by id
    fn transaction(&self, id: &TxId) -> Option<&Transaction>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spendable_outputs_accumulate() {
        let a = TxId([1; 32]);
        let b = TxId([2; 32]);

        let mut selected = SpendableOutputs::default();
        selected.add(OutPoint::new(b, 0), 30).unwrap();
        selected.add(OutPoint::new(a, 2), 10).unwrap();
        selected.add(OutPoint::new(a, 1), 5).unwrap();

        assert_eq!(selected.total, 45);
        assert_eq!(selected.outputs[&a], vec![2, 1]);

        let points: Vec<_> = selected.out_points().collect();
        assert_eq!(
            points,
            vec![OutPoint::new(a, 2), OutPoint::new(a, 1), OutPoint::new(b, 0)]
        );
    }

    #[test]
    fn test_selection_total_overflow() {
        let mut selected = SpendableOutputs::default();
        selected.add(OutPoint::new(TxId([1; 32]), 0), Amount::MAX).unwrap();

        assert!(matches!(
            selected.add(OutPoint::new(TxId([2; 32]), 0), 1),
            Err(TransactionError::InvalidTransaction(_))
        ));
        assert_eq!(selected.total, Amount::MAX);
        assert_eq!(selected.out_points().count(), 1);
    }

    #[test]
    fn test_out_point_display() {
        let point = OutPoint::new(TxId([0; 32]), 3);
        assert!(point.to_string().ends_with(":3"));
    }
}
