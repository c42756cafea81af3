//! Canonical transaction encoding
//!
//! Fixed field order, little-endian integers, `u32` length prefix on every
//! byte string. Inputs and outputs are written in sequence order and are
//! never sorted or deduplicated. The transaction id is not part of its own
//! encoding.

use crate::crypto::sha256;

use super::transaction::{Transaction, TxId, TxInput, TxOutput};

/// Types with a single deterministic byte encoding
pub trait CanonicalEncode {
    fn encode_to(&self, out: &mut Vec<u8>);

    fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_to(&mut out);
        out
    }
}

fn put_len(out: &mut Vec<u8>, len: usize) {
    out.extend_from_slice(&(len as u32).to_le_bytes());
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    put_len(out, bytes.len());
    out.extend_from_slice(bytes);
}

impl CanonicalEncode for TxInput {
    fn encode_to(&self, out: &mut Vec<u8>) {
        match &self.prev_tx_id {
            Some(id) => put_bytes(out, id.as_bytes()),
            None => put_len(out, 0),
        }
        out.extend_from_slice(&self.output_index.to_le_bytes());
        put_bytes(out, &self.signature);
        put_bytes(out, &self.public_key);
    }
}

impl CanonicalEncode for TxOutput {
    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.value.to_le_bytes());
        put_bytes(out, self.locking_hash.as_bytes());
    }
}

impl CanonicalEncode for Transaction {
    fn encode_to(&self, out: &mut Vec<u8>) {
        put_len(out, self.inputs.len());
        for input in &self.inputs {
            input.encode_to(out);
        }
        put_len(out, self.outputs.len());
        for output in &self.outputs {
            output.encode_to(out);
        }
        out.extend_from_slice(&self.timestamp.to_le_bytes());
    }
}

/// SHA-256 of the canonical encoding of (inputs, outputs, timestamp)
pub fn compute_id(tx: &Transaction) -> TxId {
    TxId(sha256(&tx.canonical_bytes()))
}
