//! Transaction data model
//!
//! Implements the UTXO transaction entities: outputs lock value to a
//! public-key hash, inputs reference a prior output by (transaction id,
//! index) and carry the proof that the spender owns it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::crypto::{AddressError, KeyError, PubKeyHash};

use super::encoding::compute_id;

// =============================================================================
// Constants
// =============================================================================

/// Monetary value in base units
pub type Amount = u64;

/// Base units per coin
pub const COIN: Amount = 100_000_000;

/// Default miner reward: 12.5 coins
pub const BLOCK_REWARD: Amount = 12 * COIN + COIN / 2;

/// Output index carried by a coinbase input
pub const COINBASE_OUTPUT_INDEX: i64 = -1;

/// Render an amount as whole coins with eight decimals
pub fn format_amount(amount: Amount) -> String {
    format!("{}.{:08}", amount / COIN, amount % COIN)
}

// =============================================================================
// Error Types
// =============================================================================

/// Transaction-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("No wallet found for address {0}")]
    WalletNotFound(String),
    #[error("Insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: Amount, need: Amount },
    #[error("Referenced transaction {0} is not available")]
    MissingPriorTransaction(TxId),
    #[error("Output index {index} out of range in transaction {tx_id}")]
    OutputIndexOutOfRange { tx_id: TxId, index: i64 },
    #[error("Signing failed: {0}")]
    SigningFailed(String),
    #[error("Malformed signature or public key in input {input}: {source}")]
    MalformedSignatureOrKey { input: usize, source: KeyError },
    #[error("Invalid signature in input {input}")]
    InvalidSignature { input: usize },
    #[error("Public key of input {input} does not hash to the referenced locking hash")]
    OwnerMismatch { input: usize },
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
}

// =============================================================================
// Transaction ID
// =============================================================================

/// 256-bit transaction identifier (SHA-256 of the canonical encoding)
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self)
    }
}

impl FromStr for TxId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for TxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Transaction Input
// =============================================================================

/// Transaction input (reference to a previous output plus its unlock data)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxInput {
    /// Transaction holding the referenced output; `None` for coinbase
    pub prev_tx_id: Option<TxId>,
    /// Index into that transaction's outputs; `-1` for coinbase
    pub output_index: i64,
    /// r || s, empty until signed
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
    /// X || Y of the spender's key; arbitrary miner data for coinbase
    #[serde(with = "hex::serde")]
    pub public_key: Vec<u8>,
}

impl TxInput {
    /// Unsigned input spending `prev_tx_id:output_index`
    pub fn spending(prev_tx_id: TxId, output_index: u32, public_key: Vec<u8>) -> Self {
        Self {
            prev_tx_id: Some(prev_tx_id),
            output_index: i64::from(output_index),
            signature: Vec::new(),
            public_key,
        }
    }

    /// Synthetic coinbase input; `data` is whatever the miner wants recorded
    pub fn coinbase(data: &[u8]) -> Self {
        Self {
            prev_tx_id: None,
            output_index: COINBASE_OUTPUT_INDEX,
            signature: Vec::new(),
            public_key: data.to_vec(),
        }
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }
}

// =============================================================================
// Transaction Output
// =============================================================================

/// Transaction output
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxOutput {
    /// Amount in base units
    pub value: Amount,
    /// Hash of the owner's public key
    pub locking_hash: PubKeyHash,
}

impl TxOutput {
    pub fn new(value: Amount, locking_hash: PubKeyHash) -> Self {
        Self {
            value,
            locking_hash,
        }
    }

    /// Check if this output can be unlocked by the key hashing to `hash`
    pub fn is_locked_with(&self, hash: &PubKeyHash) -> bool {
        self.locking_hash == *hash
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A UTXO transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    /// Hash of (inputs, outputs, timestamp) as of the last `set_id`
    pub id: TxId,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    /// Unix seconds
    pub timestamp: i64,
}

impl Transaction {
    /// Create a transaction and compute its id
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>, timestamp: i64) -> Self {
        let mut tx = Self {
            id: TxId::default(),
            inputs,
            outputs,
            timestamp,
        };
        tx.set_id();
        tx
    }

    /// Create a coinbase (mining reward) transaction
    pub fn coinbase(locking_hash: PubKeyHash, reward: Amount, data: &[u8], timestamp: i64) -> Self {
        Self::new(
            vec![TxInput::coinbase(data)],
            vec![TxOutput::new(reward, locking_hash)],
            timestamp,
        )
    }

    /// Exactly one input with no referenced transaction and index -1
    pub fn is_coinbase(&self) -> bool {
        matches!(
            self.inputs.as_slice(),
            [input] if input.prev_tx_id.is_none() && input.output_index == COINBASE_OUTPUT_INDEX
        )
    }

    /// Recompute `id` from the current inputs, outputs and timestamp
    pub fn set_id(&mut self) {
        self.id = compute_id(self);
    }

    /// Total output amount, or `None` if it does not fit in an `Amount`
    pub fn total_output(&self) -> Option<Amount> {
        self.outputs
            .iter()
            .try_fold(0, |total: Amount, o| total.checked_add(o.value))
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transaction {}:", self.id)?;

        for (i, input) in self.inputs.iter().enumerate() {
            let prev = input
                .prev_tx_id
                .map(|id| id.to_string())
                .unwrap_or_default();
            writeln!(f, "  Input {}:", i)?;
            writeln!(f, "    TXID:      {}", prev)?;
            writeln!(f, "    Out:       {}", input.output_index)?;
            writeln!(f, "    Signature: {}", hex::encode(&input.signature))?;
            writeln!(f, "    PubKey:    {}", hex::encode(&input.public_key))?;
        }

        for (i, output) in self.outputs.iter().enumerate() {
            writeln!(f, "  Output {}:", i)?;
            writeln!(f, "    Value:     {}", format_amount(output.value))?;
            writeln!(f, "    Script:    {}", output.locking_hash)?;
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
