//! Address codec
//!
//! Maps between text addresses, public keys and the 20-byte locking hash
//! that outputs are locked to. The default codec is Bitcoin-style
//! Base58Check(version || RIPEMD160(SHA256(pubkey)) || checksum).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::hash::{double_sha256, hash160};

/// Length of a locking hash in bytes
pub const LOCKING_HASH_LEN: usize = 20;

/// Version byte for mainnet addresses
pub const MAINNET_VERSION: u8 = 0x00;

const CHECKSUM_LEN: usize = 4;

/// Address-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address is not valid base58: {0}")]
    InvalidEncoding(String),
    #[error("Invalid address length: {0} bytes")]
    InvalidLength(usize),
    #[error("Address checksum mismatch")]
    BadChecksum,
    #[error("Unexpected address version: expected {expected:#04x}, got {got:#04x}")]
    WrongVersion { expected: u8, got: u8 },
    #[error("Invalid locking hash hex: {0}")]
    InvalidHex(String),
}

/// Hash of an owner's public key; the spending target of an output
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PubKeyHash(pub [u8; LOCKING_HASH_LEN]);

impl PubKeyHash {
    /// Derive the locking hash for raw public key bytes
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self(hash160(public_key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PubKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PubKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKeyHash({})", self)
    }
}

impl FromStr for PubKeyHash {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; LOCKING_HASH_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for PubKeyHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PubKeyHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Address policy used by the transaction factory and verifier
pub trait AddressCodec {
    /// Decode a text address into the locking hash it pays to
    fn address_to_locking_hash(&self, address: &str) -> Result<PubKeyHash, AddressError>;

    /// Encode a locking hash as a text address
    fn locking_hash_to_address(&self, hash: &PubKeyHash) -> String;

    /// Locking hash derived from the public key bytes carried by an input
    fn public_key_to_locking_hash(&self, public_key: &[u8]) -> PubKeyHash {
        PubKeyHash::from_public_key(public_key)
    }

    fn public_key_to_address(&self, public_key: &[u8]) -> String {
        self.locking_hash_to_address(&self.public_key_to_locking_hash(public_key))
    }
}

/// Base58Check addresses with a single version byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base58Check {
    pub version: u8,
}

impl Base58Check {
    pub fn new(version: u8) -> Self {
        Self { version }
    }
}

impl Default for Base58Check {
    fn default() -> Self {
        Self::new(MAINNET_VERSION)
    }
}

impl AddressCodec for Base58Check {
    fn address_to_locking_hash(&self, address: &str) -> Result<PubKeyHash, AddressError> {
        let bytes = bs58::decode(address)
            .into_vec()
            .map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;

        if bytes.len() != 1 + LOCKING_HASH_LEN + CHECKSUM_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }

        let (payload, checksum) = bytes.split_at(1 + LOCKING_HASH_LEN);
        if double_sha256(payload)[..CHECKSUM_LEN] != *checksum {
            return Err(AddressError::BadChecksum);
        }

        if payload[0] != self.version {
            return Err(AddressError::WrongVersion {
                expected: self.version,
                got: payload[0],
            });
        }

        let mut hash = [0u8; LOCKING_HASH_LEN];
        hash.copy_from_slice(&payload[1..]);
        Ok(PubKeyHash(hash))
    }

    fn locking_hash_to_address(&self, hash: &PubKeyHash) -> String {
        let mut address_bytes = Vec::with_capacity(1 + LOCKING_HASH_LEN + CHECKSUM_LEN);
        address_bytes.push(self.version);
        address_bytes.extend_from_slice(hash.as_bytes());

        let checksum = double_sha256(&address_bytes);
        address_bytes.extend_from_slice(&checksum[..CHECKSUM_LEN]);

        bs58::encode(address_bytes).into_string()
    }
}
