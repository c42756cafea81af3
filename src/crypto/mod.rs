//! Cryptographic utilities for the transaction layer
//!
//! This module provides:
//! - SHA-256 / HASH160 hashing
//! - ECDSA key management (secp256k1) with fixed-width wire forms
//! - The address codec that derives locking hashes

pub mod address;
pub mod hash;
pub mod keys;

pub use address::{
    AddressCodec, AddressError, Base58Check, PubKeyHash, LOCKING_HASH_LEN, MAINNET_VERSION,
};
pub use hash::{double_sha256, hash160, sha256, sha256_hex};
pub use keys::{
    sign_digest, verify_digest, KeyError, KeyPair, RawPublicKey, RawSignature, COORDINATE_WIDTH,
    PUBLIC_KEY_LEN, SIGNATURE_LEN,
};
