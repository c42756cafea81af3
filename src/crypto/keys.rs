//! ECDSA key management
//!
//! Key pair generation, signing, and verification on the secp256k1 curve,
//! plus the fixed-width byte forms that keys and signatures take inside
//! transaction inputs.

use rand::rngs::OsRng;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::hash::hash160;

/// Byte width of one curve coordinate / scalar
pub const COORDINATE_WIDTH: usize = 32;

/// Signature bytes on the wire: r || s
pub const SIGNATURE_LEN: usize = 2 * COORDINATE_WIDTH;

/// Public key bytes on the wire: X || Y
pub const PUBLIC_KEY_LEN: usize = 2 * COORDINATE_WIDTH;

/// Tag byte of an uncompressed SEC1 point
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Errors that can occur during key operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key: point is not on the curve")]
    InvalidPublicKey,
    #[error("Invalid signature encoding")]
    InvalidSignature,
    #[error("Invalid {what} length: expected {expected} bytes, got {got}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// Public key as two fixed-width coordinates, X || Y
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPublicKey([u8; PUBLIC_KEY_LEN]);

impl RawPublicKey {
    /// Accept exactly `PUBLIC_KEY_LEN` bytes; anything else is rejected
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let array: [u8; PUBLIC_KEY_LEN] =
            bytes.try_into().map_err(|_| KeyError::InvalidLength {
                what: "public key",
                expected: PUBLIC_KEY_LEN,
                got: bytes.len(),
            })?;
        Ok(Self(array))
    }

    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let uncompressed = public_key.serialize_uncompressed();
        let mut coordinates = [0u8; PUBLIC_KEY_LEN];
        coordinates.copy_from_slice(&uncompressed[1..]);
        Self(coordinates)
    }

    /// Rebuild the curve point; fails if (X, Y) is not on secp256k1
    pub fn to_public_key(&self) -> Result<PublicKey, KeyError> {
        let mut uncompressed = [0u8; PUBLIC_KEY_LEN + 1];
        uncompressed[0] = UNCOMPRESSED_TAG;
        uncompressed[1..].copy_from_slice(&self.0);
        PublicKey::from_slice(&uncompressed).map_err(|_| KeyError::InvalidPublicKey)
    }

    pub fn x(&self) -> &[u8] {
        &self.0[..COORDINATE_WIDTH]
    }

    pub fn y(&self) -> &[u8] {
        &self.0[COORDINATE_WIDTH..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// ECDSA signature as two fixed-width scalars, r || s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSignature([u8; SIGNATURE_LEN]);

impl RawSignature {
    /// Accept exactly `SIGNATURE_LEN` bytes; anything else is rejected
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let array: [u8; SIGNATURE_LEN] =
            bytes.try_into().map_err(|_| KeyError::InvalidLength {
                what: "signature",
                expected: SIGNATURE_LEN,
                got: bytes.len(),
            })?;
        Ok(Self(array))
    }

    pub fn r(&self) -> &[u8] {
        &self.0[..COORDINATE_WIDTH]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[COORDINATE_WIDTH..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn to_signature(self) -> Result<Signature, KeyError> {
        Signature::from_compact(&self.0).map_err(|_| KeyError::InvalidSignature)
    }
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Public key in the X || Y form carried by transaction inputs
    pub fn raw_public_key(&self) -> RawPublicKey {
        RawPublicKey::from_public_key(&self.public_key)
    }

    /// RIPEMD160(SHA256(X || Y))
    pub fn public_key_hash(&self) -> [u8; 20] {
        hash160(self.raw_public_key().as_bytes())
    }

    /// Sign a 32-byte digest with the private key
    pub fn sign(&self, digest: &[u8; 32]) -> Result<RawSignature, KeyError> {
        sign_digest(&self.secret_key, digest)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print the secret
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.raw_public_key().as_bytes()))
            .finish_non_exhaustive()
    }
}

/// Sign a 32-byte digest with a secret key
pub fn sign_digest(secret_key: &SecretKey, digest: &[u8; 32]) -> Result<RawSignature, KeyError> {
    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(digest)?;
    let signature = secp.sign_ecdsa(&message, secret_key);
    Ok(RawSignature(signature.serialize_compact()))
}

/// Verify a signature over a 32-byte digest
///
/// `Ok(false)` means the signature is well formed but does not verify;
/// `Err` means the signature bytes do not even encode a valid (r, s).
pub fn verify_digest(
    public_key: &PublicKey,
    digest: &[u8; 32],
    signature: &RawSignature,
) -> Result<bool, KeyError> {
    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(digest)?;
    let sig = signature.to_signature()?;

    match secp.verify_ecdsa(&message, &sig, public_key) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}
