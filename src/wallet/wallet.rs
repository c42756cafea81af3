//! Wallet key storage
//!
//! The factory only needs to turn an address into a key pair. `Wallets`
//! keeps keys in memory; `WalletManager` keeps one JSON file per address.
//! Both render addresses with the same codec the factory decodes them with.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{AddressCodec, AddressError, Base58Check, KeyError, KeyPair, PubKeyHash};

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error("Wallet file for {expected} holds the key of {found}")]
    AddressMismatch { expected: String, found: String },
}

/// Address -> key pair lookup used by the transaction factory
pub trait WalletStore {
    fn lookup(&self, address: &str) -> Option<KeyPair>;
}

/// Serializable wallet data for persistence
#[derive(Debug, Serialize, Deserialize)]
struct WalletData {
    private_key_hex: String,
    locking_hash: PubKeyHash,
    label: Option<String>,
}

/// A key pair with an optional label
#[derive(Debug, Clone)]
pub struct Wallet {
    key_pair: KeyPair,
    pub label: Option<String>,
}

impl Wallet {
    /// Create a new wallet with a fresh key pair
    pub fn new() -> Self {
        Self::from_key_pair(KeyPair::generate())
    }

    /// Create a wallet with a label
    pub fn with_label(label: &str) -> Self {
        Self {
            key_pair: KeyPair::generate(),
            label: Some(label.to_string()),
        }
    }

    pub fn from_key_pair(key_pair: KeyPair) -> Self {
        Self {
            key_pair,
            label: None,
        }
    }

    /// Import a wallet from a private key
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, WalletError> {
        Ok(Self::from_key_pair(KeyPair::from_private_key_hex(
            private_key_hex,
        )?))
    }

    /// Hash that outputs paying this wallet are locked with
    pub fn locking_hash(&self) -> PubKeyHash {
        PubKeyHash(self.key_pair.public_key_hash())
    }

    /// Address of the wallet's key under `codec`
    pub fn address<C: AddressCodec>(&self, codec: &C) -> String {
        codec.locking_hash_to_address(&self.locking_hash())
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Save wallet to file
    pub fn save(&self, path: &Path) -> Result<(), WalletError> {
        let data = WalletData {
            private_key_hex: self.key_pair.private_key_hex(),
            locking_hash: self.locking_hash(),
            label: self.label.clone(),
        };

        let json = serde_json::to_string_pretty(&data)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load wallet from file
    pub fn load(path: &Path) -> Result<Self, WalletError> {
        let json = fs::read_to_string(path)?;
        let data: WalletData = serde_json::from_str(&json)?;

        let mut wallet = Self::from_private_key(&data.private_key_hex)?;
        if wallet.locking_hash() != data.locking_hash {
            return Err(WalletError::AddressMismatch {
                expected: data.locking_hash.to_string(),
                found: wallet.locking_hash().to_string(),
            });
        }
        wallet.label = data.label;
        Ok(wallet)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory wallet store
#[derive(Debug, Default)]
pub struct Wallets<C = Base58Check> {
    codec: C,
    wallets: HashMap<String, Wallet>,
}

impl Wallets {
    /// Store using Base58Check addresses with the default version byte
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: AddressCodec> Wallets<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            wallets: HashMap::new(),
        }
    }

    /// Store a key pair, returning its address
    pub fn add(&mut self, key_pair: KeyPair) -> String {
        self.insert(Wallet::from_key_pair(key_pair))
    }

    pub fn insert(&mut self, wallet: Wallet) -> String {
        let address = wallet.address(&self.codec);
        self.wallets.insert(address.clone(), wallet);
        address
    }

    pub fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<_> = self.wallets.keys().cloned().collect();
        addresses.sort();
        addresses
    }
}

impl<C: AddressCodec> WalletStore for Wallets<C> {
    fn lookup(&self, address: &str) -> Option<KeyPair> {
        self.wallets.get(address).map(|w| w.key_pair.clone())
    }
}

/// Wallet directory with one `<address>.json` per wallet
pub struct WalletManager<C = Base58Check> {
    wallets_dir: PathBuf,
    codec: C,
}

impl WalletManager {
    /// Create a new wallet manager using default Base58Check addresses
    pub fn new(wallets_dir: &Path) -> Result<Self, WalletError> {
        Self::with_codec(wallets_dir, Base58Check::default())
    }
}

impl<C: AddressCodec> WalletManager<C> {
    pub fn with_codec(wallets_dir: &Path, codec: C) -> Result<Self, WalletError> {
        fs::create_dir_all(wallets_dir)?;
        Ok(Self {
            wallets_dir: wallets_dir.to_path_buf(),
            codec,
        })
    }

    /// File for `address`; only well-formed addresses name a file
    fn wallet_path(&self, address: &str) -> Result<(PathBuf, PubKeyHash), WalletError> {
        let locking_hash = self.codec.address_to_locking_hash(address)?;
        let path = self.wallets_dir.join(format!("{}.json", address));
        Ok((path, locking_hash))
    }

    /// Create and save a new wallet
    pub fn create_wallet(&self, label: Option<&str>) -> Result<Wallet, WalletError> {
        let wallet = match label {
            Some(l) => Wallet::with_label(l),
            None => Wallet::new(),
        };

        let address = wallet.address(&self.codec);
        let (path, _) = self.wallet_path(&address)?;
        wallet.save(&path)?;
        log::info!("Created wallet {}", address);
        Ok(wallet)
    }

    /// List all wallet addresses
    pub fn list_wallets(&self) -> Result<Vec<String>, WalletError> {
        let mut addresses = Vec::new();

        for entry in fs::read_dir(&self.wallets_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            let Some(address) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match self.load_wallet(address) {
                Ok(_) => addresses.push(address.to_string()),
                Err(e) => log::warn!("Skipping unreadable wallet {:?}: {}", path, e),
            }
        }

        addresses.sort();
        Ok(addresses)
    }

    /// Load a specific wallet by address
    ///
    /// Fails unless the file holds the key that `address` pays to.
    pub fn load_wallet(&self, address: &str) -> Result<Wallet, WalletError> {
        let (path, locking_hash) = self.wallet_path(address)?;
        let wallet = Wallet::load(&path)?;

        if wallet.locking_hash() != locking_hash {
            return Err(WalletError::AddressMismatch {
                expected: address.to_string(),
                found: wallet.address(&self.codec),
            });
        }
        Ok(wallet)
    }

    /// Delete a wallet
    pub fn delete_wallet(&self, address: &str) -> Result<(), WalletError> {
        let (path, _) = self.wallet_path(address)?;
        fs::remove_file(path)?;
        Ok(())
    }
}

impl<C: AddressCodec> WalletStore for WalletManager<C> {
    fn lookup(&self, address: &str) -> Option<KeyPair> {
        match self.load_wallet(address) {
            Ok(wallet) => Some(wallet.key_pair),
            Err(e) => {
                log::debug!("No usable wallet for {}: {}", address, e);
                None
            }
        }
    }
}
