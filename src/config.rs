//! Factory configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::transaction::{Amount, BLOCK_REWARD};
use crate::crypto::MAINNET_VERSION;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Parameters of the transaction factory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Value of the single coinbase output, in base units
    pub coinbase_reward: Amount,
    /// Version byte of Base58Check addresses
    pub address_version: u8,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            coinbase_reward: BLOCK_REWARD,
            address_version: MAINNET_VERSION,
        }
    }
}

impl FactoryConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coinbase_reward == 0 {
            return Err(ConfigError::Invalid(
                "coinbase_reward must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FactoryConfig::default();
        assert_eq!(config.coinbase_reward, 1_250_000_000);
        assert_eq!(config.address_version, 0x00);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("factory.json");

        let config = FactoryConfig {
            coinbase_reward: 42,
            address_version: 0x6f,
        };
        config.save(&path).unwrap();
        assert_eq!(FactoryConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("factory.json");
        fs::write(&path, r#"{ "address_version": 111 }"#).unwrap();

        let config = FactoryConfig::load(&path).unwrap();
        assert_eq!(config.address_version, 111);
        assert_eq!(config.coinbase_reward, BLOCK_REWARD);
    }

    #[test]
    fn test_zero_reward_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("factory.json");
        fs::write(&path, r#"{ "coinbase_reward": 0 }"#).unwrap();

        assert!(matches!(
            FactoryConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
