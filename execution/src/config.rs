//! Deployment configuration.

use crate::layer::Deployment;
use gamehub_types::{Address, AddressError, AddressKind};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, path::Path, str::FromStr};
use thiserror::Error;
use tracing::Level;

/// Configuration for a registry deployment, usually read from YAML.
#[derive(Clone, Deserialize, Serialize)]
pub struct Config {
    /// Account that installs the registry.
    pub owner: String,
    /// The registry's own contract address.
    pub registry: String,
    pub log_level: String,

    /// Owners reported by game contracts, keyed by score address.
    #[serde(default)]
    pub score_owners: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{field} is not a valid address: {value}")]
    InvalidAddress {
        field: &'static str,
        value: String,
        #[source]
        source: AddressError,
    },
    #[error("{field} must be a {expected} address: {value}")]
    WrongAddressKind {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
}

#[derive(Debug)]
pub struct ValidatedConfig {
    pub deployment: Deployment,
    pub log_level: Level,
    pub score_owners: BTreeMap<Address, Address>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("owner", &self.owner)
            .field("registry", &self.registry)
            .field("log_level", &self.log_level)
            .field("score_owners", &self.score_owners.len())
            .finish()
    }
}

fn parse_address(
    field: &'static str,
    value: &str,
    kind: AddressKind,
) -> Result<Address, ConfigError> {
    let address = Address::from_str(value).map_err(|source| ConfigError::InvalidAddress {
        field,
        value: value.to_string(),
        source,
    })?;
    if address.kind() != kind {
        return Err(ConfigError::WrongAddressKind {
            field,
            value: value.to_string(),
            expected: match kind {
                AddressKind::Wallet => "wallet",
                AddressKind::Contract => "contract",
            },
        });
    }
    Ok(address)
}

impl Config {
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let owner = parse_address("owner", &self.owner, AddressKind::Wallet)?;
        let registry = parse_address("registry", &self.registry, AddressKind::Contract)?;

        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        let mut score_owners = BTreeMap::new();
        for (score, owner) in &self.score_owners {
            score_owners.insert(
                parse_address("score_owners", score, AddressKind::Contract)?,
                parse_address("score_owners", owner, AddressKind::Wallet)?,
            );
        }

        Ok(ValidatedConfig {
            deployment: Deployment { owner, registry },
            log_level,
            score_owners,
        })
    }
}
