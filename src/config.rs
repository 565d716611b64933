//! Per-network configuration
//!
//! Networks are keyed by chain id. A built-in table covers a local Hardhat
//! node and Rinkeby; a TOML file can add networks or replace built-in ones.
//!
//! # Example Configuration File (svgnft.toml)
//!
//! ```toml
//! [networks.31337]
//! name = "localhost"
//! rpc_url = "http://127.0.0.1:8545"
//! confirmations = 1
//!
//! [networks.31337.accounts]
//! deployer = { address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266" }
//! minter = { private_key_env = "MINTER_PK" }
//!
//! [networks.4]
//! name = "rinkeby"
//! rpc_url_env = "RINKEBY_RPC_URL"
//! save_deployments = true
//! accounts = { deployer = { private_key_env = "DEPLOYER_PK" } }
//! ```

use crate::address::Address;
use alloy_primitives::address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Chain id of a local Hardhat node
pub const LOCALHOST_CHAIN_ID: u64 = 31337;

/// Chain id of the Rinkeby test network
pub const RINKEBY_CHAIN_ID: u64 = 4;

/// Default JSON-RPC endpoint of a local node
pub const LOCALHOST_RPC_URL: &str = "http://127.0.0.1:8545";

/// Hardhat's default account 0, unlocked on a local node
const HARDHAT_ACCOUNT_0: Address = address!("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// Where an account's signing authority comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountSpec {
    /// An account unlocked on the node
    Address {
        #[serde(with = "crate::address::checksummed")]
        address: Address,
    },
    /// A hex private key read from an environment variable
    PrivateKeyEnv { private_key_env: String },
}

/// Named accounts of a network
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedAccounts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployer: Option<AccountSpec>,
    /// Falls back to the deployer when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minter: Option<AccountSpec>,
}

/// Settings of one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Human-readable name, used for the deployment cache and verify command
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    /// Environment variable holding the RPC URL, used when `rpc_url` is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url_env: Option<String>,
    #[serde(default)]
    pub accounts: NamedAccounts,
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    #[serde(default)]
    pub save_deployments: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    /// Fixed gas limit; estimated by the node when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
}

const fn default_confirmations() -> u64 {
    1
}

const fn default_poll_interval_ms() -> u64 {
    500
}

const fn default_confirmation_timeout_secs() -> u64 {
    300
}

impl NetworkConfig {
    /// A network with default settings and no accounts
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rpc_url: None,
            rpc_url_env: None,
            accounts: NamedAccounts::default(),
            confirmations: default_confirmations(),
            save_deployments: false,
            poll_interval_ms: default_poll_interval_ms(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            gas_limit: None,
        }
    }

    /// Local Hardhat node, deploying from the unlocked account 0
    #[must_use]
    pub fn localhost() -> Self {
        let mut config = Self::new("localhost");
        config.rpc_url = Some(LOCALHOST_RPC_URL.to_string());
        config.accounts.deployer = Some(AccountSpec::Address {
            address: HARDHAT_ACCOUNT_0,
        });
        config
    }

    /// Rinkeby, with URL and key taken from the environment
    #[must_use]
    pub fn rinkeby() -> Self {
        let mut config = Self::new("rinkeby");
        config.rpc_url_env = Some("RINKEBY_RPC_URL".to_string());
        config.save_deployments = true;
        config.accounts.deployer = Some(AccountSpec::PrivateKeyEnv {
            private_key_env: "DEPLOYER_PK".to_string(),
        });
        config
    }

    #[must_use]
    pub fn with_rpc_url(mut self, url: &str) -> Self {
        self.rpc_url = Some(url.to_string());
        self
    }

    #[must_use]
    pub fn with_deployer(mut self, account: AccountSpec) -> Self {
        self.accounts.deployer = Some(account);
        self
    }

    #[must_use]
    pub fn with_minter(mut self, account: AccountSpec) -> Self {
        self.accounts.minter = Some(account);
        self
    }
}

/// TOML layout; table keys are chain ids as strings
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    networks: BTreeMap<String, NetworkConfig>,
}

/// Networks keyed by chain id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkTable {
    networks: BTreeMap<u64, NetworkConfig>,
}

impl Default for NetworkTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NetworkTable {
    /// A table without any networks
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            networks: BTreeMap::new(),
        }
    }

    /// The built-in networks: localhost (31337) and rinkeby (4)
    #[must_use]
    pub fn builtin() -> Self {
        Self::empty()
            .with_network(LOCALHOST_CHAIN_ID, NetworkConfig::localhost())
            .with_network(RINKEBY_CHAIN_ID, NetworkConfig::rinkeby())
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a key is not a chain id.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigurationError> {
        let file: ConfigFile = toml::from_str(toml_str)?;
        let networks = file
            .networks
            .into_iter()
            .map(|(key, config)| parse_chain_id(&key).map(|id| (id, config)))
            .collect::<Result<_, _>>()?;
        Ok(Self { networks })
    }

    /// Serialize to the TOML file format
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigurationError> {
        let file = ConfigFile {
            networks: self
                .networks
                .iter()
                .map(|(id, config)| (id.to_string(), config.clone()))
                .collect(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }

    /// The built-in table overlaid with the file at `path`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let builtin = Self::builtin();
        match path {
            Some(path) => Ok(builtin.merge(Self::from_file(path)?)),
            None => Ok(builtin),
        }
    }

    /// Overlay `other`; its entries replace ones with the same chain id
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.networks.extend(other.networks);
        self
    }

    #[must_use]
    pub fn with_network(mut self, chain_id: u64, config: NetworkConfig) -> Self {
        self.insert(chain_id, config);
        self
    }

    pub fn insert(&mut self, chain_id: u64, config: NetworkConfig) {
        self.networks.insert(chain_id, config);
    }

    #[must_use]
    pub fn get(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks.get(&chain_id)
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.networks.keys().copied()
    }
}

/// Parse a chain id given in decimal or `0x` hex
///
/// # Examples
///
/// ```
/// use svgnft::config::parse_chain_id;
///
/// assert_eq!(parse_chain_id("31337").unwrap(), 31337);
/// assert_eq!(parse_chain_id("0x7a69").unwrap(), 31337);
/// assert!(parse_chain_id("rinkeby").is_err());
/// ```
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidChainId`] if `s` is not a number.
pub fn parse_chain_id(s: &str) -> Result<u64, ConfigurationError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|_| ConfigurationError::InvalidChainId(s.to_string()))
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid chain id `{0}`")]
    InvalidChainId(String),

    #[error("No network configured for chain id {0}")]
    UnknownChain(u64),

    #[error("Network for chain id {0} has an empty name")]
    EmptyNetworkName(u64),

    #[error("Network `{0}` has no RPC URL")]
    MissingRpcUrl(String),

    #[error("Network `{0}` has no deployer account")]
    MissingDeployer(String),

    #[error("Environment variable `{0}` is not set")]
    MissingEnv(String),

    #[error("Invalid private key in `{var}`: {reason}")]
    InvalidPrivateKey { var: String, reason: String },

    #[error("Node reports chain id {actual}, expected {expected}")]
    ChainMismatch { expected: u64, actual: u64 },
}
