//! Resolving a chain id into everything a run needs before touching the network

use crate::config::{AccountSpec, ConfigurationError, NetworkConfig, NetworkTable};
use crate::confirm::ConfirmationPolicy;
use crate::signer::{LocalSigner, SigningIdentity};
use std::time::Duration;

/// Resolved settings of the target network, fixed for the whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkContext {
    pub chain_id: u64,
    pub network_name: String,
    pub rpc_url: String,
    pub deployer: SigningIdentity,
    /// Same as `deployer` unless a minter account is configured
    pub minter: SigningIdentity,
    pub policy: ConfirmationPolicy,
    pub save_deployments: bool,
    pub gas_limit: Option<u64>,
}

/// Look up `chain_id` in `table` and resolve its accounts through `env`
///
/// Performs no network I/O; `env` is the only source of secrets.
///
/// # Examples
///
/// ```
/// use svgnft::config::NetworkTable;
/// use svgnft::network::resolve;
///
/// let context = resolve(&NetworkTable::builtin(), 31337, |_| None).unwrap();
/// assert_eq!(context.network_name, "localhost");
/// assert_eq!(context.minter, context.deployer);
/// ```
///
/// # Errors
///
/// Returns [`ConfigurationError::UnknownChain`] if the table has no entry for
/// `chain_id`, [`ConfigurationError::EmptyNetworkName`] if the entry is
/// unnamed, or another [`ConfigurationError`] if the entry's URL or accounts
/// cannot be resolved.
pub fn resolve<F>(
    table: &NetworkTable,
    chain_id: u64,
    env: F,
) -> Result<NetworkContext, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = table
        .get(chain_id)
        .ok_or(ConfigurationError::UnknownChain(chain_id))?;
    if config.name.trim().is_empty() {
        return Err(ConfigurationError::EmptyNetworkName(chain_id));
    }

    let rpc_url = rpc_url(config, &env)?;
    let deployer = match &config.accounts.deployer {
        Some(spec) => identity(spec, &env)?,
        None => return Err(ConfigurationError::MissingDeployer(config.name.clone())),
    };
    let minter = match &config.accounts.minter {
        Some(spec) => identity(spec, &env)?,
        None => deployer.clone(),
    };

    Ok(NetworkContext {
        chain_id,
        network_name: config.name.clone(),
        rpc_url,
        deployer,
        minter,
        policy: ConfirmationPolicy {
            confirmations: config.confirmations,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_secs(config.confirmation_timeout_secs),
        },
        save_deployments: config.save_deployments,
        gas_limit: config.gas_limit,
    })
}

fn rpc_url<F>(config: &NetworkConfig, env: &F) -> Result<String, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = &config.rpc_url {
        return Ok(url.clone());
    }
    match &config.rpc_url_env {
        Some(var) => env(var.as_str()).ok_or_else(|| ConfigurationError::MissingEnv(var.clone())),
        None => Err(ConfigurationError::MissingRpcUrl(config.name.clone())),
    }
}

fn identity<F>(spec: &AccountSpec, env: &F) -> Result<SigningIdentity, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    match spec {
        AccountSpec::Address { address } => Ok(SigningIdentity::Unlocked(*address)),
        AccountSpec::PrivateKeyEnv { private_key_env } => {
            let key = env(private_key_env.as_str())
                .ok_or_else(|| ConfigurationError::MissingEnv(private_key_env.clone()))?;
            LocalSigner::from_hex(&key)
                .map(SigningIdentity::from)
                .map_err(|e| ConfigurationError::InvalidPrivateKey {
                    var: private_key_env.clone(),
                    reason: e.to_string(),
                })
        }
    }
}
