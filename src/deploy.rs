//! Publishing contract artifacts and caching the resulting deployments

use crate::abi::{DynSolValue, Interface};
use crate::address::Address;
use crate::artifact::Artifact;
use crate::client::{ChainClient, TransactionRequest, TxHash};
use crate::confirm::{wait_for_confirmations, Confirmation, ConfirmationFailure, ConfirmationPolicy};
use crate::error::DeploymentError;
use crate::signer::SigningIdentity;
use alloy_primitives::B256;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A contract known to live at an address, with the interface to call it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub contract_name: String,
    #[serde(with = "crate::address::checksummed")]
    pub address: Address,
    pub abi: Interface,
    #[serde(with = "crate::address::checksummed")]
    pub deployer: Address,
    pub bytecode_hash: B256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<TxHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Set when this run reused a cached deployment instead of publishing
    #[serde(skip)]
    pub reused: bool,
}

impl DeploymentRecord {
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    #[must_use]
    pub const fn interface(&self) -> &Interface {
        &self.abi
    }
}

/// On-disk deployment cache: `<root>/<network>/<ContractName>.json`
#[derive(Debug, Clone)]
pub struct DeploymentStore {
    root: PathBuf,
}

impl DeploymentStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self, network: &str, contract_name: &str) -> PathBuf {
        self.root.join(network).join(format!("{contract_name}.json"))
    }

    /// Load a stored record, `None` if nothing was saved yet
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(
        &self,
        network: &str,
        contract_name: &str,
    ) -> Result<Option<DeploymentRecord>, DeploymentError> {
        let path = self.path(network, contract_name);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path)
            .map_err(|e| DeploymentError::Store(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| DeploymentError::Store(format!("{}: {e}", path.display())))
    }

    /// Write `record`, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, network: &str, record: &DeploymentRecord) -> Result<(), DeploymentError> {
        let path = self.path(network, &record.contract_name);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| DeploymentError::Store(format!("{}: {e}", dir.display())))?;
        }
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| DeploymentError::Store(e.to_string()))?;
        std::fs::write(&path, json)
            .map_err(|e| DeploymentError::Store(format!("{}: {e}", path.display())))
    }
}

/// Settings for one deployment
#[derive(Debug, Clone, Default)]
pub struct DeployOptions<'a> {
    /// Network name, keys the deployment cache
    pub network: &'a str,
    pub constructor_args: Vec<DynSolValue>,
    pub gas_limit: Option<u64>,
    pub policy: ConfirmationPolicy,
    /// `None` always deploys
    pub store: Option<&'a DeploymentStore>,
}

/// Publish `artifact` from `deployer` and wait for it to be confirmed
///
/// With a store, an earlier deployment of the same bytecode by the same
/// account is reused as long as its code is still on chain.
///
/// # Errors
///
/// Returns an error if the transaction is rejected, reverts, is not confirmed
/// within the policy's timeout, or the cache cannot be read or written.
pub fn deploy<C: ChainClient + ?Sized>(
    client: &C,
    artifact: &Artifact,
    deployer: &SigningIdentity,
    options: &DeployOptions<'_>,
) -> Result<DeploymentRecord, DeploymentError> {
    let from = deployer.address();
    let bytecode_hash = artifact.bytecode_hash();

    if let Some(store) = options.store {
        if let Some(mut cached) = store.load(options.network, artifact.name())? {
            if cached.deployer == from && cached.bytecode_hash == bytecode_hash {
                let code = client
                    .code_at(&cached.address)
                    .map_err(DeploymentError::Connect)?;
                if !code.is_empty() {
                    info!("reusing \"{}\" at {}", artifact.name(), cached.address);
                    cached.reused = true;
                    return Ok(cached);
                }
                debug!("cached {} has no code on chain, redeploying", cached.address);
            }
        }
    }

    let data = artifact.deploy_data(&options.constructor_args)?;
    let request = TransactionRequest::deploy(data).with_gas_limit(options.gas_limit);
    let tx = client
        .send_transaction(deployer, &request)
        .map_err(DeploymentError::Rejected)?;
    info!("deploying \"{}\" (tx: {tx})...", artifact.name());

    let receipt = match wait_for_confirmations(client, tx, &options.policy)
        .map_err(|source| DeploymentError::Network { tx, source })?
    {
        Confirmation::Confirmed(receipt) => receipt,
        Confirmation::Failed(ConfirmationFailure::Reverted(_)) => {
            return Err(DeploymentError::Reverted(tx))
        }
        Confirmation::Failed(ConfirmationFailure::TimedOut { waited }) => {
            return Err(DeploymentError::NotConfirmed {
                tx,
                waited_secs: waited.as_secs(),
            })
        }
    };
    let address = receipt
        .contract_address
        .ok_or(DeploymentError::MissingContractAddress(tx))?;
    info!("deployed at {address} with {} gas", receipt.gas_used);

    let record = DeploymentRecord {
        contract_name: artifact.name().to_string(),
        address,
        abi: artifact.interface().clone(),
        deployer: from,
        bytecode_hash,
        transaction_hash: Some(tx),
        block_number: Some(receipt.block_number),
        reused: false,
    };
    if let Some(store) = options.store {
        store.save(options.network, &record)?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_client::MockClient;
    use crate::test_fixtures::{immediate_policy, svgnft_artifact, test_deployer, test_minter};

    fn options<'a>(store: Option<&'a DeploymentStore>) -> DeployOptions<'a> {
        DeployOptions {
            network: "localhost",
            policy: immediate_policy(),
            store,
            ..DeployOptions::default()
        }
    }

    #[test]
    fn test_deploy_returns_confirmed_record() {
        let client = MockClient::new();
        let record = deploy(&client, &svgnft_artifact(), &test_deployer(), &options(None)).unwrap();
        assert_eq!(record.contract_name, "SVGNFT");
        assert!(crate::address::is_canonical(&record.address.to_string()));
        assert_eq!(record.deployer, test_deployer().address());
        assert!(record.interface().has_function("create"));
        assert!(!record.reused);
        assert_eq!(client.contract_count(), 1);
    }

    #[test]
    fn test_without_store_always_deploys() {
        let client = MockClient::new();
        let first = deploy(&client, &svgnft_artifact(), &test_deployer(), &options(None)).unwrap();
        let second = deploy(&client, &svgnft_artifact(), &test_deployer(), &options(None)).unwrap();
        assert_ne!(first.address, second.address);
        assert_eq!(client.calls().send_transaction, 2);
    }

    #[test]
    fn test_store_reuses_matching_deployment() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(dir.path());
        let client = MockClient::new();

        let first = deploy(&client, &svgnft_artifact(), &test_deployer(), &options(Some(&store)))
            .unwrap();
        assert!(store.path("localhost", "SVGNFT").exists());

        let second = deploy(&client, &svgnft_artifact(), &test_deployer(), &options(Some(&store)))
            .unwrap();
        assert!(second.reused);
        assert_eq!(first.address, second.address);
        assert_eq!(client.calls().send_transaction, 1);
    }

    #[test]
    fn test_store_redeploys_for_other_deployer() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(dir.path());
        let client = MockClient::new();

        deploy(&client, &svgnft_artifact(), &test_deployer(), &options(Some(&store))).unwrap();
        let other = deploy(&client, &svgnft_artifact(), &test_minter(), &options(Some(&store)))
            .unwrap();
        assert!(!other.reused);
        assert_eq!(client.calls().send_transaction, 2);
        // the cache now points at the newer deployment
        let cached = store.load("localhost", "SVGNFT").unwrap().unwrap();
        assert_eq!(cached.address, other.address);
    }

    #[test]
    fn test_store_redeploys_when_code_is_gone() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(dir.path());
        let client = MockClient::new();

        deploy(&client, &svgnft_artifact(), &test_deployer(), &options(Some(&store))).unwrap();
        client.wipe_contracts();
        let again = deploy(&client, &svgnft_artifact(), &test_deployer(), &options(Some(&store)))
            .unwrap();
        assert!(!again.reused);
        assert_eq!(client.contract_count(), 1);
    }

    #[test]
    fn test_rejected_deploy() {
        let client = MockClient::new();
        client.reject_next_send("insufficient funds for gas * price + value");
        let err = deploy(&client, &svgnft_artifact(), &test_deployer(), &options(None))
            .unwrap_err();
        assert!(matches!(err, DeploymentError::Rejected(_)));
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[test]
    fn test_reverted_deploy() {
        let client = MockClient::new();
        client.revert_next_send();
        let err = deploy(&client, &svgnft_artifact(), &test_deployer(), &options(None))
            .unwrap_err();
        assert!(matches!(err, DeploymentError::Reverted(_)));
    }

    #[test]
    fn test_unconfirmed_deploy() {
        let client = MockClient::new();
        client.withhold_receipts(true);
        let err = deploy(&client, &svgnft_artifact(), &test_deployer(), &options(None))
            .unwrap_err();
        assert!(matches!(err, DeploymentError::NotConfirmed { .. }));
    }

    #[test]
    fn test_corrupt_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(dir.path());
        let path = store.path("localhost", "SVGNFT");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        let client = MockClient::new();
        let err = deploy(&client, &svgnft_artifact(), &test_deployer(), &options(Some(&store)))
            .unwrap_err();
        assert!(matches!(err, DeploymentError::Store(_)));
    }

    #[test]
    fn test_record_json_shape() {
        let client = MockClient::new();
        let record = deploy(&client, &svgnft_artifact(), &test_deployer(), &options(None)).unwrap();
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["contractName"], "SVGNFT");
        assert!(json["abi"].is_array());
        assert!(json.get("reused").is_none());
        assert_eq!(json["address"], record.address.to_string());
        assert_eq!(json["deployer"], "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    }
}
