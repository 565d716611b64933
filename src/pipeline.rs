//! The deploy, mint and report sequence
//!
//! [`provision`] resolves the network before any I/O, connects, then hands
//! over to [`execute`]. Each step's output feeds the next; the first failing
//! step aborts the run, except the final read, whose failure is carried in
//! [`Outcome::report`] because the token already exists on chain.

use crate::artifact::Artifact;
use crate::client::ChainClient;
use crate::config::{ConfigurationError, NetworkTable};
use crate::contract::ContractHandle;
use crate::deploy::{deploy, DeployOptions, DeploymentRecord, DeploymentStore};
use crate::error::{ClientError, DeploymentError, PipelineError, ReadError, TransactionError};
use crate::mint::{mint, MintReceipt, SeedContent};
use crate::network::{resolve, NetworkContext};
use crate::report::{report, verify_command, Report};
use log::{info, warn};
use std::path::PathBuf;

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct MintJob {
    pub artifact: Artifact,
    pub seed: SeedContent,
    /// Deployment cache root, consulted on networks that save deployments
    pub deployments_dir: Option<PathBuf>,
}

impl MintJob {
    #[must_use]
    pub const fn new(artifact: Artifact, seed: SeedContent) -> Self {
        Self {
            artifact,
            seed,
            deployments_dir: None,
        }
    }

    #[must_use]
    pub fn with_deployments_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.deployments_dir = Some(dir.into());
        self
    }
}

/// Result of a run whose deployment and mint succeeded
#[derive(Debug)]
pub struct Outcome {
    pub deployment: DeploymentRecord,
    pub mint: MintReceipt,
    /// A failed read leaves the minted token in place
    pub report: Result<Report, ReadError>,
}

impl Outcome {
    /// The report, or the read failure as a [`PipelineError::Read`]
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Read`] if the token URI could not be read.
    pub fn into_result(self) -> Result<Report, PipelineError> {
        self.report.map_err(PipelineError::Read)
    }
}

/// Deploy the job's artifact, mint its seed and report the token URI
///
/// # Errors
///
/// Returns [`PipelineError::Transaction`] for empty seed content before any
/// network call, [`PipelineError::Configuration`] if the node serves another
/// chain, and the failing step's error otherwise.
pub fn execute<C: ChainClient + ?Sized>(
    client: &C,
    context: &NetworkContext,
    job: &MintJob,
) -> Result<Outcome, PipelineError> {
    if job.seed.is_empty() {
        return Err(TransactionError::EmptyContent.into());
    }

    let actual = client.chain_id().map_err(DeploymentError::Connect)?;
    if actual != context.chain_id {
        return Err(ConfigurationError::ChainMismatch {
            expected: context.chain_id,
            actual,
        }
        .into());
    }

    let store = job
        .deployments_dir
        .as_ref()
        .filter(|_| context.save_deployments)
        .map(DeploymentStore::new);
    let options = DeployOptions {
        network: &context.network_name,
        constructor_args: Vec::new(),
        gas_limit: context.gas_limit,
        policy: context.policy,
        store: store.as_ref(),
    };
    let deployment = deploy(client, &job.artifact, &context.deployer, &options)?;
    info!("You have deployed an NFT contract to {}", deployment.address);
    info!(
        "Verify with:\n {}",
        verify_command(&context.network_name, &deployment.address)
    );

    let handle = ContractHandle::from_deployment(client, &deployment, context.minter.clone());
    let receipt = mint(&handle, &job.seed, &context.policy, context.gas_limit)?;

    let report = report(&handle, &receipt, &context.network_name);
    if let Err(e) = &report {
        warn!("token minted but report incomplete: {e}");
    }

    Ok(Outcome {
        deployment,
        mint: receipt,
        report,
    })
}

/// Resolve `chain_id`, connect, and [`execute`] the job
///
/// Resolution happens first, so an unknown chain fails before `connect` is
/// called.
///
/// # Errors
///
/// Returns [`PipelineError::Configuration`] if the chain cannot be resolved,
/// [`DeploymentError::Connect`] if `connect` fails, and otherwise whatever
/// [`execute`] returns.
pub fn provision<C, E, F>(
    networks: &NetworkTable,
    chain_id: u64,
    env: E,
    connect: F,
    job: &MintJob,
) -> Result<Outcome, PipelineError>
where
    C: ChainClient,
    E: Fn(&str) -> Option<String>,
    F: FnOnce(&NetworkContext) -> Result<C, ClientError>,
{
    let context = resolve(networks, chain_id, env)?;
    let client = connect(&context).map_err(DeploymentError::Connect)?;
    execute(&client, &context, job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_client::MockClient;
    use crate::test_fixtures::{immediate_policy, svgnft_artifact, STAR_SVG};

    fn local_context() -> NetworkContext {
        let mut context = resolve(&NetworkTable::builtin(), 31337, |_| None).unwrap();
        context.policy = immediate_policy();
        context
    }

    fn job() -> MintJob {
        MintJob::new(svgnft_artifact(), SeedContent::new(STAR_SVG))
    }

    #[test]
    fn test_execute_full_run() {
        let client = MockClient::new();
        let context = local_context();
        let outcome = execute(&client, &context, &job()).unwrap();

        assert_eq!(outcome.mint.token_index, 0);
        assert!(outcome.mint.confirmed);
        let report = outcome.into_result().unwrap();
        assert_eq!(
            report.verify_command,
            format!("verify --network localhost {}", report.contract_address)
        );
        assert_eq!(
            report.token_uri.metadata().unwrap().image_svg().unwrap(),
            STAR_SVG
        );
    }

    #[test]
    fn test_failed_read_keeps_confirmed_mint() {
        let client = MockClient::new();
        client.fail_next_call("upstream request timed out");
        let outcome = execute(&client, &local_context(), &job()).unwrap();

        assert!(outcome.mint.confirmed);
        assert_eq!(outcome.mint.token_index, 0);
        assert_eq!(client.token_count(&outcome.deployment.address), 1);
        assert!(matches!(outcome.report, Err(ReadError::Call(_))));
        let err = outcome.into_result().unwrap_err();
        assert!(matches!(err, PipelineError::Read(ReadError::Call(_))));
        assert!(err.to_string().contains("token was minted"));
    }

    #[test]
    fn test_chain_mismatch_stops_before_deploy() {
        let client = MockClient::new().with_chain_id(4);
        let err = execute(&client, &local_context(), &job()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Configuration(ConfigurationError::ChainMismatch {
                expected: 31337,
                actual: 4
            })
        ));
        assert_eq!(client.calls().send_transaction, 0);
    }

    #[test]
    fn test_empty_seed_fails_before_any_call() {
        let client = MockClient::new();
        let job = MintJob::new(svgnft_artifact(), SeedContent::new(""));
        let err = execute(&client, &local_context(), &job).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Transaction(TransactionError::EmptyContent)
        ));
        assert_eq!(client.calls().total(), 0);
    }

    #[test]
    fn test_deployments_dir_ignored_unless_saving() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockClient::new();
        let job = job().with_deployments_dir(dir.path());

        execute(&client, &local_context(), &job).unwrap();
        assert!(!dir.path().join("localhost").exists());

        let mut saving = local_context();
        saving.save_deployments = true;
        let first = execute(&client, &saving, &job).unwrap();
        let second = execute(&client, &saving, &job).unwrap();
        assert!(dir.path().join("localhost").join("SVGNFT.json").exists());
        assert!(second.deployment.reused);
        assert_eq!(first.deployment.address, second.deployment.address);
        // the reused contract keeps counting tokens
        assert_eq!(second.mint.token_index, 1);
    }

    #[test]
    fn test_provision_connect_failure() {
        let err = provision(
            &NetworkTable::builtin(),
            31337,
            |_| None,
            |_| -> Result<MockClient, ClientError> {
                Err(ClientError::Transport("connection refused".to_string()))
            },
            &job(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Deployment(DeploymentError::Connect(_))
        ));
    }
}
