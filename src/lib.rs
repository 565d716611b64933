//! svgnft - deploy an SVG NFT contract, mint one token and report its URI
//!
//! This crate drives a single provisioning run against an EVM network:
//! resolve the target network, deploy the compiled contract artifact, bind a
//! handle to the deployed address, mint a token from SVG markup and read the
//! resulting token URI back for the operator.
//!
//! # Example
//!
//! ```
//! use svgnft::config::NetworkTable;
//! use svgnft::mock_client::MockClient;
//! use svgnft::pipeline::{provision, MintJob};
//! use svgnft::{Artifact, SeedContent};
//!
//! let artifact = Artifact::from_file("tests/fixtures/SVGNFT.json").unwrap();
//! let job = MintJob::new(artifact, SeedContent::new("<svg></svg>"));
//!
//! let client = MockClient::new();
//! let outcome = provision(
//!     &NetworkTable::builtin(),
//!     31337,
//!     |_| None,
//!     |_| Ok(client.clone()),
//!     &job,
//! )
//! .unwrap();
//!
//! assert_eq!(outcome.mint.token_index, 0);
//! let report = outcome.into_result().unwrap();
//! let svg = report.token_uri.metadata().unwrap().image_svg().unwrap();
//! assert_eq!(svg, "<svg></svg>");
//! ```
//!
//! # Connecting to Nodes
//!
//! Use the `RpcClient` to talk to a JSON-RPC endpoint:
//!
//! ```no_run
//! use svgnft::config::NetworkTable;
//! use svgnft::pipeline::{provision, MintJob};
//! use svgnft::{Artifact, RpcClient, SeedContent};
//!
//! let job = MintJob::new(
//!     Artifact::from_file("artifacts/SVGNFT.json").unwrap(),
//!     SeedContent::from_file("images/star.svg").unwrap(),
//! );
//! let outcome = provision(
//!     &NetworkTable::builtin(),
//!     31337,
//!     |key| std::env::var(key).ok(),
//!     RpcClient::from_context,
//!     &job,
//! )
//! .unwrap();
//! println!("{}", outcome.into_result().unwrap().token_uri);
//! ```

pub mod abi;
pub mod address;
pub mod artifact;
pub mod client;
pub mod config;
pub mod confirm;
pub mod contract;
pub mod deploy;
pub mod error;
pub mod metadata;
pub mod mint;
pub mod mock_client;
pub mod network;
pub mod pipeline;
pub mod report;
#[cfg(feature = "rpc")]
pub mod rpc_client;
pub mod signer;
pub mod util;

#[cfg(test)]
mod test_fixtures;

// Re-export core types
pub use address::Address;
pub use artifact::Artifact;
pub use client::{ChainClient, Receipt, TxHash};
pub use config::{ConfigurationError, NetworkConfig, NetworkTable};
pub use confirm::{Confirmation, ConfirmationPolicy};
pub use contract::ContractHandle;
pub use deploy::{DeploymentRecord, DeploymentStore};
pub use error::{DeploymentError, PipelineError, ReadError, TransactionError};
pub use metadata::TokenUri;
pub use mint::{MintReceipt, SeedContent};
pub use network::NetworkContext;
pub use pipeline::{execute, provision, MintJob, Outcome};
pub use report::Report;
pub use signer::{LocalSigner, SigningIdentity};

#[cfg(feature = "rpc")]
pub use rpc_client::RpcClient;
