//! Abstract interface for interacting with EVM nodes

use crate::address::Address;
use crate::error::ClientError;
use crate::signer::SigningIdentity;

pub use alloy_primitives::{Log, TxHash};

/// Result type for node client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// An unsigned transaction to submit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    /// `None` deploys `data` as a new contract
    pub to: Option<Address>,
    pub data: Vec<u8>,
    /// Explicit gas limit; estimated by the node when absent
    pub gas_limit: Option<u64>,
}

impl TransactionRequest {
    #[must_use]
    pub fn deploy(data: Vec<u8>) -> Self {
        Self {
            to: None,
            data,
            gas_limit: None,
        }
    }

    #[must_use]
    pub fn call(to: Address, data: Vec<u8>) -> Self {
        Self {
            to: Some(to),
            data,
            gas_limit: None,
        }
    }

    #[must_use]
    pub fn with_gas_limit(mut self, gas_limit: Option<u64>) -> Self {
        self.gas_limit = gas_limit;
        self
    }
}

/// Outcome of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    /// `false` when execution reverted
    pub status: bool,
    pub contract_address: Option<Address>,
    pub gas_used: u64,
    pub logs: Vec<Log>,
}

/// Abstract interface for interacting with EVM nodes
///
/// This trait lets the pipeline run against a live JSON-RPC endpoint or an
/// in-memory chain through the same calls.
pub trait ChainClient {
    /// Chain id reported by the node
    fn chain_id(&self) -> ClientResult<u64>;

    /// Number of the latest block
    fn block_number(&self) -> ClientResult<u64>;

    /// Submit a transaction authorized by `from`
    fn send_transaction(
        &self,
        from: &SigningIdentity,
        tx: &TransactionRequest,
    ) -> ClientResult<TxHash>;

    /// Receipt of a mined transaction, `None` while still pending
    fn transaction_receipt(&self, hash: &TxHash) -> ClientResult<Option<Receipt>>;

    /// Execute a read-only call against the latest state
    fn call(&self, to: &Address, data: &[u8]) -> ClientResult<Vec<u8>>;

    /// Runtime code stored at `address` (empty for accounts without code)
    fn code_at(&self, address: &Address) -> ClientResult<Vec<u8>>;
}
