//! JSON-RPC `ChainClient` implementation for EVM nodes
//!
//! Unlocked identities are sent with `eth_sendTransaction` and signed by the
//! node. Local identities are filled in (nonce, gas price, gas limit), signed
//! here and broadcast with `eth_sendRawTransaction`.
//!
//! The transport is plain HTTP; put a local proxy in front of `https`
//! endpoints.
//!
//! # Example
//!
//! ```no_run
//! use svgnft::client::ChainClient;
//! use svgnft::RpcClient;
//!
//! let client = RpcClient::new("http://127.0.0.1:8545").unwrap();
//! println!("chain id {}", client.chain_id().unwrap());
//! ```

use crate::address::Address;
use crate::client::{ChainClient, ClientResult, Receipt, TransactionRequest, TxHash};
use crate::error::ClientError;
use crate::network::NetworkContext;
use crate::signer::{LocalSigner, SigningIdentity};
use alloy_consensus::TxLegacy;
use alloy_primitives::{hex, Bytes, TxKind, U128, U256, U64};
use alloy_rpc_types_eth::TransactionReceipt;
use log::debug;
use serde_json::{json, Value};
use std::time::Duration;

/// Per-request HTTP timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// RPC client for EVM JSON-RPC endpoints
pub struct RpcClient {
    client: jsonrpc::Client,
    url: String,
}

impl RpcClient {
    /// Create a client for `url`
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be used by the HTTP transport.
    pub fn new(url: &str) -> ClientResult<Self> {
        let transport = jsonrpc::simple_http::SimpleHttpTransport::builder()
            .url(url)
            .map_err(|e| ClientError::Transport(format!("Invalid RPC URL `{url}`: {e}")))?
            .timeout(REQUEST_TIMEOUT)
            .build();

        Ok(Self {
            client: jsonrpc::Client::with_transport(transport),
            url: url.to_string(),
        })
    }

    /// Create a client for the endpoint of a resolved network
    ///
    /// # Errors
    ///
    /// Returns an error if the network's URL cannot be used.
    pub fn from_context(context: &NetworkContext) -> ClientResult<Self> {
        Self::new(&context.rpc_url)
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make an RPC call
    fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: &[Value],
    ) -> ClientResult<T> {
        let params_json = serde_json::to_string(params)
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to serialize params: {e}")))?;
        let raw_params = serde_json::value::RawValue::from_string(params_json)
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to create raw value: {e}")))?;

        debug!("{method} {raw_params}");
        let request = self.client.build_request(method, Some(&raw_params));
        let response = self.client.send_request(request).map_err(rpc_error)?;
        response.result().map_err(rpc_error)
    }

    fn quantity(&self, method: &str, params: &[Value]) -> ClientResult<u64> {
        let value: U64 = self.request(method, params)?;
        Ok(value.to())
    }

    fn bytes(&self, method: &str, params: &[Value]) -> ClientResult<Vec<u8>> {
        let value: Bytes = self.request(method, params)?;
        Ok(value.into())
    }

    fn send_local(&self, signer: &LocalSigner, tx: &TransactionRequest) -> ClientResult<TxHash> {
        let from = signer.address();
        let nonce = self.quantity("eth_getTransactionCount", &[json!(from), json!("pending")])?;
        let gas_price: U128 = self.request("eth_gasPrice", &[])?;
        let gas_limit = match tx.gas_limit {
            Some(limit) => limit,
            None => self.quantity("eth_estimateGas", &[tx_object(&from, tx)])?,
        };
        let chain_id = self.chain_id()?;

        let raw = signer.sign(TxLegacy {
            chain_id: Some(chain_id),
            nonce,
            gas_price: gas_price.to(),
            gas_limit,
            to: tx.to.map_or(TxKind::Create, TxKind::Call),
            value: U256::ZERO,
            input: Bytes::copy_from_slice(&tx.data),
        })?;
        debug!("signed tx from {from} with nonce {nonce}, gas {gas_limit} at {gas_price} wei");
        self.request("eth_sendRawTransaction", &[json!(hex::encode_prefixed(raw))])
    }
}

/// Map a `jsonrpc` failure, keeping node error codes and messages verbatim
fn rpc_error(e: jsonrpc::Error) -> ClientError {
    match e {
        jsonrpc::Error::Rpc(rpc) => ClientError::Rpc {
            code: i64::from(rpc.code),
            message: rpc.message,
        },
        jsonrpc::Error::Json(e) => ClientError::InvalidResponse(e.to_string()),
        other => ClientError::Transport(other.to_string()),
    }
}

/// Transaction object for `eth_sendTransaction` and `eth_estimateGas`
fn tx_object(from: &Address, tx: &TransactionRequest) -> Value {
    let mut object = json!({
        "from": from,
        "data": hex::encode_prefixed(&tx.data),
    });
    if let Some(to) = tx.to {
        object["to"] = json!(to);
    }
    if let Some(gas) = tx.gas_limit {
        object["gas"] = json!(U64::from(gas));
    }
    object
}

/// Keep the fields the pipeline reads from a node receipt
fn into_receipt(receipt: &TransactionReceipt) -> ClientResult<Receipt> {
    let block_number = receipt.block_number.ok_or_else(|| {
        ClientError::InvalidResponse(format!(
            "receipt for {} has no block number",
            receipt.transaction_hash
        ))
    })?;
    Ok(Receipt {
        transaction_hash: receipt.transaction_hash,
        block_number,
        status: receipt.status(),
        contract_address: receipt.contract_address,
        gas_used: receipt.gas_used,
        logs: receipt.logs().iter().map(|log| log.inner.clone()).collect(),
    })
}

impl ChainClient for RpcClient {
    fn chain_id(&self) -> ClientResult<u64> {
        self.quantity("eth_chainId", &[])
    }

    fn block_number(&self) -> ClientResult<u64> {
        self.quantity("eth_blockNumber", &[])
    }

    fn send_transaction(
        &self,
        from: &SigningIdentity,
        tx: &TransactionRequest,
    ) -> ClientResult<TxHash> {
        match from {
            SigningIdentity::Unlocked(address) => {
                self.request("eth_sendTransaction", &[tx_object(address, tx)])
            }
            SigningIdentity::Local(signer) => self.send_local(signer, tx),
        }
    }

    fn transaction_receipt(&self, hash: &TxHash) -> ClientResult<Option<Receipt>> {
        let receipt: Option<TransactionReceipt> =
            self.request("eth_getTransactionReceipt", &[json!(hash)])?;
        receipt.as_ref().map(into_receipt).transpose()
    }

    fn call(&self, to: &Address, data: &[u8]) -> ClientResult<Vec<u8>> {
        let call = json!({ "to": to, "data": hex::encode_prefixed(data) });
        self.bytes("eth_call", &[call, json!("latest")])
    }

    fn code_at(&self, address: &Address) -> ClientResult<Vec<u8>> {
        self.bytes("eth_getCode", &[json!(address), json!("latest")])
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient").field("url", &self.url).finish()
    }
}
