//! Error types for svgnft operations

use crate::client::TxHash;
use crate::config::ConfigurationError;
use thiserror::Error;

/// Errors reported by a [`ChainClient`](crate::client::ChainClient) backend
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid node response: {0}")]
    InvalidResponse(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Errors that can occur while parsing addresses and hashes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("Missing 0x prefix")]
    MissingPrefix,

    #[error("Expected {expected} hex characters, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Checksum mismatch for {0}")]
    BadChecksum(String),
}

/// Errors that can occur while encoding or decoding contract calls
#[derive(Debug, Error, PartialEq)]
pub enum AbiError {
    #[error("Invalid ABI: {0}")]
    InvalidAbi(String),

    #[error("Function `{0}` not found in interface")]
    UnknownFunction(String),

    #[error("Event `{0}` not found in interface")]
    UnknownEvent(String),

    #[error("Interface declares no constructor but {0} arguments were given")]
    UnexpectedConstructorArgs(usize),

    #[error(transparent)]
    Codec(#[from] alloy_dyn_abi::Error),
}

/// Errors that can occur while loading a compiled contract artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed artifact JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Artifact `{0}` has no bytecode (abstract contract or interface?)")]
    EmptyBytecode(String),

    #[error("Artifact `{name}` has invalid bytecode: {reason}")]
    InvalidBytecode { name: String, reason: String },

    #[error("Artifact ABI error: {0}")]
    Abi(#[from] AbiError),
}

/// Errors that can occur while decoding an inline token URI
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Token URI is not an inline data URI: {0}")]
    NotInline(String),

    #[error("Unexpected media type `{0}`")]
    MediaType(String),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while publishing the contract artifact
#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("Could not connect to network: {0}")]
    Connect(ClientError),

    #[error("Could not encode constructor arguments: {0}")]
    Encode(#[from] AbiError),

    #[error("Deployment transaction rejected: {0}")]
    Rejected(ClientError),

    #[error("Network error while awaiting deployment {tx}: {source}")]
    Network { tx: TxHash, source: ClientError },

    #[error("Deployment transaction {0} reverted")]
    Reverted(TxHash),

    #[error("Deployment transaction {tx} not confirmed after {waited_secs}s")]
    NotConfirmed { tx: TxHash, waited_secs: u64 },

    #[error("Receipt for {0} carries no contract address")]
    MissingContractAddress(TxHash),

    #[error("Deployment cache error: {0}")]
    Store(String),
}

/// Errors that can occur while submitting and confirming the mint
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Seed content is empty; refusing to mint")]
    EmptyContent,

    #[error("Could not encode call: {0}")]
    Encode(#[from] AbiError),

    #[error("Transaction rejected: {0}")]
    Rejected(ClientError),

    #[error("Network error while awaiting {tx}: {source}")]
    Network { tx: TxHash, source: ClientError },

    #[error("Transaction {0} reverted")]
    Reverted(TxHash),

    #[error("Transaction {tx} not confirmed after {waited_secs}s")]
    NotConfirmed { tx: TxHash, waited_secs: u64 },

    #[error("Transaction {0} confirmed but emitted no mint Transfer event")]
    MissingTokenIndex(TxHash),
}

/// Errors that can occur while reading back the minted token
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Mint {0} is not confirmed; refusing to read token URI")]
    Unconfirmed(TxHash),

    #[error("Could not encode read call: {0}")]
    Encode(AbiError),

    #[error("Read call failed: {0}")]
    Call(#[from] ClientError),

    #[error("Could not decode read result: {0}")]
    Decode(AbiError),

    #[error("Read call returned an unexpected shape")]
    UnexpectedOutput,
}

/// Top-level failure of a provisioning run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Deployment error: {0}")]
    Deployment(#[from] DeploymentError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Read error (token was minted): {0}")]
    Read(#[from] ReadError),
}
