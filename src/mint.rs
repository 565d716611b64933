//! Minting a token from seed content
//!
//! Every call to [`mint`] creates a new token, even for identical content.
//! Callers that need idempotence must de-duplicate before calling.

use crate::abi::{DynSolValue, Interface};
use crate::address::Address;
use crate::client::{ChainClient, Receipt, TxHash};
use crate::confirm::{wait_for_confirmations, Confirmation, ConfirmationFailure, ConfirmationPolicy};
use crate::contract::ContractHandle;
use crate::error::{AbiError, TransactionError};
use log::info;
use std::path::Path;

/// State-changing entry point taking the seed content
pub const MINT_FUNCTION: &str = "create";

/// ERC-721 event whose `tokenId` topic identifies the minted token
pub const TRANSFER_EVENT: &str = "Transfer";

/// Raw SVG markup, passed to the contract unmodified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedContent(String);

impl SeedContent {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    /// Read seed content as UTF-8
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not UTF-8.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        std::fs::read_to_string(path).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A confirmed mint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub transaction_hash: TxHash,
    /// Only `true` once the required confirmations were observed
    pub confirmed: bool,
    pub token_index: u64,
    pub block_number: u64,
}

/// Mint one token carrying `seed` and wait for `policy.confirmations`
///
/// # Errors
///
/// Returns [`TransactionError::EmptyContent`] before any network call when
/// `seed` is empty; otherwise an error if the call is rejected, reverts, is
/// not confirmed in time, or emits no mint `Transfer` event.
pub fn mint<C: ChainClient + ?Sized>(
    handle: &ContractHandle<'_, C>,
    seed: &SeedContent,
    policy: &ConfirmationPolicy,
    gas_limit: Option<u64>,
) -> Result<MintReceipt, TransactionError> {
    if seed.is_empty() {
        return Err(TransactionError::EmptyContent);
    }

    let content = DynSolValue::String(seed.as_str().to_string());
    let tx = handle.send(MINT_FUNCTION, &[content], gas_limit)?;
    info!("minting from {} (tx: {tx})...", handle.signer().address());

    let receipt = match wait_for_confirmations(handle.client(), tx, policy)
        .map_err(|source| TransactionError::Network { tx, source })?
    {
        Confirmation::Confirmed(receipt) => receipt,
        Confirmation::Failed(ConfirmationFailure::Reverted(_)) => {
            return Err(TransactionError::Reverted(tx))
        }
        Confirmation::Failed(ConfirmationFailure::TimedOut { waited }) => {
            return Err(TransactionError::NotConfirmed {
                tx,
                waited_secs: waited.as_secs(),
            })
        }
    };

    let token_index = minted_token_index(&receipt, handle.address(), handle.interface())?
        .ok_or(TransactionError::MissingTokenIndex(tx))?;

    info!("NFT has been successfully created");
    Ok(MintReceipt {
        transaction_hash: tx,
        confirmed: true,
        token_index,
        block_number: receipt.block_number,
    })
}

/// Token id of the first `Transfer(0x0, _, id)` emitted by `contract`
fn minted_token_index(
    receipt: &Receipt,
    contract: &Address,
    interface: &Interface,
) -> Result<Option<u64>, AbiError> {
    for log in receipt.logs.iter().filter(|log| log.address == *contract) {
        let Some(event) = interface.decode_event(TRANSFER_EVENT, log)? else {
            continue;
        };
        if event.indexed.first().and_then(DynSolValue::as_address) != Some(Address::ZERO) {
            continue;
        }
        return Ok(event
            .indexed
            .get(2)
            .and_then(DynSolValue::as_uint)
            .and_then(|(id, _)| u64::try_from(id).ok()));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Log;
    use crate::deploy::{deploy, DeployOptions};
    use crate::mock_client::MockClient;
    use crate::test_fixtures::{
        immediate_policy, svgnft_artifact, svgnft_interface, test_deployer, test_minter, STAR_SVG,
    };
    use alloy_primitives::B256;

    fn bound(client: &MockClient) -> ContractHandle<'_, MockClient> {
        let options = DeployOptions {
            network: "localhost",
            policy: immediate_policy(),
            ..DeployOptions::default()
        };
        let record = deploy(client, &svgnft_artifact(), &test_deployer(), &options).unwrap();
        ContractHandle::from_deployment(client, &record, test_minter())
    }

    #[test]
    fn test_first_mint_is_index_zero() {
        let client = MockClient::new();
        let handle = bound(&client);
        let seed = SeedContent::new(STAR_SVG);
        let receipt = mint(&handle, &seed, &immediate_policy(), None).unwrap();
        assert!(receipt.confirmed);
        assert_eq!(receipt.token_index, 0);
    }

    #[test]
    fn test_mint_is_additive() {
        let client = MockClient::new();
        let handle = bound(&client);
        let seed = SeedContent::new(STAR_SVG);
        let first = mint(&handle, &seed, &immediate_policy(), None).unwrap();
        let second = mint(&handle, &seed, &immediate_policy(), None).unwrap();
        assert_eq!(first.token_index, 0);
        assert_eq!(second.token_index, 1);
        assert_ne!(first.transaction_hash, second.transaction_hash);
        assert_eq!(client.token_count(handle.address()), 2);
    }

    #[test]
    fn test_empty_seed_rejected_before_network() {
        let client = MockClient::new();
        let handle = bound(&client);
        let before = client.calls();
        let err = mint(&handle, &SeedContent::new(""), &immediate_policy(), None).unwrap_err();
        assert!(matches!(err, TransactionError::EmptyContent));
        assert_eq!(client.calls(), before);
    }

    #[test]
    fn test_rejected_mint() {
        let client = MockClient::new();
        let handle = bound(&client);
        client.reject_next_send("nonce too low");
        let seed = SeedContent::new("<svg/>");
        let err = mint(&handle, &seed, &immediate_policy(), None).unwrap_err();
        assert!(matches!(err, TransactionError::Rejected(_)));
    }

    #[test]
    fn test_reverted_mint() {
        let client = MockClient::new();
        let handle = bound(&client);
        client.revert_next_send();
        let seed = SeedContent::new("<svg/>");
        let err = mint(&handle, &seed, &immediate_policy(), None).unwrap_err();
        assert!(matches!(err, TransactionError::Reverted(_)));
        assert_eq!(client.token_count(handle.address()), 0);
    }

    #[test]
    fn test_unconfirmed_mint() {
        let client = MockClient::new();
        let handle = bound(&client);
        client.withhold_receipts(true);
        let seed = SeedContent::new("<svg/>");
        let err = mint(&handle, &seed, &immediate_policy(), None).unwrap_err();
        assert!(matches!(err, TransactionError::NotConfirmed { .. }));
    }

    #[test]
    fn test_token_index_ignores_foreign_logs() {
        let interface = svgnft_interface();
        let contract = Address::repeat_byte(7);
        let topic = interface.event_topic(TRANSFER_EVENT).unwrap();
        let id = B256::with_last_byte(5);
        let to = Address::repeat_byte(1).into_word();
        let transfer = |address: Address, from: Address| {
            Log::new_unchecked(address, vec![topic, from.into_word(), to, id], Default::default())
        };
        let receipt = Receipt {
            transaction_hash: TxHash::default(),
            block_number: 1,
            status: true,
            contract_address: None,
            gas_used: 0,
            logs: vec![
                transfer(Address::repeat_byte(8), Address::ZERO),
                transfer(contract, Address::repeat_byte(1)),
                transfer(contract, Address::ZERO),
            ],
        };
        assert_eq!(minted_token_index(&receipt, &contract, &interface), Ok(Some(5)));

        let none = Receipt {
            logs: Vec::new(),
            ..receipt
        };
        assert_eq!(minted_token_index(&none, &contract, &interface), Ok(None));
    }

    #[test]
    fn test_seed_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("star.svg");
        std::fs::write(&path, STAR_SVG).unwrap();
        assert_eq!(SeedContent::from_file(&path).unwrap().as_str(), STAR_SVG);
        assert!(SeedContent::from_file(dir.path().join("missing.svg")).is_err());
    }
}
