//! Reading back the minted token and describing the result to the operator

use crate::abi::DynSolValue;
use crate::address::Address;
use crate::client::ChainClient;
use crate::contract::ContractHandle;
use crate::error::ReadError;
use crate::metadata::TokenUri;
use crate::mint::MintReceipt;
use alloy_primitives::U256;
use log::info;

/// Read-only entry point returning a token's metadata URI
pub const TOKEN_URI_FUNCTION: &str = "tokenURI";

/// Command an operator runs to verify the contract source on a block explorer
///
/// # Examples
///
/// ```
/// use svgnft::report::verify_command;
/// use svgnft::Address;
///
/// assert_eq!(
///     verify_command("rinkeby", &Address::ZERO),
///     "verify --network rinkeby 0x0000000000000000000000000000000000000000"
/// );
/// ```
#[must_use]
pub fn verify_command(network_name: &str, address: &Address) -> String {
    format!("verify --network {network_name} {address}")
}

/// What an operator needs after a successful mint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub contract_address: Address,
    pub verify_command: String,
    pub token_uri: TokenUri,
}

/// Fetch the token URI of a confirmed mint
///
/// # Errors
///
/// Returns [`ReadError::Unconfirmed`] without any call if `receipt` is not
/// confirmed, or another [`ReadError`] if the read fails.
pub fn report<C: ChainClient + ?Sized>(
    handle: &ContractHandle<'_, C>,
    receipt: &MintReceipt,
    network_name: &str,
) -> Result<Report, ReadError> {
    if !receipt.confirmed {
        return Err(ReadError::Unconfirmed(receipt.transaction_hash));
    }

    let index = DynSolValue::Uint(U256::from(receipt.token_index), 256);
    let token_uri = handle
        .read(TOKEN_URI_FUNCTION, &[index])?
        .first()
        .and_then(DynSolValue::as_str)
        .map(TokenUri::new)
        .ok_or(ReadError::UnexpectedOutput)?;

    info!("token URI: {token_uri}");
    Ok(Report {
        contract_address: *handle.address(),
        verify_command: verify_command(network_name, handle.address()),
        token_uri,
    })
}
