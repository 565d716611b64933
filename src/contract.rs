//! Callable handles to deployed contracts

use crate::abi::{DynSolValue, Interface};
use crate::address::Address;
use crate::client::{ChainClient, TransactionRequest, TxHash};
use crate::deploy::DeploymentRecord;
use crate::error::{ReadError, TransactionError};
use crate::signer::SigningIdentity;
use alloy_dyn_abi::{FunctionExt, JsonAbiExt};

/// A deployed contract bound to an interface and a signing identity
///
/// Binding performs no network I/O; the handle only describes where and how
/// to call.
pub struct ContractHandle<'a, C: ChainClient + ?Sized> {
    client: &'a C,
    address: Address,
    interface: Interface,
    signer: SigningIdentity,
}

impl<'a, C: ChainClient + ?Sized> ContractHandle<'a, C> {
    /// Bind `address` with `interface`, sending as `signer`
    ///
    /// # Examples
    ///
    /// ```
    /// use svgnft::abi::Interface;
    /// use svgnft::mock_client::MockClient;
    /// use svgnft::{Address, ContractHandle, SigningIdentity};
    ///
    /// let client = MockClient::new();
    /// let handle = ContractHandle::new(
    ///     &client,
    ///     Address::ZERO,
    ///     Interface::default(),
    ///     SigningIdentity::Unlocked(Address::ZERO),
    /// );
    /// assert_eq!(handle.address(), &Address::ZERO);
    /// ```
    pub const fn new(
        client: &'a C,
        address: Address,
        interface: Interface,
        signer: SigningIdentity,
    ) -> Self {
        Self {
            client,
            address,
            interface,
            signer,
        }
    }

    /// Bind the contract described by a deployment record
    ///
    /// The record's interface is the one used for calls; the signer may be any
    /// funded identity, not only the deployer.
    pub fn from_deployment(
        client: &'a C,
        record: &DeploymentRecord,
        signer: SigningIdentity,
    ) -> Self {
        Self::new(client, record.address, record.abi.clone(), signer)
    }

    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    #[must_use]
    pub const fn interface(&self) -> &Interface {
        &self.interface
    }

    #[must_use]
    pub const fn signer(&self) -> &SigningIdentity {
        &self.signer
    }

    #[must_use]
    pub const fn client(&self) -> &'a C {
        self.client
    }

    /// Submit a state-changing call and return its hash without waiting
    ///
    /// # Errors
    ///
    /// Returns an error if the call cannot be encoded or the node rejects it.
    pub fn send(
        &self,
        function: &str,
        args: &[DynSolValue],
        gas_limit: Option<u64>,
    ) -> Result<TxHash, TransactionError> {
        let data = self.interface.encode_call(function, args)?;
        let request = TransactionRequest::call(self.address, data).with_gas_limit(gas_limit);
        self.client
            .send_transaction(&self.signer, &request)
            .map_err(TransactionError::Rejected)
    }

    /// Execute a read-only call and decode its return values
    ///
    /// # Errors
    ///
    /// Returns an error if the call cannot be encoded, fails, or returns data
    /// that does not match the declared outputs.
    pub fn read(
        &self,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, ReadError> {
        let function = self.interface.function(function).map_err(ReadError::Encode)?;
        let data = function
            .abi_encode_input(args)
            .map_err(|e| ReadError::Encode(e.into()))?;
        let output = self.client.call(&self.address, &data)?;
        function
            .abi_decode_output(&output)
            .map_err(|e| ReadError::Decode(e.into()))
    }
}
