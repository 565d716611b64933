//! Contract interface descriptors and call encoding
//!
//! [`Interface`] wraps the compiler's JSON ABI. Arguments and return values
//! travel as [`DynSolValue`]s and are type-checked against the declared
//! parameters before anything is encoded.

use crate::error::AbiError;
use alloy_dyn_abi::{EventExt, JsonAbiExt};
use alloy_json_abi::{Event, Function, JsonAbi};
use alloy_primitives::{Log, B256};
use serde::{Deserialize, Serialize};

pub use alloy_dyn_abi::{DecodedEvent, DynSolValue};

/// The callable shape of a contract, as emitted by the compiler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Interface(JsonAbi);

impl Interface {
    /// Parse a JSON ABI array
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not an array of ABI entries.
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        serde_json::from_str(json).map_err(|e| AbiError::InvalidAbi(e.to_string()))
    }

    /// Interpret an already-parsed JSON value as an ABI
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an array of ABI entries.
    pub fn from_value(value: serde_json::Value) -> Result<Self, AbiError> {
        serde_json::from_value(value).map_err(|e| AbiError::InvalidAbi(e.to_string()))
    }

    #[must_use]
    pub const fn abi(&self) -> &JsonAbi {
        &self.0
    }

    /// Look up a function by name (the first overload wins)
    ///
    /// # Examples
    ///
    /// ```
    /// use svgnft::abi::Interface;
    ///
    /// let abi = r#"[{"type":"function","name":"tokenURI",
    ///     "inputs":[{"name":"tokenId","type":"uint256"}],
    ///     "outputs":[{"name":"","type":"string"}],"stateMutability":"view"}]"#;
    /// let interface = Interface::from_json(abi).unwrap();
    /// let function = interface.function("tokenURI").unwrap();
    /// assert_eq!(function.signature(), "tokenURI(uint256)");
    /// assert_eq!(function.selector(), [0xc8, 0x7b, 0x56, 0xdd]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if no such function exists.
    pub fn function(&self, name: &str) -> Result<&Function, AbiError> {
        self.0
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| AbiError::UnknownFunction(name.to_string()))
    }

    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.function(name).is_ok()
    }

    /// Look up an event by name (the first overload wins)
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not declared.
    pub fn event(&self, name: &str) -> Result<&Event, AbiError> {
        self.0
            .event(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| AbiError::UnknownEvent(name.to_string()))
    }

    /// Topic hash identifying event `name`
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not declared.
    pub fn event_topic(&self, name: &str) -> Result<B256, AbiError> {
        self.event(name).map(Event::selector)
    }

    /// Selector of `function` followed by the encoded arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the function is unknown or `args` do not match its
    /// inputs.
    pub fn encode_call(&self, function: &str, args: &[DynSolValue]) -> Result<Vec<u8>, AbiError> {
        Ok(self.function(function)?.abi_encode_input(args)?)
    }

    /// Encoded constructor arguments, to be appended to the creation bytecode
    ///
    /// # Errors
    ///
    /// Returns an error if `args` do not match the constructor, or arguments
    /// are given for an interface that declares no constructor.
    pub fn encode_constructor(&self, args: &[DynSolValue]) -> Result<Vec<u8>, AbiError> {
        match self.0.constructor() {
            Some(constructor) => Ok(constructor.abi_encode_input(args)?),
            None if args.is_empty() => Ok(Vec::new()),
            None => Err(AbiError::UnexpectedConstructorArgs(args.len())),
        }
    }

    /// Decode `log` as event `name`; `None` if it is another event or shape
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not declared.
    pub fn decode_event(&self, name: &str, log: &Log) -> Result<Option<DecodedEvent>, AbiError> {
        Ok(self.event(name)?.decode_log(&log.data).ok())
    }
}
