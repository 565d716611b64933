//! Account and contract addresses
//!
//! [`Address`] displays in the EIP-55 checksummed form. Its `FromStr` accepts
//! any casing with or without `0x`; [`parse_address`] is the strict variant
//! used for operator input.

use crate::error::AddressError;
use serde::{Deserialize, Deserializer, Serializer};
use std::str::FromStr;

pub use alloy_primitives::Address;

/// Length of the canonical string form, including the `0x` prefix
pub const STRING_LEN: usize = 42;

/// Parse a `0x`-prefixed address, verifying the checksum of mixed-case input
///
/// All-lower or all-upper input carries no checksum and is accepted as is.
///
/// # Examples
///
/// ```
/// use svgnft::address::parse_address;
///
/// let address = parse_address("0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap();
/// assert_eq!(address.to_string(), "0x5FbDB2315678afecb367f032d93F642f64180aa3");
/// assert!(parse_address("0x5fBDB2315678afecb367f032d93F642f64180aa3").is_err());
/// ```
///
/// # Errors
///
/// Returns an error if the prefix is missing, the length is wrong, the digits
/// are not hex or a mixed-case checksum does not match.
pub fn parse_address(s: &str) -> Result<Address, AddressError> {
    let digits = s.strip_prefix("0x").ok_or(AddressError::MissingPrefix)?;
    if digits.len() != STRING_LEN - 2 {
        return Err(AddressError::InvalidLength {
            expected: STRING_LEN - 2,
            got: digits.len(),
        });
    }

    let mixed = digits.chars().any(|c| c.is_ascii_lowercase())
        && digits.chars().any(|c| c.is_ascii_uppercase());
    if mixed {
        return Address::parse_checksummed(s, None).map_err(|e| match e {
            alloy_primitives::AddressError::InvalidChecksum => {
                AddressError::BadChecksum(s.to_string())
            }
            alloy_primitives::AddressError::Hex(e) => AddressError::InvalidHex(e.to_string()),
        });
    }
    Address::from_str(s).map_err(|e| AddressError::InvalidHex(e.to_string()))
}

/// True if `s` is a well-formed address string
#[must_use]
pub fn is_canonical(s: &str) -> bool {
    parse_address(s).is_ok()
}

/// Serde adapter storing addresses checksummed and reading them strictly
///
/// Use with `#[serde(with = "crate::address::checksummed")]`.
pub mod checksummed {
    use super::{parse_address, Address, Deserialize, Deserializer, Serializer};

    /// Write the EIP-55 form
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(address)
    }

    /// Read with [`parse_address`]
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a well-formed address string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_address(&s).map_err(serde::de::Error::custom)
    }
}
