//! Test fixtures and constants for svgnft tests

#![allow(dead_code)] // Test fixtures may not all be used in every test

use crate::abi::Interface;
use crate::address::parse_address;
use crate::artifact::Artifact;
use crate::confirm::ConfirmationPolicy;
use crate::signer::{LocalSigner, SigningIdentity};
use crate::util::secret_key_from_u32;
use std::time::Duration;

/// Hardhat artifact of the SVG NFT contract
pub const SVGNFT_ARTIFACT_JSON: &str = include_str!("../tests/fixtures/SVGNFT.json");

/// Seed asset used by the deploy-and-mint scenarios
pub const STAR_SVG: &str = include_str!("../images/star.svg");

/// Hardhat default account 0, unlocked on a local node
pub const HARDHAT_ACCOUNT_0: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

#[must_use]
pub fn svgnft_artifact() -> Artifact {
    Artifact::from_json(SVGNFT_ARTIFACT_JSON).expect("valid fixture artifact")
}

#[must_use]
pub fn svgnft_interface() -> Interface {
    svgnft_artifact().interface().clone()
}

/// Deployer identity: an account unlocked on the node
#[must_use]
pub fn test_deployer() -> SigningIdentity {
    SigningIdentity::Unlocked(parse_address(HARDHAT_ACCOUNT_0).expect("valid address"))
}

/// Minter identity: a locally held key, distinct from the deployer
#[must_use]
pub fn test_minter() -> SigningIdentity {
    LocalSigner::new(secret_key_from_u32(2)).into()
}

/// Policy that polls without sleeping
#[must_use]
pub const fn immediate_policy() -> ConfirmationPolicy {
    ConfirmationPolicy::immediate(Duration::from_millis(50))
}
