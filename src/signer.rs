//! Signing identities and local transaction signing

use crate::address::Address;
use crate::error::ClientError;
use alloy_consensus::{SignableTransaction, TxLegacy};
use alloy_primitives::B256;
use alloy_signer::SignerSync;
use alloy_signer_local::{LocalSignerError, PrivateKeySigner};
use secp256k1::SecretKey;
use std::fmt;

/// Who authorizes a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningIdentity {
    /// Account whose key is held by the node (development networks)
    Unlocked(Address),
    /// Key held by this process; transactions are signed before broadcast
    Local(LocalSigner),
}

impl SigningIdentity {
    /// The account address transactions are sent from
    #[must_use]
    pub fn address(&self) -> Address {
        match self {
            Self::Unlocked(address) => *address,
            Self::Local(signer) => signer.address(),
        }
    }
}

impl From<LocalSigner> for SigningIdentity {
    fn from(signer: LocalSigner) -> Self {
        Self::Local(signer)
    }
}

/// A secp256k1 key able to sign transactions
#[derive(Clone)]
pub struct LocalSigner {
    inner: PrivateKeySigner,
}

impl LocalSigner {
    /// # Panics
    ///
    /// Never panics: every secp256k1 secret key is a valid signing scalar.
    #[must_use]
    pub fn new(secret: SecretKey) -> Self {
        let inner = PrivateKeySigner::from_bytes(&B256::from(secret.secret_bytes()))
            .expect("secp256k1 secret keys are valid signing keys");
        Self { inner }
    }

    /// Parse a hex private key, with or without `0x`
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not 32 bytes of hex or not a valid key.
    pub fn from_hex(s: &str) -> Result<Self, LocalSignerError> {
        s.trim().parse().map(|inner| Self { inner })
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// Sign `tx` and return the raw transaction bytes
    ///
    /// `tx.chain_id` selects EIP-155 replay protection; `None` signs a
    /// pre-EIP-155 transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot produce a signature for the hash.
    pub fn sign(&self, tx: TxLegacy) -> Result<Vec<u8>, ClientError> {
        let signature = self
            .inner
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| ClientError::Signing(e.to_string()))?;
        let signed = tx.into_signed(signature);
        let mut raw = Vec::with_capacity(signed.rlp_encoded_length());
        signed.rlp_encode(&mut raw);
        Ok(raw)
    }
}

impl PartialEq for LocalSigner {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for LocalSigner {}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::secret_key_from_u32;
    use alloy_consensus::Signed;
    use alloy_primitives::{Bytes, TxKind, U256};

    const HARDHAT_KEY_0: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn transfer() -> TxLegacy {
        TxLegacy {
            chain_id: Some(1),
            nonce: 9,
            gas_price: 20_000_000_000,
            gas_limit: 21_000,
            to: TxKind::Call(Address::repeat_byte(0x35)),
            value: U256::from(1_000_000_000_000_000_000u64),
            input: Bytes::new(),
        }
    }

    #[test]
    fn test_from_hex_derives_address() {
        let signer = LocalSigner::from_hex(HARDHAT_KEY_0).unwrap();
        assert_eq!(
            signer.address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert!(LocalSigner::from_hex("0x1234").is_err());
        assert!(LocalSigner::from_hex("0xnothex").is_err());
    }

    #[test]
    fn test_new_matches_from_hex() {
        let key = "0x0000000000000000000000000000000000000000000000000000000000000002";
        assert_eq!(
            LocalSigner::new(secret_key_from_u32(2)),
            LocalSigner::from_hex(key).unwrap()
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let signer = LocalSigner::new(secret_key_from_u32(5));
        let debug = format!("{signer:?}");
        assert!(debug.contains("address"));
        assert!(!debug.contains("credential"));
    }

    #[test]
    fn test_eip155_signing_hash_vector() {
        // example transaction from EIP-155
        assert_eq!(
            transfer().signature_hash().to_string(),
            "0xdaf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn test_signature_recovers_sender() {
        let signer = LocalSigner::new(secret_key_from_u32(0x4646));
        let raw = signer.sign(transfer()).unwrap();

        let signed = Signed::<TxLegacy>::rlp_decode(&mut raw.as_slice()).unwrap();
        assert_eq!(signed.tx(), &transfer());
        assert_eq!(signed.recover_signer().unwrap(), signer.address());
    }

    #[test]
    fn test_identity_address() {
        let signer = LocalSigner::new(secret_key_from_u32(3));
        let expected = signer.address();
        assert_eq!(SigningIdentity::from(signer).address(), expected);
        assert_eq!(
            SigningIdentity::Unlocked(Address::ZERO).address(),
            Address::ZERO
        );
    }
}
