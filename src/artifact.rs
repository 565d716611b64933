//! Compiled contract artifacts

use crate::abi::{DynSolValue, Interface};
use crate::error::{AbiError, ArtifactError};
use alloy_primitives::{hex, keccak256, B256};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    contract_name: String,
    abi: serde_json::Value,
    bytecode: String,
}

/// A compiled contract ready for deployment
#[derive(Debug, Clone)]
pub struct Artifact {
    name: String,
    interface: Interface,
    bytecode: Vec<u8>,
}

impl Artifact {
    /// Build an artifact from its parts
    ///
    /// # Errors
    ///
    /// Returns an error if `bytecode` is empty.
    pub fn new(name: &str, interface: Interface, bytecode: Vec<u8>) -> Result<Self, ArtifactError> {
        if bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            interface,
            bytecode,
        })
    }

    /// Parse a Hardhat-style artifact (`contractName`, `abi`, `bytecode`)
    ///
    /// # Examples
    ///
    /// ```
    /// use svgnft::Artifact;
    ///
    /// let json = r#"{"contractName":"Empty","abi":[],"bytecode":"0x6080"}"#;
    /// let artifact = Artifact::from_json(json).unwrap();
    /// assert_eq!(artifact.name(), "Empty");
    /// assert_eq!(artifact.bytecode(), &[0x60, 0x80]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, the ABI is invalid, or the
    /// bytecode is empty or not hex (e.g. contains unlinked library placeholders).
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let file: ArtifactFile = serde_json::from_str(json)?;
        let interface = Interface::from_value(file.abi)?;
        let bytecode = hex::decode(&file.bytecode).map_err(|e| ArtifactError::InvalidBytecode {
            name: file.contract_name.clone(),
            reason: e.to_string(),
        })?;
        Self::new(&file.contract_name, interface, bytecode)
    }

    /// Load an artifact from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn interface(&self) -> &Interface {
        &self.interface
    }

    #[must_use]
    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    /// Keccak-256 of the creation bytecode, used to detect stale deployments
    #[must_use]
    pub fn bytecode_hash(&self) -> B256 {
        keccak256(&self.bytecode)
    }

    /// Creation bytecode followed by the encoded constructor arguments
    ///
    /// # Errors
    ///
    /// Returns an error if `args` do not match the constructor.
    pub fn deploy_data(&self, args: &[DynSolValue]) -> Result<Vec<u8>, AbiError> {
        let mut data = self.bytecode.clone();
        data.extend(self.interface.encode_constructor(args)?);
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{svgnft_artifact, SVGNFT_ARTIFACT_JSON};
    use alloy_primitives::U256;

    #[test]
    fn test_from_json_fixture() {
        let artifact = Artifact::from_json(SVGNFT_ARTIFACT_JSON).unwrap();
        assert_eq!(artifact.name(), "SVGNFT");
        assert!(artifact.interface().has_function("create"));
        assert_eq!(artifact.bytecode()[..2], [0x60, 0x80]);
    }

    #[test]
    fn test_rejects_empty_bytecode() {
        let json = r#"{"contractName":"IERC721","abi":[],"bytecode":"0x"}"#;
        assert!(matches!(
            Artifact::from_json(json),
            Err(ArtifactError::EmptyBytecode(name)) if name == "IERC721"
        ));
    }

    #[test]
    fn test_rejects_unlinked_bytecode() {
        let json = r#"{"contractName":"Lib","abi":[],"bytecode":"0x73__$abc$__6080"}"#;
        assert!(matches!(
            Artifact::from_json(json),
            Err(ArtifactError::InvalidBytecode { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Artifact::from_json("{\"abi\": []}"),
            Err(ArtifactError::Json(_))
        ));
    }

    #[test]
    fn test_deploy_data_without_constructor_args() {
        let artifact = svgnft_artifact();
        assert_eq!(artifact.deploy_data(&[]).unwrap(), artifact.bytecode());
        assert_eq!(
            artifact.deploy_data(&[DynSolValue::Bool(true)]),
            Err(AbiError::Codec(alloy_dyn_abi::Error::EncodeLengthMismatch {
                expected: 0,
                actual: 1
            }))
        );
    }

    #[test]
    fn test_deploy_data_with_constructor_args() {
        let json = r#"{"contractName":"Named","bytecode":"0x6080","abi":[
            {"type":"constructor","inputs":[{"name":"n","type":"uint256"}]}]}"#;
        let artifact = Artifact::from_json(json).unwrap();
        let data = artifact
            .deploy_data(&[DynSolValue::Uint(U256::from(5), 256)])
            .unwrap();
        assert_eq!(data.len(), 2 + 32);
        assert_eq!(data[33], 5);
    }

    #[test]
    fn test_bytecode_hash_stable() {
        let a = svgnft_artifact();
        let b = svgnft_artifact();
        assert_eq!(a.bytecode_hash(), b.bytecode_hash());
        assert_ne!(a.bytecode_hash(), keccak256(b""));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SVGNFT.json");
        std::fs::write(&path, SVGNFT_ARTIFACT_JSON).unwrap();
        assert_eq!(Artifact::from_file(&path).unwrap().name(), "SVGNFT");
        assert!(matches!(
            Artifact::from_file(dir.path().join("missing.json")),
            Err(ArtifactError::Io(_))
        ));
    }
}
