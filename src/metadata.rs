//! Inline token metadata as produced by the SVG NFT contract
//!
//! The contract stores each token URI as
//! `data:application/json;base64,<json>` where the JSON `image` field is
//! itself `data:image/svg+xml;base64,<svg>`.

use crate::error::MetadataError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const JSON_URI_PREFIX: &str = "data:application/json;base64,";
pub const SVG_URI_PREFIX: &str = "data:image/svg+xml;base64,";

pub const TOKEN_NAME: &str = "SVG NFT";
pub const TOKEN_DESCRIPTION: &str = "An NFT based on SVG!";

/// Wrap raw SVG markup as an image data URI
#[must_use]
pub fn svg_to_image_uri(svg: &str) -> String {
    format!("{SVG_URI_PREFIX}{}", STANDARD.encode(svg.as_bytes()))
}

/// Wrap an image URI into the token's JSON metadata data URI
#[must_use]
pub fn format_token_uri(image_uri: &str) -> String {
    let json = format!(
        concat!(
            r#"{{"name": "{name}", "description": "{description}", "#,
            r#""attributes":"", "image":"{image_uri}"}}"#,
        ),
        name = TOKEN_NAME,
        description = TOKEN_DESCRIPTION,
        image_uri = image_uri,
    );
    format!("{JSON_URI_PREFIX}{}", STANDARD.encode(json.as_bytes()))
}

/// A token URI as returned by `tokenURI(index)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenUri(String);

impl TokenUri {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// Decode the inline JSON metadata
    ///
    /// # Examples
    ///
    /// ```
    /// use svgnft::metadata::{format_token_uri, svg_to_image_uri, TokenUri};
    ///
    /// let uri = TokenUri::new(format_token_uri(&svg_to_image_uri("<svg></svg>")));
    /// let metadata = uri.metadata().unwrap();
    /// assert_eq!(metadata.image_svg().unwrap(), "<svg></svg>");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is not an inline base64 JSON data URI.
    pub fn metadata(&self) -> Result<TokenMetadata, MetadataError> {
        let json = decode_data_uri(&self.0, JSON_URI_PREFIX)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl fmt::Display for TokenUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ERC-721 metadata JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attributes: serde_json::Value,
    pub image: String,
}

impl TokenMetadata {
    /// The SVG markup embedded in the `image` field
    ///
    /// # Errors
    ///
    /// Returns an error if the image is not an inline base64 SVG.
    pub fn image_svg(&self) -> Result<String, MetadataError> {
        decode_data_uri(&self.image, SVG_URI_PREFIX)
    }
}

fn decode_data_uri(uri: &str, prefix: &str) -> Result<String, MetadataError> {
    if !uri.starts_with("data:") {
        return Err(MetadataError::NotInline(uri.to_string()));
    }
    let payload = uri.strip_prefix(prefix).ok_or_else(|| {
        let media = uri.split(',').next().unwrap_or(uri);
        MetadataError::MediaType(media.to_string())
    })?;
    Ok(String::from_utf8(STANDARD.decode(payload)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::STAR_SVG;

    #[test]
    fn test_image_uri_shape() {
        let uri = svg_to_image_uri("<svg/>");
        assert_eq!(uri, "data:image/svg+xml;base64,PHN2Zy8+");
    }

    #[test]
    fn test_token_uri_recovers_svg() {
        let uri = TokenUri::new(format_token_uri(&svg_to_image_uri(STAR_SVG)));
        assert!(uri.is_inline());
        let metadata = uri.metadata().unwrap();
        assert_eq!(metadata.name, TOKEN_NAME);
        assert_eq!(metadata.description, TOKEN_DESCRIPTION);
        assert_eq!(metadata.image_svg().unwrap(), STAR_SVG);
    }

    #[test]
    fn test_different_svg_different_uri() {
        let a = format_token_uri(&svg_to_image_uri("<svg>a</svg>"));
        let b = format_token_uri(&svg_to_image_uri("<svg>b</svg>"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_reference_uri_not_inline() {
        let cid = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";
        let uri = TokenUri::new(format!("ipfs://{cid}"));
        assert!(!uri.is_inline());
        assert!(matches!(uri.metadata(), Err(MetadataError::NotInline(_))));
    }

    #[test]
    fn test_wrong_media_type() {
        let uri = TokenUri::new(svg_to_image_uri("<svg/>"));
        assert!(matches!(
            uri.metadata(),
            Err(MetadataError::MediaType(m)) if m == "data:image/svg+xml;base64"
        ));
    }

    #[test]
    fn test_corrupt_payload() {
        let uri = TokenUri::new(format!("{JSON_URI_PREFIX}!!!not-base64"));
        assert!(matches!(uri.metadata(), Err(MetadataError::Base64(_))));
    }
}
