//! Key utilities

use secp256k1::SecretKey;

/// Create a secret key from a u32 (for testing and local development)
///
/// # Examples
///
/// ```
/// use svgnft::util::secret_key_from_u32;
///
/// let key = secret_key_from_u32(42);
/// assert_eq!(key.secret_bytes()[31], 42);
/// ```
///
/// # Panics
///
/// Panics for `0`, which is not a valid secp256k1 secret key.
#[must_use]
pub fn secret_key_from_u32(secret_key: u32) -> SecretKey {
    let mut secret_key_bytes = [0u8; 32];
    secret_key_bytes[28..].copy_from_slice(&secret_key.to_be_bytes());
    SecretKey::from_slice(&secret_key_bytes).expect("secret key should be valid")
}
