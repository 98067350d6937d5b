//! Key-pair generation and loading.

use crate::error::Result;
use rcgen::KeyPair;

/// Generate a fresh ECDSA P-384 key pair.
///
/// Certificates built from this key pair are signed with ECDSA over P-384
/// using SHA-384.
///
/// # Example
///
/// ```
/// use certmint::crypto::keys::generate_key_pair;
///
/// let key_pair = generate_key_pair().unwrap();
/// assert!(key_pair.serialize_pem().contains("BEGIN PRIVATE KEY"));
/// ```
pub fn generate_key_pair() -> Result<KeyPair> {
    Ok(KeyPair::generate_for(&rcgen::PKCS_ECDSA_P384_SHA384)?)
}

/// Load a key pair from a PKCS#8 PEM string, as written by
/// [`rcgen::KeyPair::serialize_pem`].
pub fn key_pair_from_pem(pem: &str) -> Result<KeyPair> {
    Ok(KeyPair::from_pem(pem)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_pair() {
        let key_pair = generate_key_pair().unwrap();
        let pem = key_pair.serialize_pem();

        assert!(pem.contains("BEGIN PRIVATE KEY"));
        assert!(pem.contains("END PRIVATE KEY"));
    }

    #[test]
    fn test_key_pair_pem_roundtrip() {
        let key_pair = generate_key_pair().unwrap();
        let pem = key_pair.serialize_pem();

        let loaded = key_pair_from_pem(&pem).unwrap();
        assert_eq!(pem, loaded.serialize_pem());
    }

    #[test]
    fn test_key_pairs_are_unique() {
        let a = generate_key_pair().unwrap();
        let b = generate_key_pair().unwrap();
        assert_ne!(a.serialize_pem(), b.serialize_pem());
    }
}
