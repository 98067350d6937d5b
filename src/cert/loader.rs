//! Certificate and issuer loading from PEM files.
//!
//! Stored certificates are read back either as raw DER (for parsing and
//! bundling) or as an [`rcgen::Issuer`] ready to sign child certificates.

use crate::crypto::keys::key_pair_from_pem;
use crate::error::{CertmintError, Result};
use crate::storage::store::PkiStore;
use rcgen::{Issuer, KeyPair};
use rustls_pemfile::Item;
use std::io::Cursor;

/// Load a single DER-encoded certificate from a PEM string.
pub fn load_certificate_from_pem(pem_str: &str) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(pem_str.as_bytes());

    match rustls_pemfile::read_one(&mut cursor)
        .map_err(|e| CertmintError::PemError(format!("Failed to read PEM: {e}")))?
    {
        Some(Item::X509Certificate(cert_der)) => Ok(cert_der.to_vec()),
        Some(_) => Err(CertmintError::PemError(
            "PEM file does not contain a certificate".to_string(),
        )),
        None => Err(CertmintError::PemError("Empty PEM file".to_string())),
    }
}

/// Load every DER-encoded certificate from a PEM string, skipping
/// non-certificate items.
pub fn load_certificates_from_pem(pem_str: &str) -> Result<Vec<Vec<u8>>> {
    let mut cursor = Cursor::new(pem_str.as_bytes());
    let mut certificates = Vec::new();

    loop {
        match rustls_pemfile::read_one(&mut cursor)
            .map_err(|e| CertmintError::PemError(format!("Failed to read PEM: {e}")))?
        {
            Some(Item::X509Certificate(cert_der)) => certificates.push(cert_der.to_vec()),
            Some(_) => continue,
            None => break,
        }
    }

    if certificates.is_empty() {
        return Err(CertmintError::PemError(
            "No certificates found in PEM file".to_string(),
        ));
    }

    Ok(certificates)
}

/// Load a CA's certificate and private key from the store as a signing
/// issuer. The issuer's distinguished name and key identifier flow into
/// every certificate it signs.
pub fn load_issuer(store: &PkiStore, ca_name: &str) -> Result<Issuer<'static, KeyPair>> {
    let cert_pem = store.read_ca_cert(ca_name)?;
    let key_pem = store.read_ca_key(ca_name)?;

    let key_pair = key_pair_from_pem(&key_pem)?;
    Ok(Issuer::from_ca_cert_pem(&cert_pem, key_pair)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::template;
    use crate::config::CaOptions;
    use crate::crypto::keys::generate_key_pair;

    fn self_signed_pem(cn: &str) -> String {
        let key_pair = generate_key_pair().unwrap();
        let mut options = CaOptions::default();
        options.subject.common_name = Some(cn.to_string());
        let params = template::ca_params(&options, false).unwrap();
        params.self_signed(&key_pair).unwrap().pem()
    }

    #[test]
    fn test_load_certificate_from_pem() {
        let pem = self_signed_pem("Loader CA");
        let der = load_certificate_from_pem(&pem).unwrap();
        assert!(!der.is_empty());
    }

    #[test]
    fn test_load_certificate_from_invalid_pem() {
        assert!(load_certificate_from_pem("not a valid pem").is_err());
    }

    #[test]
    fn test_load_certificates_from_pem_multiple() {
        let combined = format!("{}\n{}", self_signed_pem("A"), self_signed_pem("B"));
        let certs = load_certificates_from_pem(&combined).unwrap();
        assert_eq!(certs.len(), 2);
    }

    #[test]
    fn test_load_certificates_from_empty_pem() {
        assert!(load_certificates_from_pem("").is_err());
    }
}
