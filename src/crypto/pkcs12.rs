//! PKCS#12 bundle encoding.
//!
//! Leaf issuance produces a password-protected `bundle.p12` holding the
//! leaf's private key and certificate plus the issuing chain, suitable for
//! import into browsers and keystores.

use crate::error::Result;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::PKey;
use openssl::stack::Stack;
use openssl::x509::X509;

/// Encode a password-protected PKCS#12 bundle.
///
/// The bundle contains `key_pem`/`cert_pem` as the end-entity pair and every
/// certificate in `chain_pems` (issuing CA first, then the optional root) as
/// the CA chain.
///
/// # Arguments
///
/// * `key_pem` - The leaf's private key, PKCS#8 PEM
/// * `cert_pem` - The leaf certificate, PEM
/// * `chain_pems` - CA certificates completing the chain, PEM, in order
/// * `friendly_name` - Name stored alongside the key and certificate
/// * `password` - Password protecting the bundle
pub fn encode_bundle(
    key_pem: &str,
    cert_pem: &str,
    chain_pems: &[String],
    friendly_name: &str,
    password: &str,
) -> Result<Vec<u8>> {
    let pkey = PKey::private_key_from_pem(key_pem.as_bytes())?;
    let cert = X509::from_pem(cert_pem.as_bytes())?;

    let mut chain = Stack::new()?;
    for pem in chain_pems {
        chain.push(X509::from_pem(pem.as_bytes())?)?;
    }

    let mut builder = Pkcs12::builder();
    builder.name(friendly_name);
    builder.pkey(&pkey);
    builder.cert(&cert);
    builder.ca(chain);

    let bundle = builder.build2(password)?;
    Ok(bundle.to_der()?)
}

/// Count the certificates stored in an encoded bundle (end-entity plus
/// chain). Fails if the password does not match.
pub fn bundle_certificate_count(der: &[u8], password: &str) -> Result<usize> {
    let parsed = Pkcs12::from_der(der)?.parse2(password)?;

    let mut count = usize::from(parsed.cert.is_some());
    if let Some(chain) = &parsed.ca {
        count += chain.len();
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::template;
    use crate::config::CaOptions;
    use crate::crypto::keys::generate_key_pair;

    fn self_signed_pem(cn: &str) -> (String, String) {
        let key_pair = generate_key_pair().unwrap();
        let mut options = CaOptions::default();
        options.subject.common_name = Some(cn.to_string());
        let params = template::ca_params(&options, false).unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        (cert.pem(), key_pair.serialize_pem())
    }

    #[test]
    fn test_encode_bundle_roundtrip() {
        let (ca_pem, _) = self_signed_pem("Bundle CA");
        let (cert_pem, key_pem) = self_signed_pem("Bundle Leaf");

        let der = encode_bundle(&key_pem, &cert_pem, &[ca_pem], "leaf", "secret").unwrap();
        assert!(!der.is_empty());

        let count = bundle_certificate_count(&der, "secret").unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_bundle_wrong_password() {
        let (cert_pem, key_pem) = self_signed_pem("Bundle Leaf");

        let der = encode_bundle(&key_pem, &cert_pem, &[], "leaf", "secret").unwrap();
        assert!(bundle_certificate_count(&der, "wrong").is_err());
    }
}
