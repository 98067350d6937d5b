//! JSON projection of stored certificates.
//!
//! A simplified, inspection-only view of a certificate's fields. The
//! projection is cosmetic; nothing in the issuance flow depends on it.

use crate::cert::loader::load_certificate_from_pem;
use crate::error::{CertmintError, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use ::time::format_description::well_known::Rfc3339;
use x509_parser::oid_registry::{self, Oid};
use x509_parser::prelude::*;

/// Short name for a distinguished-name attribute type, falling back to the
/// dotted OID for unrecognized attributes.
pub(crate) fn attribute_short_name(oid: &Oid) -> String {
    if *oid == oid_registry::OID_X509_COMMON_NAME {
        "CN".to_string()
    } else if *oid == oid_registry::OID_X509_COUNTRY_NAME {
        "C".to_string()
    } else if *oid == oid_registry::OID_X509_ORGANIZATION_NAME {
        "O".to_string()
    } else if *oid == oid_registry::OID_X509_ORGANIZATIONAL_UNIT {
        "OU".to_string()
    } else if *oid == oid_registry::OID_X509_LOCALITY_NAME {
        "L".to_string()
    } else if *oid == oid_registry::OID_X509_STATE_OR_PROVINCE_NAME {
        "ST".to_string()
    } else {
        oid.to_id_string()
    }
}

/// Render a distinguished name as `C=US,O=Acme,CN=example`.
pub fn dn_to_string(name: &X509Name) -> String {
    name.iter_attributes()
        .map(|attr| {
            format!(
                "{}={}",
                attribute_short_name(attr.attr_type()),
                attr.as_str().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn extension_name(extension: &X509Extension) -> String {
    match extension.parsed_extension() {
        ParsedExtension::BasicConstraints(_) => "basicConstraints".to_string(),
        ParsedExtension::KeyUsage(_) => "keyUsage".to_string(),
        ParsedExtension::ExtendedKeyUsage(_) => "extKeyUsage".to_string(),
        ParsedExtension::SubjectKeyIdentifier(_) => "subjectKeyIdentifier".to_string(),
        ParsedExtension::AuthorityKeyIdentifier(_) => "authorityKeyIdentifier".to_string(),
        ParsedExtension::SubjectAlternativeName(_) => "subjectAltName".to_string(),
        _ => extension.oid.to_id_string(),
    }
}

fn format_time(time: &ASN1Time) -> String {
    time.to_datetime()
        .format(&Rfc3339)
        .unwrap_or_else(|_| time.to_string())
}

/// Parse a stored certificate and project its fields into a JSON object.
///
/// `properties`, when supplied, filters the projection down to the named
/// top-level keys.
pub fn cert_to_json(path: &Path, properties: Option<&[String]>) -> Result<Value> {
    let pem = fs::read_to_string(path)?;
    let der = load_certificate_from_pem(&pem)?;
    let (_, cert) = parse_x509_certificate(&der).map_err(|e| {
        CertmintError::ParseError(format!(
            "Failed to parse certificate {}: {e}",
            path.display()
        ))
    })?;

    let extensions: Vec<Value> = cert
        .extensions()
        .iter()
        .map(|extension| {
            json!({
                "name": extension_name(extension),
                "critical": extension.critical,
            })
        })
        .collect();

    let mut projection = json!({
        "version": cert.version().0,
        "serialNumber": format!("{:X}", cert.tbs_certificate.serial),
        "subject": dn_to_string(cert.subject()),
        "issuer": dn_to_string(cert.issuer()),
        "validity": {
            "notBefore": format_time(&cert.validity().not_before),
            "notAfter": format_time(&cert.validity().not_after),
        },
        "signature algorithm": cert.signature_algorithm.algorithm.to_id_string(),
        "extensions": extensions,
    });

    if let (Some(properties), Some(object)) = (properties, projection.as_object_mut()) {
        object.retain(|key, _| properties.iter().any(|property| property == key));
    }

    Ok(projection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::ca::create_ca_cert;
    use crate::config::{CaOptions, Config};
    use crate::storage::store::PkiStore;
    use tempfile::TempDir;

    fn stored_ca_path() -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::new(temp_dir.path());

        let mut options = CaOptions::default();
        options.subject.common_name = Some("Describe CA".to_string());
        options.subject.organizations = vec!["Acme".to_string()];
        create_ca_cert(&config, "Describe CA", &options).unwrap();

        let path = PkiStore::new(&config.base_path).ca_cert_path("Describe CA");
        (temp_dir, path)
    }

    #[test]
    fn test_cert_to_json_fields() {
        let (_tmp, path) = stored_ca_path();
        let projection = cert_to_json(&path, None).unwrap();

        assert_eq!(projection["subject"], "C=US,O=Acme,CN=Describe CA");
        assert_eq!(projection["issuer"], projection["subject"]);
        assert!(projection["serialNumber"].as_str().is_some());
        assert!(projection["extensions"]
            .as_array()
            .unwrap()
            .iter()
            .any(|ext| ext["name"] == "basicConstraints" && ext["critical"] == true));
    }

    #[test]
    fn test_cert_to_json_property_filter() {
        let (_tmp, path) = stored_ca_path();
        let filter = vec!["subject".to_string(), "issuer".to_string()];
        let projection = cert_to_json(&path, Some(&filter)).unwrap();

        let object = projection.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(object.contains_key("subject"));
        assert!(object.contains_key("issuer"));
    }

    #[test]
    fn test_cert_to_json_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = cert_to_json(&temp_dir.path().join("missing.pem"), None);
        assert!(result.is_err());
    }
}
