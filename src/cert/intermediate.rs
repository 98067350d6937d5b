//! Intermediate CA certificate operations.
//!
//! An intermediate CA is signed by its parent CA's private key and records
//! the parent's normalized name in `parent.txt` for later chain assembly.

use crate::cert::{loader, template, CreateOutcome};
use crate::config::{CaOptions, Config};
use crate::crypto::keys::generate_key_pair;
use crate::error::{CertmintError, Result};
use crate::storage::store::PkiStore;

/// Create an intermediate certificate authority signed by `root_ca_name`.
///
/// The parent CA must already exist; its subject becomes the intermediate's
/// issuer and its subject key identifier becomes the intermediate's
/// authority key identifier. Creation is an idempotent skip when the
/// intermediate's directory already exists.
///
/// # Example
///
/// ```rust,no_run
/// use certmint::cert::ca::create_ca_cert;
/// use certmint::cert::intermediate::create_intermediate_ca_cert;
/// use certmint::config::{CaOptions, Config};
///
/// # fn example() -> certmint::error::Result<()> {
/// let config = Config::new("pki");
/// create_ca_cert(&config, "Acme Root", &CaOptions::default())?;
/// let outcome =
///     create_intermediate_ca_cert(&config, "Acme Issuing", "Acme Root", &CaOptions::default())?;
/// assert!(outcome.created());
/// # Ok(())
/// # }
/// ```
pub fn create_intermediate_ca_cert(
    config: &Config,
    name: &str,
    root_ca_name: &str,
    options: &CaOptions,
) -> Result<CreateOutcome> {
    let store = PkiStore::new(&config.base_path);

    template::resolve_validity(&options.validity)?;

    if !store.ca_exists(root_ca_name) {
        return Err(CertmintError::MissingAuthorityError(format!(
            "Certificate Authority {root_ca_name} does not exist, \
             aborting creation of new intermediate CA certificate"
        )));
    }

    if store.ca_exists(name) {
        return Ok(CreateOutcome::AlreadyExists(format!(
            "Certificate authority {name} already exists"
        )));
    }

    let issuer = loader::load_issuer(&store, root_ca_name)?;
    let key_pair = generate_key_pair()?;
    let params = template::ca_params(options, true)?;
    let cert = params.signed_by(&key_pair, &issuer)?;

    store.write_ca(name, &cert.pem(), &key_pair.serialize_pem())?;
    store.write_parent_ref(name, root_ca_name)?;

    Ok(CreateOutcome::Created(format!(
        "Certificate authority {name} was created"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::ca::create_ca_cert;
    use crate::cert::loader::load_certificate_from_pem;
    use tempfile::TempDir;
    use x509_parser::prelude::*;

    fn config() -> (TempDir, Config) {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::new(temp_dir.path());
        (temp_dir, config)
    }

    fn parse_stored_ca(store: &PkiStore, name: &str) -> Vec<u8> {
        load_certificate_from_pem(&store.read_ca_cert(name).unwrap()).unwrap()
    }

    #[test]
    fn test_create_intermediate_requires_parent() {
        let (_tmp, config) = config();
        let result =
            create_intermediate_ca_cert(&config, "Mid", "No Such Root", &CaOptions::default());

        assert!(matches!(result, Err(CertmintError::MissingAuthorityError(_))));
        let store = PkiStore::new(&config.base_path);
        assert!(!store.ca_entry_dir("Mid").exists());
    }

    #[test]
    fn test_create_intermediate_records_parent() {
        let (_tmp, config) = config();
        create_ca_cert(&config, "Root CA", &CaOptions::default()).unwrap();
        let outcome =
            create_intermediate_ca_cert(&config, "Mid CA", "Root CA", &CaOptions::default())
                .unwrap();

        assert!(outcome.created());
        let store = PkiStore::new(&config.base_path);
        assert!(store.ca_exists("Mid CA"));
        assert_eq!(
            store.read_parent_ref("Mid CA").unwrap().as_deref(),
            Some("root-ca")
        );
    }

    #[test]
    fn test_intermediate_issuer_is_parent_subject() {
        let (_tmp, config) = config();
        let mut root_options = CaOptions::default();
        root_options.subject.common_name = Some("Root CA".to_string());
        root_options.subject.organizations = vec!["Acme".to_string()];
        create_ca_cert(&config, "Root CA", &root_options).unwrap();

        let mut mid_options = CaOptions::default();
        mid_options.subject.common_name = Some("Mid CA".to_string());
        create_intermediate_ca_cert(&config, "Mid CA", "Root CA", &mid_options).unwrap();

        let store = PkiStore::new(&config.base_path);
        let root_der = parse_stored_ca(&store, "Root CA");
        let mid_der = parse_stored_ca(&store, "Mid CA");
        let (_, root) = parse_x509_certificate(&root_der).unwrap();
        let (_, mid) = parse_x509_certificate(&mid_der).unwrap();

        assert_eq!(mid.issuer(), root.subject());
    }

    #[test]
    fn test_create_intermediate_idempotent() {
        let (_tmp, config) = config();
        create_ca_cert(&config, "Root CA", &CaOptions::default()).unwrap();
        create_intermediate_ca_cert(&config, "Mid CA", "Root CA", &CaOptions::default()).unwrap();

        let store = PkiStore::new(&config.base_path);
        let first = store.read_ca_cert("Mid CA").unwrap();

        let second =
            create_intermediate_ca_cert(&config, "Mid CA", "Root CA", &CaOptions::default())
                .unwrap();
        assert!(!second.created());
        assert_eq!(store.read_ca_cert("Mid CA").unwrap(), first);
    }

    #[test]
    fn test_create_intermediate_inverted_validity() {
        let (_tmp, config) = config();
        create_ca_cert(&config, "Root CA", &CaOptions::default()).unwrap();

        let mut options = CaOptions::default();
        options.validity.valid_from = Some("2051-01-01T00:00:00".to_string());
        options.validity.valid_to = Some("2050-01-01T00:00:00".to_string());

        let result = create_intermediate_ca_cert(&config, "Mid CA", "Root CA", &options);
        assert!(matches!(result, Err(CertmintError::ValidityRangeError { .. })));

        let store = PkiStore::new(&config.base_path);
        assert!(!store.ca_entry_dir("Mid CA").exists());
    }
}
