//! Root CA certificate operations.
//!
//! A root CA is self-signed: its issuer equals its subject and it signs
//! with its own private key.

use crate::cert::{template, CreateOutcome};
use crate::config::{CaOptions, Config};
use crate::crypto::keys::generate_key_pair;
use crate::error::{CertmintError, Result};
use crate::storage::store::PkiStore;

/// Create a self-signed root certificate authority.
///
/// Creation is idempotent: if the CA's normalized directory already exists
/// the call reports [`CreateOutcome::AlreadyExists`] and writes nothing.
/// An inverted validity window is rejected before any key generation or
/// filesystem write.
///
/// # Example
///
/// ```rust,no_run
/// use certmint::cert::ca::create_ca_cert;
/// use certmint::config::{CaOptions, Config};
///
/// # fn example() -> certmint::error::Result<()> {
/// let config = Config::new("pki");
/// let outcome = create_ca_cert(&config, "Acme Root CA", &CaOptions::default())?;
/// assert!(outcome.created());
/// # Ok(())
/// # }
/// ```
pub fn create_ca_cert(config: &Config, name: &str, options: &CaOptions) -> Result<CreateOutcome> {
    let store = PkiStore::new(&config.base_path);

    template::resolve_validity(&options.validity)?;

    if store.ca_exists(name) {
        return Ok(CreateOutcome::AlreadyExists(format!(
            "Certificate authority {name} already exists"
        )));
    }

    let key_pair = generate_key_pair()?;
    let params = template::ca_params(options, false)?;
    let cert = params.self_signed(&key_pair)?;

    store.write_ca(name, &cert.pem(), &key_pair.serialize_pem())?;

    Ok(CreateOutcome::Created(format!(
        "Certificate authority {name} was created"
    )))
}

/// List the certificate authorities in the store, sorted by name.
pub fn list_ca_certs(config: &Config) -> Result<Vec<String>> {
    PkiStore::new(&config.base_path).list_cas()
}

/// Remove a certificate authority and every server and user certificate
/// issued under it.
///
/// Intermediate CAs that reference the removed CA as their parent are not
/// touched; they remain in the store as orphans.
pub fn remove_ca_cert(config: &Config, name: &str) -> Result<String> {
    let store = PkiStore::new(&config.base_path);

    if !store.ca_entry_dir(name).is_dir() {
        return Err(CertmintError::NotFoundError(format!(
            "Certificate Authority {name} does not exist"
        )));
    }

    store.remove_ca(name)?;
    Ok(format!(
        "Certificate Authority {name} and all associated certificates were removed"
    ))
}
