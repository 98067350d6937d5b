//! User certificate operations.
//!
//! User leaves mirror server leaves with a narrower key-usage set and
//! RFC 822 (email) subject alternative names.

use crate::cert::{loader, template, CreateOutcome};
use crate::config::{Config, UserOptions, DEFAULT_BUNDLE_PASSWORD};
use crate::crypto::{keys::generate_key_pair, pkcs12};
use crate::error::{CertmintError, Result};
use crate::storage::store::{LeafKind, PkiStore};

/// Create a user certificate signed by `ca_name`.
///
/// The issuing CA must exist; an optional `root_ca_name` must exist when
/// supplied and only extends the PKCS#12 bundle chain. The subject's common
/// name defaults to `name`. Issuance is idempotent per (name, CA, expired)
/// combination.
pub fn create_user_cert(
    config: &Config,
    name: &str,
    ca_name: &str,
    options: &UserOptions,
) -> Result<CreateOutcome> {
    let store = PkiStore::new(&config.base_path);

    template::resolve_validity(&options.validity)?;

    if !store.ca_exists(ca_name) {
        return Err(CertmintError::MissingAuthorityError(format!(
            "Certificate Authority {ca_name} does not exist, \
             aborting creation of new user certificate"
        )));
    }

    let expired = template::effective_expired(&options.validity)?;
    let expired_label = if expired { "expired " } else { "" };

    if store.leaf_exists(LeafKind::User, ca_name, name, expired) {
        return Ok(CreateOutcome::AlreadyExists(format!(
            "{name} {expired_label}user certificate already exists in {ca_name}"
        )));
    }

    let mut chain = vec![store.read_ca_cert(ca_name)?];
    if let Some(root_ca_name) = options.root_ca_name.as_deref() {
        if !store.ca_exists(root_ca_name) {
            return Err(CertmintError::MissingAuthorityError(format!(
                "Root Certificate Authority {root_ca_name} does not exist, \
                 aborting creation of new user certificate"
            )));
        }
        chain.push(store.read_ca_cert(root_ca_name)?);
    }

    let mut options = options.clone();
    if options.subject.common_name.is_none() {
        options.subject.common_name = Some(name.to_string());
    }

    let issuer = loader::load_issuer(&store, ca_name)?;
    let key_pair = generate_key_pair()?;
    let params = template::user_params(&options)?;
    let cert = params.signed_by(&key_pair, &issuer)?;

    let password = options
        .password
        .as_deref()
        .unwrap_or(DEFAULT_BUNDLE_PASSWORD);
    let bundle = pkcs12::encode_bundle(
        &key_pair.serialize_pem(),
        &cert.pem(),
        &chain,
        name,
        password,
    )?;

    store.write_leaf(
        LeafKind::User,
        ca_name,
        name,
        expired,
        &cert.pem(),
        &key_pair.serialize_pem(),
        &bundle,
    )?;

    Ok(CreateOutcome::Created(format!(
        "{name} {expired_label}user certificate was created and signed by {ca_name}"
    )))
}

/// List user certificates per CA, sorted.
pub fn list_user_certs(config: &Config) -> Result<Vec<(String, Vec<String>)>> {
    PkiStore::new(&config.base_path).list_leaves(LeafKind::User)
}

/// Remove a user certificate's directory subtree, including any expired
/// variant.
pub fn remove_user_cert(config: &Config, name: &str, ca_name: &str) -> Result<String> {
    PkiStore::new(&config.base_path).remove_leaf(LeafKind::User, ca_name, name)?;
    Ok(format!("{name} was removed from {ca_name}"))
}
