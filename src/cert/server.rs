//! Server certificate operations.
//!
//! Server leaves are signed by their issuing CA and persisted together with
//! a password-protected PKCS#12 bundle carrying the certificate chain.

use crate::cert::{loader, template, CreateOutcome};
use crate::config::{Config, ServerOptions, DEFAULT_BUNDLE_PASSWORD};
use crate::crypto::{keys::generate_key_pair, pkcs12};
use crate::error::{CertmintError, Result};
use crate::hosts::{resolve_local_host, LocalHost};
use crate::storage::store::{LeafKind, PkiStore};

/// Create a server certificate signed by `ca_name`.
///
/// The issuing CA must exist. When `options.root_ca_name` is set, that CA
/// must also exist and its certificate is appended to the PKCS#12 bundle
/// chain; signing always uses the immediate issuing CA's key. The subject's
/// common name defaults to `name`. With `options.localhost` set, the
/// machine's hostname (or the configured override), `localhost`, the
/// loopback address, and every non-loopback IPv4 are added as subject
/// alternative names.
///
/// Issuance is idempotent per (name, CA, expired) combination: when the
/// complete artifact set is already present, the call reports
/// [`CreateOutcome::AlreadyExists`] and writes nothing.
pub fn create_server_cert(
    config: &Config,
    name: &str,
    ca_name: &str,
    options: &ServerOptions,
) -> Result<CreateOutcome> {
    let store = PkiStore::new(&config.base_path);

    template::resolve_validity(&options.validity)?;

    if !store.ca_exists(ca_name) {
        return Err(CertmintError::MissingAuthorityError(format!(
            "Certificate Authority {ca_name} does not exist, \
             aborting creation of new server certificate"
        )));
    }

    let expired = template::effective_expired(&options.validity)?;
    let expired_label = if expired { "expired " } else { "" };

    if store.leaf_exists(LeafKind::Server, ca_name, name, expired) {
        return Ok(CreateOutcome::AlreadyExists(format!(
            "{name} {expired_label}server certificate already exists in {ca_name}"
        )));
    }

    let mut chain = vec![store.read_ca_cert(ca_name)?];
    if let Some(root_ca_name) = options.root_ca_name.as_deref() {
        if !store.ca_exists(root_ca_name) {
            return Err(CertmintError::MissingAuthorityError(format!(
                "Root Certificate Authority {root_ca_name} does not exist, \
                 aborting creation of new server certificate"
            )));
        }
        chain.push(store.read_ca_cert(root_ca_name)?);
    }

    let localhost: Option<LocalHost> = if options.localhost {
        Some(resolve_local_host(config.localhost_dns_name.as_deref())?)
    } else {
        None
    };

    let mut options = options.clone();
    if options.subject.common_name.is_none() {
        options.subject.common_name = Some(name.to_string());
    }

    let issuer = loader::load_issuer(&store, ca_name)?;
    let key_pair = generate_key_pair()?;
    let params = template::server_params(&options, localhost.as_ref())?;
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
        LeafKind::Server,
        ca_name,
        name,
        expired,
        &cert.pem(),
        &key_pair.serialize_pem(),
        &bundle,
    )?;

    Ok(CreateOutcome::Created(format!(
        "{name} {expired_label}server certificate was created and signed by {ca_name}"
    )))
}

/// List server certificates per CA, sorted.
pub fn list_server_certs(config: &Config) -> Result<Vec<(String, Vec<String>)>> {
    PkiStore::new(&config.base_path).list_leaves(LeafKind::Server)
}

/// Remove a server certificate's directory subtree, including any expired
/// variant.
pub fn remove_server_cert(config: &Config, name: &str, ca_name: &str) -> Result<String> {
    PkiStore::new(&config.base_path).remove_leaf(LeafKind::Server, ca_name, name)?;
    Ok(format!("{name} was removed from {ca_name}"))
}
