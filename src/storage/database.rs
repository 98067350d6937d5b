//! OpenSSL `ca` database generation.
//!
//! Regenerates a CA's `index.txt` from its issued certificates so external
//! tooling can derive revocation lists. Each row is tab-separated:
//!
//! ```text
//! <status>\t<expiry>\t[<revocation>]\t<serial>\t<filename>\t<subject>
//! ```
//!
//! Status is `V` (valid), `E` (expired), or `R` (revoked). A certificate is
//! revoked when any supplied pattern is a case-insensitive substring of its
//! rendered subject; otherwise the status is purely time-based.

use crate::cert::describe::attribute_short_name;
use crate::cert::loader::load_certificate_from_pem;
use crate::error::{CertmintError, Result};
use crate::storage::store::{LeafKind, PkiStore};
use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use x509_parser::prelude::*;

/// Companion attributes file required by `openssl ca` for CRL generation.
pub const DATABASE_ATTR_CONTENT: &str = "unique_subject = no";

// The database's file-name column; issued certificates are not tracked by
// file name, so every row carries this marker.
const FILENAME_PLACEHOLDER: &str = "unknown";

/// Regenerate the revocation database for `ca_name` from every issued
/// server and user certificate, live and expired variants alike. Writes
/// `index.txt` and `index.txt.attr` into the CA's artifact directory.
pub fn create_cert_database(config: &crate::config::Config, ca_name: &str, revoked_cns: &[String]) -> Result<()> {
    let store = PkiStore::new(&config.base_path);

    if !store.ca_exists(ca_name) {
        return Err(CertmintError::MissingAuthorityError(format!(
            "Certificate Authority {ca_name} does not exist, \
             aborting creation of certificate database"
        )));
    }

    let mut files = store.leaf_cert_files(LeafKind::User, ca_name)?;
    files.extend(store.leaf_cert_files(LeafKind::Server, ca_name)?);

    let entries = database_entries(&files, revoked_cns, Utc::now())?;

    let index_path = store.index_path(ca_name);
    fs::write(&index_path, entries.join("\n"))?;
    fs::write(
        index_path.with_file_name("index.txt.attr"),
        DATABASE_ATTR_CONTENT,
    )?;

    Ok(())
}

/// Build the database rows for a set of certificate files, ordered as
/// given.
pub fn database_entries(
    files: &[PathBuf],
    revoked_cns: &[String],
    now: DateTime<Utc>,
) -> Result<Vec<String>> {
    files
        .iter()
        .map(|path| database_entry(path, revoked_cns, now))
        .collect()
}

fn database_entry(path: &Path, revoked_cns: &[String], now: DateTime<Utc>) -> Result<String> {
    let pem = fs::read_to_string(path)?;
    let der = load_certificate_from_pem(&pem)?;
    let (_, cert) = parse_x509_certificate(&der).map_err(|e| {
        CertmintError::ParseError(format!(
            "Failed to parse certificate {}: {e}",
            path.display()
        ))
    })?;

    let subject = rendered_subject(cert.subject());
    let serial = format!("{:X}", cert.tbs_certificate.serial);
    let expires = format_db_timestamp(cert.validity().not_after.timestamp())?;

    let revoked = revoked_cns
        .iter()
        .any(|cn| subject.to_uppercase().contains(&cn.to_uppercase()));

    let row = if revoked {
        let revoked_at = format_db_timestamp(now.timestamp())?;
        format!("R\t{expires}\t{revoked_at}\t{serial}\t{FILENAME_PLACEHOLDER}\t{subject}")
    } else {
        let status = if cert.validity().not_after.timestamp() < now.timestamp() {
            'E'
        } else {
            'V'
        };
        format!("{status}\t{expires}\t\t{serial}\t{FILENAME_PLACEHOLDER}\t{subject}")
    };

    Ok(row)
}

/// Render a subject with its attributes reversed, issuer-first, as the
/// OpenSSL database expects: `/CN=example/O=Acme/C=US`.
fn rendered_subject(name: &X509Name) -> String {
    let mut parts: Vec<String> = name
        .iter_attributes()
        .map(|attr| {
            format!(
                "{}={}",
                attribute_short_name(attr.attr_type()),
                attr.as_str().unwrap_or_default()
            )
        })
        .collect();
    parts.reverse();
    format!("/{}", parts.join("/"))
}

/// `yyMMddHHmmss` with a trailing `Z`, the timestamp format of OpenSSL
/// database rows.
fn format_db_timestamp(timestamp: i64) -> Result<String> {
    let datetime = Utc
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| CertmintError::ParseError(format!("Timestamp out of range: {timestamp}")))?;
    Ok(datetime.format("%y%m%d%H%M%SZ").to_string())
}
