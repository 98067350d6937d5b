//! Filesystem-backed PKI store.
//!
//! The store maps (role, normalized name, owning CA) to a deterministic
//! directory layout and owns every persisted artifact:
//!
//! ```text
//! <base>/<ca>/ca/{crt.pem,key.pem,serial.txt}
//! <base>/<ca>/parent.txt                          (intermediates only)
//! <base>/<ca>/servers/<name>[/expired]/{crt.pem,key.pem,bundle.p12}
//! <base>/<ca>/users/<name>[/expired]/{crt.pem,key.pem,bundle.p12}
//! <base>/<ca>/ca/{index.txt,index.txt.attr}       (revocation database)
//! ```
//!
//! Artifact sets are written to a staging directory and renamed into place,
//! so an interrupted run never leaves a directory that passes the existence
//! checks with files missing.

use crate::error::{CertmintError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Certificate file name inside an entity directory.
pub const CERT_FILE: &str = "crt.pem";
/// Private-key file name inside an entity directory.
pub const KEY_FILE: &str = "key.pem";
/// PKCS#12 bundle file name inside a leaf directory.
pub const BUNDLE_FILE: &str = "bundle.p12";
/// Serial counter file name inside a CA directory.
pub const SERIAL_FILE: &str = "serial.txt";
/// Parent back-reference file name inside an intermediate CA's directory.
pub const PARENT_FILE: &str = "parent.txt";
/// Sub-directory holding the expired variant of a leaf.
pub const EXPIRED_DIR: &str = "expired";

// Written once at CA creation; issuance numbers certificates from
// timestamps instead of reading this back.
const SERIAL_PLACEHOLDER: &str = "01";

/// The two leaf certificate roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// Server (TLS endpoint) certificates, stored under `servers/`.
    Server,
    /// User (client identity) certificates, stored under `users/`.
    User,
}

impl LeafKind {
    /// Directory name grouping this kind of leaf under a CA.
    pub fn dir_name(self) -> &'static str {
        match self {
            LeafKind::Server => "servers",
            LeafKind::User => "users",
        }
    }

    /// Singular label used in messages.
    pub fn label(self) -> &'static str {
        match self {
            LeafKind::Server => "server",
            LeafKind::User => "user",
        }
    }
}

/// Convert a display name to its normalized store key: lower-cased, with
/// every whitespace run collapsed to a single hyphen.
///
/// # Example
///
/// ```
/// use certmint::storage::store::normalize_name;
///
/// assert_eq!(normalize_name("Acme Root  CA"), "acme-root-ca");
/// ```
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                normalized.push('-');
                in_whitespace = true;
            }
        } else {
            normalized.extend(ch.to_lowercase());
            in_whitespace = false;
        }
    }

    normalized
}

/// A serializable view of every entity in the store.
#[derive(Debug, Clone, Serialize)]
pub struct Inventory {
    /// One entry per certificate authority.
    pub ca: Vec<CaInventory>,
}

/// A CA with the names of the leaves issued under it.
#[derive(Debug, Clone, Serialize)]
pub struct CaInventory {
    /// Normalized CA name.
    pub name: String,
    /// Normalized server certificate names.
    pub servers: Vec<String>,
    /// Normalized user certificate names.
    pub users: Vec<String>,
}

/// Filesystem-backed store for all PKI artifacts.
#[derive(Debug, Clone)]
pub struct PkiStore {
    base: PathBuf,
}

impl PkiStore {
    /// Open a store rooted at the given base path. The directory is created
    /// lazily on first write.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The store's base path.
    pub fn base_path(&self) -> &Path {
        &self.base
    }

    /// Top-level directory of a CA: `<base>/<normalized name>`.
    pub fn ca_entry_dir(&self, ca_name: &str) -> PathBuf {
        self.base.join(normalize_name(ca_name))
    }

    /// CA artifact directory: `<base>/<ca>/ca`.
    pub fn ca_dir(&self, ca_name: &str) -> PathBuf {
        self.ca_entry_dir(ca_name).join("ca")
    }

    /// Path of a CA's certificate.
    pub fn ca_cert_path(&self, ca_name: &str) -> PathBuf {
        self.ca_dir(ca_name).join(CERT_FILE)
    }

    /// Path of a CA's private key.
    pub fn ca_key_path(&self, ca_name: &str) -> PathBuf {
        self.ca_dir(ca_name).join(KEY_FILE)
    }

    /// Path of an intermediate CA's parent back-reference.
    pub fn parent_path(&self, ca_name: &str) -> PathBuf {
        self.ca_entry_dir(ca_name).join(PARENT_FILE)
    }

    /// Path of a CA's revocation database.
    pub fn index_path(&self, ca_name: &str) -> PathBuf {
        self.ca_dir(ca_name).join("index.txt")
    }

    /// Directory of a leaf's artifact set, honoring the expired variant.
    pub fn leaf_dir(&self, kind: LeafKind, ca_name: &str, name: &str, expired: bool) -> PathBuf {
        let mut dir = self
            .ca_entry_dir(ca_name)
            .join(kind.dir_name())
            .join(normalize_name(name));
        if expired {
            dir = dir.join(EXPIRED_DIR);
        }
        dir
    }

    /// Whether a CA (root or intermediate) exists.
    pub fn ca_exists(&self, ca_name: &str) -> bool {
        self.ca_dir(ca_name).is_dir()
    }

    /// Whether a leaf's complete artifact set exists. A directory with any
    /// artifact missing counts as absent, so an interrupted issuance is
    /// re-run rather than repaired incrementally.
    pub fn leaf_exists(&self, kind: LeafKind, ca_name: &str, name: &str, expired: bool) -> bool {
        let dir = self.leaf_dir(kind, ca_name, name, expired);
        dir.is_dir()
            && dir.join(CERT_FILE).is_file()
            && dir.join(KEY_FILE).is_file()
            && dir.join(BUNDLE_FILE).is_file()
    }

    /// Persist a CA's artifact set (certificate, key, serial counter).
    pub fn write_ca(&self, ca_name: &str, cert_pem: &str, key_pem: &str) -> Result<()> {
        self.write_entity_dir(
            &self.ca_dir(ca_name),
            &[
                (CERT_FILE, cert_pem.as_bytes()),
                (KEY_FILE, key_pem.as_bytes()),
                (SERIAL_FILE, SERIAL_PLACEHOLDER.as_bytes()),
            ],
        )
    }

    /// Record an intermediate CA's parent, enabling cascading removal and
    /// chain assembly to find it later.
    pub fn write_parent_ref(&self, ca_name: &str, parent_name: &str) -> Result<()> {
        fs::write(self.parent_path(ca_name), normalize_name(parent_name))?;
        Ok(())
    }

    /// Persist a leaf's artifact set (certificate, key, PKCS#12 bundle).
    pub fn write_leaf(
        &self,
        kind: LeafKind,
        ca_name: &str,
        name: &str,
        expired: bool,
        cert_pem: &str,
        key_pem: &str,
        bundle: &[u8],
    ) -> Result<()> {
        self.write_entity_dir(
            &self.leaf_dir(kind, ca_name, name, expired),
            &[
                (CERT_FILE, cert_pem.as_bytes()),
                (KEY_FILE, key_pem.as_bytes()),
                (BUNDLE_FILE, bundle),
            ],
        )
    }

    /// Read a CA's certificate PEM.
    pub fn read_ca_cert(&self, ca_name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.ca_cert_path(ca_name))?)
    }

    /// Read a CA's private-key PEM.
    pub fn read_ca_key(&self, ca_name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.ca_key_path(ca_name))?)
    }

    /// Read an intermediate CA's parent name, if recorded.
    pub fn read_parent_ref(&self, ca_name: &str) -> Result<Option<String>> {
        let path = self.parent_path(ca_name);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?.trim().to_string()))
    }

    /// List every CA in the store, sorted by name.
    pub fn list_cas(&self) -> Result<Vec<String>> {
        self.list_directories(&self.base)
    }

    /// List every leaf of a kind, grouped per CA and sorted.
    pub fn list_leaves(&self, kind: LeafKind) -> Result<Vec<(String, Vec<String>)>> {
        let mut grouped = Vec::new();
        for ca_name in self.list_cas()? {
            let leaves = self.list_directories(&self.base.join(&ca_name).join(kind.dir_name()))?;
            grouped.push((ca_name, leaves));
        }
        Ok(grouped)
    }

    /// Every stored certificate file of a kind under one CA, including the
    /// expired variants.
    pub fn leaf_cert_files(&self, kind: LeafKind, ca_name: &str) -> Result<Vec<PathBuf>> {
        let group_dir = self.ca_entry_dir(ca_name).join(kind.dir_name());
        let mut files = Vec::new();

        for name in self.list_directories(&group_dir)? {
            let live = group_dir.join(&name).join(CERT_FILE);
            if live.is_file() {
                files.push(live);
            }
            let expired = group_dir.join(&name).join(EXPIRED_DIR).join(CERT_FILE);
            if expired.is_file() {
                files.push(expired);
            }
        }

        Ok(files)
    }

    /// A serializable inventory of every CA with its server and user leaves.
    pub fn inventory(&self) -> Result<Inventory> {
        let mut ca = Vec::new();
        for name in self.list_cas()? {
            let entry = self.base.join(&name);
            ca.push(CaInventory {
                servers: self.list_directories(&entry.join(LeafKind::Server.dir_name()))?,
                users: self.list_directories(&entry.join(LeafKind::User.dir_name()))?,
                name,
            });
        }
        Ok(Inventory { ca })
    }

    /// Remove a CA and everything issued under it. Intermediates that name
    /// this CA in their `parent.txt` are left behind as orphans.
    pub fn remove_ca(&self, ca_name: &str) -> Result<()> {
        let dir = self.ca_entry_dir(ca_name);
        if !dir.is_dir() {
            return Err(CertmintError::NotFoundError(format!(
                "Certificate Authority {ca_name} does not exist"
            )));
        }
        fs::remove_dir_all(dir)?;
        Ok(())
    }

    /// Remove a leaf's directory subtree, both live and expired variants.
    pub fn remove_leaf(&self, kind: LeafKind, ca_name: &str, name: &str) -> Result<()> {
        let dir = self
            .ca_entry_dir(ca_name)
            .join(kind.dir_name())
            .join(normalize_name(name));
        if !dir.is_dir() {
            return Err(CertmintError::NotFoundError(format!(
                "{name} does not exist for {ca_name}"
            )));
        }
        fs::remove_dir_all(dir)?;
        Ok(())
    }

    fn list_directories(&self, dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        if !dir.is_dir() {
            return Ok(names);
        }

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            // skip staging leftovers
            if entry.path().is_dir() && !name.starts_with('.') {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Write an artifact set into a staging directory, then rename it into
    /// place. A pre-existing destination (a partial artifact set from an
    /// interrupted run) is replaced wholesale.
    fn write_entity_dir(&self, dest: &Path, files: &[(&str, &[u8])]) -> Result<()> {
        let parent = dest.parent().ok_or_else(|| {
            CertmintError::StorageError(std::io::Error::other(format!(
                "Entity directory {} has no parent",
                dest.display()
            )))
        })?;
        fs::create_dir_all(parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(parent)?;
        for (name, bytes) in files {
            fs::write(staging.path().join(name), bytes)?;
        }

        if dest.exists() {
            fs::remove_dir_all(dest)?;
        }
        fs::rename(staging.into_path(), dest)?;
        Ok(())
    }
}
