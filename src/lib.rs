//! certmint: an offline certificate authority manager.
//!
//! This library creates root and intermediate CAs, issues server and user
//! certificates under them, and persists every artifact in a predictable
//! directory hierarchy suitable for test and internal-infrastructure PKI.
//! It can also regenerate an OpenSSL `ca`-style revocation database from
//! the issued certificates.
//!
//! # Architecture
//!
//! Certificate content is decided by the pure template builder
//! ([`cert::template`]); the per-role modules drive parent resolution,
//! signing, and persistence; the [`storage::store::PkiStore`] owns the
//! on-disk layout. All operations return `Result` with a structured error,
//! and creating an entity that already exists is an idempotent skip rather
//! than a failure.
//!
//! # Example
//!
//! ```rust,no_run
//! use certmint::cert::ca::create_ca_cert;
//! use certmint::cert::server::create_server_cert;
//! use certmint::config::{CaOptions, Config, ServerOptions};
//!
//! fn example() -> certmint::Result<()> {
//!     let config = Config::new("pki");
//!     create_ca_cert(&config, "Acme Root CA", &CaOptions::default())?;
//!     create_server_cert(&config, "web", "Acme Root CA", &ServerOptions::default())?;
//!     Ok(())
//! }
//! ```

pub mod cert;
pub mod config;
pub mod crypto;
pub mod error;
pub mod hosts;
pub mod storage;

// Re-export commonly used types
pub use cert::CreateOutcome;
pub use error::{CertmintError, Result};
