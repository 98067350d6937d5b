//! Configuration types for certmint operations.
//!
//! Every operation takes an explicit [`Config`] plus a strongly-typed options
//! struct for its role; nothing in the core consults ambient state. Defaults
//! for the individual fields are applied by the template builder
//! (see [`crate::cert::template`]).

use std::path::PathBuf;

/// Default base path for the PKI store.
pub const DEFAULT_BASE_PATH: &str = "pki";

/// Default password protecting PKCS#12 bundles.
pub const DEFAULT_BUNDLE_PASSWORD: &str = "changeme";

/// Environment variable the CLI consults for the localhost certificate's
/// DNS subject alternative name. The library itself never reads it; the
/// resolved value is passed in through [`Config::localhost_dns_name`].
pub const LOCALHOST_DNS_ENV: &str = "CERTMINT_LOCALHOST_DNS_NAME";

/// Shared configuration threaded through every store and issuance operation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory of the PKI store.
    pub base_path: PathBuf,

    /// Override for the DNS name embedded in localhost server certificates.
    /// When unset, the machine's hostname is used.
    pub localhost_dns_name: Option<String>,
}

impl Config {
    /// Create a configuration rooted at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            localhost_dns_name: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PATH)
    }
}

/// Distinguished-name attributes for a certificate subject.
///
/// Absent optional fields are omitted from the subject entirely, never
/// defaulted to an empty value. The country defaults to `US` when unset.
#[derive(Debug, Clone, Default)]
pub struct SubjectOptions {
    /// Common Name. Leaf issuance defaults this to the requested name.
    pub common_name: Option<String>,
    /// Country attribute; defaults to `US`.
    pub country: Option<String>,
    /// Organization attributes, in order.
    pub organizations: Vec<String>,
    /// Organizational-unit attributes, in order.
    pub organizational_units: Vec<String>,
    /// Locality attribute.
    pub locality: Option<String>,
    /// State or province attribute.
    pub state: Option<String>,
}

/// Validity-window selection for a certificate.
///
/// The default window is `now - 1 day` through `now + 5 years`; with
/// `expired` set it is `now - 5 years` through `now - 1 day`. Explicit
/// bounds override the corresponding default unconditionally.
#[derive(Debug, Clone, Default)]
pub struct ValidityOptions {
    /// Issue an already-expired certificate.
    pub expired: bool,
    /// Explicit start of the validity window, ISO-8601.
    pub valid_from: Option<String>,
    /// Explicit end of the validity window, ISO-8601.
    pub valid_to: Option<String>,
}

/// Options for creating a root or intermediate certificate authority.
#[derive(Debug, Clone, Default)]
pub struct CaOptions {
    /// Subject attributes.
    pub subject: SubjectOptions,
    /// Validity window.
    pub validity: ValidityOptions,
}

/// Options for issuing a server certificate.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// Subject attributes.
    pub subject: SubjectOptions,
    /// Validity window.
    pub validity: ValidityOptions,
    /// Add localhost subject alternative names (hostname, `localhost`,
    /// loopback, and every non-loopback IPv4 bound to the host).
    pub localhost: bool,
    /// Root CA whose certificate is appended to the PKCS#12 bundle chain.
    /// Signing always uses the immediate issuing CA.
    pub root_ca_name: Option<String>,
    /// Password protecting the PKCS#12 bundle; defaults to
    /// [`DEFAULT_BUNDLE_PASSWORD`].
    pub password: Option<String>,
    /// DNS subject alternative names.
    pub subject_alt_dns_names: Vec<String>,
    /// IP subject alternative names.
    pub subject_alt_ip_names: Vec<String>,
}

/// Options for issuing a user certificate.
#[derive(Debug, Clone, Default)]
pub struct UserOptions {
    /// Subject attributes.
    pub subject: SubjectOptions,
    /// Validity window.
    pub validity: ValidityOptions,
    /// Root CA whose certificate is appended to the PKCS#12 bundle chain.
    pub root_ca_name: Option<String>,
    /// Password protecting the PKCS#12 bundle; defaults to
    /// [`DEFAULT_BUNDLE_PASSWORD`].
    pub password: Option<String>,
    /// RFC 822 (email) subject alternative names.
    pub subject_alt_email_names: Vec<String>,
}
