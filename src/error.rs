//! Error types for the certmint library.
//!
//! This module defines all error types used throughout the library.
//! All errors implement `std::error::Error` and are designed to provide
//! clear, actionable error messages.

use thiserror::Error;

/// The main error type for certmint operations.
///
/// This enum covers all possible errors that can occur during certificate
/// issuance, store access, and revocation-database generation.
#[derive(Error, Debug)]
pub enum CertmintError {
    /// An explicit valid-to bound precedes the valid-from bound.
    ///
    /// Detected before any key generation or filesystem write.
    #[error("Expiration date {valid_to} before start date {valid_from}")]
    ValidityRangeError {
        /// The requested start of the validity window.
        valid_from: String,
        /// The requested end of the validity window.
        valid_to: String,
    },

    /// A referenced certificate authority does not exist in the store.
    #[error("Missing certificate authority: {0}")]
    MissingAuthorityError(String),

    /// Removal or lookup target absent
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Invalid input data
    #[error("Parse error: {0}")]
    ParseError(String),

    /// PEM encoding/decoding error
    #[error("PEM error: {0}")]
    PemError(String),

    /// Certificate template or signing error
    #[error("Certificate error: {0}")]
    CertificateError(#[from] rcgen::Error),

    /// PKCS#12 bundle encoding error
    #[error("PKCS#12 error: {0}")]
    BundleError(#[from] openssl::error::ErrorStack),

    /// Storage I/O error
    #[error("Storage I/O error: {0}")]
    StorageError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for certmint operations.
pub type Result<T> = std::result::Result<T, CertmintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CertmintError::MissingAuthorityError("acme root".to_string());
        assert_eq!(err.to_string(), "Missing certificate authority: acme root");
    }

    #[test]
    fn test_validity_range_display() {
        let err = CertmintError::ValidityRangeError {
            valid_from: "2051-01-01T00:00:00".to_string(),
            valid_to: "2050-01-01T00:00:00".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Expiration date 2050-01-01T00:00:00 before start date 2051-01-01T00:00:00"
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CertmintError>();
    }
}
