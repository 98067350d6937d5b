//! Cryptographic operations module.
//!
//! This module wraps the primitives certmint needs from its crypto
//! collaborators:
//!
//! - ECDSA P-384 key-pair generation and PEM serialization
//! - Password-protected PKCS#12 bundle encoding
//!
//! Certificate templates are signed with SHA-384 through the key pair's
//! signature algorithm; no signing happens in this module.

pub mod keys;
pub mod pkcs12;
