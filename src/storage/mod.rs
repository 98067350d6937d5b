//! Persistence module.
//!
//! The PKI store maps entities to an on-disk hierarchy and the database
//! generator derives OpenSSL `ca` index files from the stored certificates.

pub mod database;
pub mod store;
