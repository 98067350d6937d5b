//! Certificate issuance module.
//!
//! Each role (root CA, intermediate CA, server, user) has its own module
//! driving the shared creation flow: validity check, parent resolution,
//! idempotency check, key generation, template build, signing, and
//! persistence.

pub mod ca;
pub mod describe;
pub mod intermediate;
pub mod loader;
pub mod server;
pub mod template;
pub mod user;

/// Outcome of a creation operation.
///
/// Creating an entity that already exists is an idempotent skip, reported
/// through the same channel as success so batch callers can continue.
/// Hard failures (invalid validity range, missing authority, I/O) surface
/// as [`crate::CertmintError`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The entity was created and persisted.
    Created(String),
    /// The entity already exists; nothing was written.
    AlreadyExists(String),
}

impl CreateOutcome {
    /// Human-readable description of the outcome.
    pub fn message(&self) -> &str {
        match self {
            CreateOutcome::Created(message) | CreateOutcome::AlreadyExists(message) => message,
        }
    }

    /// Whether the entity was created by this call.
    pub fn created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}
