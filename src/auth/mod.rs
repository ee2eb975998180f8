//! Authentication system
//!
//! Verifies username/password pairs against a credential source.

pub mod credentials;
pub mod validator;

pub use credentials::{CredentialFile, CredentialVerifier, StaticCredentials};
