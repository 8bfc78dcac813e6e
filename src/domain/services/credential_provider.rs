//! Credential resolution
//!
//! Maps the one credential field a validated config carries onto a
//! [`Credential`]. Validation has already rejected ambiguous or missing
//! credentials, so this is a pure mapping.

use std::path::PathBuf;

use crate::config::Config;
use crate::domain::value_objects::{Credential, SecretString};

pub struct CredentialProvider;

impl CredentialProvider {
    /// Resolve the credential of a validated config.
    ///
    /// Fields are checked in the order key path, inline key, password.
    pub fn resolve(config: &Config) -> Credential {
        if !config.key_path.is_empty() {
            Credential::PrivateKeyFile(PathBuf::from(&config.key_path))
        } else if !config.key.is_empty() {
            Credential::PrivateKeyInline(SecretString::new(config.key.as_str()))
        } else {
            Credential::Password(SecretString::new(config.password.as_str()))
        }
    }
}
