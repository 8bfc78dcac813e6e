//! Remote session credential

use std::fmt;
use std::path::PathBuf;

/// A string that never shows up in `Debug` or `Display` output
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the secret value. Callers must not log it.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(<redacted>)")
    }
}

/// How to authenticate against every host in a run
///
/// Exactly one variant is live per run. Never serialized or logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    PrivateKeyFile(PathBuf),
    PrivateKeyInline(SecretString),
    Password(SecretString),
}

impl Credential {
    /// Variant name, safe for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PrivateKeyFile(_) => "private key file",
            Self::PrivateKeyInline(_) => "inline private key",
            Self::Password(_) => "password",
        }
    }

    pub fn is_password(&self) -> bool {
        matches!(self, Self::Password(_))
    }
}
