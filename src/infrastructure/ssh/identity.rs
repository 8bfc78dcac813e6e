//! Materialized SSH identity
//!
//! Turns a [`Credential`] into something the OpenSSH tools accept. Inline
//! keys are written to a private temporary file that lives as long as the
//! identity does.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::ports::SessionError;
use crate::domain::value_objects::{Credential, SecretString};

pub(crate) enum SshIdentity {
    KeyFile(PathBuf),
    /// Removed from disk on drop
    TempKey(NamedTempFile),
    Password(SecretString),
}

impl SshIdentity {
    pub(crate) fn prepare(credential: &Credential) -> Result<Self, SessionError> {
        match credential {
            Credential::PrivateKeyFile(path) => Ok(Self::KeyFile(path.clone())),
            Credential::PrivateKeyInline(key) => write_temp_key(key.expose()).map(Self::TempKey),
            Credential::Password(password) => Ok(Self::Password(password.clone())),
        }
    }

    pub(crate) fn key_path(&self) -> Option<&Path> {
        match self {
            Self::KeyFile(path) => Some(path),
            Self::TempKey(file) => Some(file.path()),
            Self::Password(_) => None,
        }
    }

    pub(crate) fn password(&self) -> Option<&str> {
        match self {
            Self::Password(password) => Some(password.expose()),
            _ => None,
        }
    }
}

fn write_temp_key(raw: &str) -> Result<NamedTempFile, SessionError> {
    // tempfile creates the file with mode 0600, which ssh insists on
    let mut file = tempfile::Builder::new()
        .prefix("drone-do-key-")
        .tempfile()
        .map_err(|e| SessionError::Io(format!("could not write private key: {}", e)))?;
    file.write_all(normalize_inline_key(raw).as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Keys passed through environment variables often arrive with literal
/// `\n` sequences, and ssh rejects a key without a trailing newline.
fn normalize_inline_key(raw: &str) -> String {
    let mut key = if !raw.contains('\n') && raw.contains("\\n") {
        raw.replace("\\n", "\n")
    } else {
        raw.to_string()
    };
    if !key.ends_with('\n') {
        key.push('\n');
    }
    key
}
