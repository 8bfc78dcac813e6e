//! SCP Transfer Strategy
//!
//! Fallback when rsync is not installed. Always copies full files; the
//! session creates the target directory beforehand since scp won't.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use super::invocation::SshInvocation;
use super::process::run_bounded;
use super::transfer::TransferStrategy;
use crate::cancel::CancellationToken;
use crate::domain::ports::SessionError;

/// Transfer strategy using `scp -r`
pub struct ScpTransfer;

impl ScpTransfer {
    /// Check if scp is installed and available
    pub fn check_available() -> bool {
        // scp without args returns non-zero, but if we can spawn it, it's available
        Command::new("scp")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    /// Top-level entries of `source`, sorted for a stable command line
    fn top_level_entries(source: &Path) -> Result<Vec<PathBuf>, SessionError> {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(source)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        entries.sort();
        Ok(entries)
    }
}

impl TransferStrategy for ScpTransfer {
    fn name(&self) -> &'static str {
        "scp"
    }

    fn is_available(&self) -> bool {
        Self::check_available()
    }

    fn transfer(
        &self,
        invocation: &SshInvocation,
        source: &Path,
        target: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), SessionError> {
        let entries = Self::top_level_entries(source)?;
        if entries.is_empty() {
            return Ok(());
        }

        let mut cmd = invocation.scp();
        cmd.arg("-r") // recursive
            .arg("-p") // preserve timestamps
            .args(&entries)
            .arg(invocation.remote_dir(target));

        let output = run_bounded(&mut cmd, timeout, cancel)?;
        if !output.is_success() {
            return Err(SessionError::Transfer(format!(
                "scp failed with exit code {:?}: {}",
                output.exit_code,
                output.diagnostic()
            )));
        }
        Ok(())
    }
}
