//! Rsync Transfer Strategy
//!
//! Preferred method: incremental, compressed, creates nothing it doesn't
//! need to.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use super::invocation::SshInvocation;
use super::process::run_bounded;
use super::transfer::TransferStrategy;
use crate::cancel::CancellationToken;
use crate::domain::ports::SessionError;

/// Transfer strategy using rsync over ssh
pub struct RsyncTransfer;

impl RsyncTransfer {
    /// Check if rsync is installed and available
    pub fn check_available() -> bool {
        Command::new("rsync")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl TransferStrategy for RsyncTransfer {
    fn name(&self) -> &'static str {
        "rsync"
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
        let mut cmd = invocation.rsync();
        // trailing slash = copy contents
        cmd.arg("-az")
            .arg(format!("{}/", source.display()))
            .arg(invocation.remote_dir(target));

        let output = run_bounded(&mut cmd, timeout, cancel)?;
        if !output.is_success() {
            return Err(SessionError::Transfer(format!(
                "rsync failed with exit code {:?}: {}",
                output.exit_code,
                output.diagnostic()
            )));
        }
        Ok(())
    }
}
