//! Tree Transfer Strategy
//!
//! Defines how a local directory tree reaches a remote host.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::invocation::SshInvocation;
use crate::cancel::CancellationToken;
use crate::domain::ports::SessionError;

/// Strategy for copying a directory tree to a remote host
pub(crate) trait TransferStrategy: Send + Sync {
    /// Name of this transfer method (for logging)
    fn name(&self) -> &'static str;

    /// Check if this transfer method is available on the system
    fn is_available(&self) -> bool;

    /// Copy the contents of `source` into the existing remote directory
    /// `target`, overwriting files that already exist there
    fn transfer(
        &self,
        invocation: &SshInvocation,
        source: &Path,
        target: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), SessionError>;
}

/// Detect and return the best available transfer strategy
pub(crate) fn detect_strategy() -> Option<Arc<dyn TransferStrategy>> {
    let rsync = super::rsync::RsyncTransfer;
    if rsync.is_available() {
        return Some(Arc::new(rsync));
    }

    let scp = super::scp::ScpTransfer;
    if scp.is_available() {
        return Some(Arc::new(scp));
    }

    None
}
