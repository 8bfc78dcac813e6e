//! Host Session Port
//!
//! The remote executor capability the orchestrator drives: connect to a
//! host, run a command, copy a directory tree. The production adapter
//! shells out to OpenSSH; tests substitute a recording double.

use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::cancel::CancellationToken;
use crate::domain::value_objects::Credential;

/// Everything needed to open a session, shared by all hosts of a run
#[derive(Debug, Clone, Copy)]
pub struct ConnectParams<'a> {
    pub user: &'a str,
    pub port: u16,
    pub credential: &'a Credential,
    pub connect_timeout: Duration,
    /// Bound for each command and transfer on the opened session
    pub command_timeout: Duration,
}

/// Captured result of a remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self {
            exit_code: Some(0),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Output worth showing a user: stderr when present, stdout otherwise
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Error from the remote transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A required local tool (ssh, sshpass, rsync/scp) is missing
    #[error("not available: {0}")]
    Unavailable(String),

    /// Host unreachable or authentication rejected
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("timed out after {}", humantime::format_duration(*.0))]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// An open session on one host
pub trait HostSession {
    /// Run `command` on the host. A non-zero exit is `Ok` with the exit code
    /// recorded; `Err` means the command could not be run to completion.
    fn run_command(
        &mut self,
        command: &str,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, SessionError>;

    /// Copy the tree rooted at local `source` into remote `target`.
    ///
    /// Atomic-or-failed from the caller's point of view: no partial-transfer
    /// recovery is attempted. Existing remote files are overwritten; stale
    /// remote files are left in place.
    fn copy_tree(
        &mut self,
        source: &Path,
        target: &str,
        cancel: &CancellationToken,
    ) -> Result<(), SessionError>;
}

/// Opens sessions to hosts
pub trait HostConnector: Send + Sync {
    /// Open and authenticate a session, bounded by `params.connect_timeout`
    fn connect(
        &self,
        address: Ipv4Addr,
        params: &ConnectParams<'_>,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn HostSession>, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_prefers_stderr() {
        let output = CommandOutput {
            exit_code: Some(2),
            stdout: "partial\n".to_string(),
            stderr: "  boom\n".to_string(),
        };
        assert_eq!(output.diagnostic(), "boom");
        assert!(!output.is_success());
    }

    #[test]
    fn diagnostic_falls_back_to_stdout() {
        let output = CommandOutput {
            exit_code: Some(1),
            stdout: "details\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.diagnostic(), "details");
    }

    #[test]
    fn timeout_error_is_human_readable() {
        let err = SessionError::Timeout(Duration::from_secs(90));
        assert_eq!(err.to_string(), "timed out after 1m 30s");
    }
}
