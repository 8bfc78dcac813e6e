//! OpenSSH Host Connector
//!
//! Implements `HostConnector` by shelling out to the system `ssh` client.
//! Trees are copied with a pluggable transfer strategy (rsync preferred,
//! scp fallback). Password auth goes through `sshpass -e`, so the password
//! only ever travels in the child's environment.

mod identity;
mod invocation;
mod process;
mod rsync;
mod scp;
mod transfer;

use std::net::Ipv4Addr;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use self::identity::SshIdentity;
use self::invocation::{shell_quote, SshInvocation};
use self::process::run_bounded;
use self::transfer::{detect_strategy, TransferStrategy};
use crate::cancel::CancellationToken;
use crate::domain::ports::{
    CommandOutput, ConnectParams, HostConnector, HostSession, SessionError,
};
use crate::domain::value_objects::Credential;

/// Opens sessions with the system OpenSSH client
pub struct OpenSshConnector {
    strategy: Option<Arc<dyn TransferStrategy>>,
}

impl OpenSshConnector {
    /// Detects the transfer tool once for every session it opens
    pub fn new() -> Self {
        let strategy = detect_strategy();
        debug!(
            transfer = strategy.as_ref().map(|s| s.name()).unwrap_or("none"),
            "transfer strategy detected"
        );
        Self { strategy }
    }

    /// Name of the transfer tool in use, if any
    pub fn transfer_method(&self) -> Option<&'static str> {
        self.strategy.as_ref().map(|s| s.name())
    }

    /// Check the local tools a run with `credential` needs before any host
    /// is contacted.
    pub fn preflight(&self, credential: &Credential) -> Result<(), String> {
        let mut required = vec!["ssh"];
        if credential.is_password() {
            required.push("sshpass");
        }
        for tool in required {
            if !is_installed(tool) {
                return Err(format!("'{}' not found in PATH", tool));
            }
        }
        if self.strategy.is_none() {
            return Err("no transfer method available. Install rsync (preferred) or scp".to_string());
        }
        Ok(())
    }
}

impl Default for OpenSshConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OpenSshConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenSshConnector")
            .field("transfer", &self.transfer_method())
            .finish()
    }
}

fn is_installed(program: &str) -> bool {
    Command::new(program)
        .arg("-V")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

impl HostConnector for OpenSshConnector {
    fn connect(
        &self,
        address: Ipv4Addr,
        params: &ConnectParams<'_>,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn HostSession>, SessionError> {
        let identity = Arc::new(SshIdentity::prepare(params.credential)?);
        let invocation = SshInvocation::new(
            params.user,
            address,
            params.port,
            params.connect_timeout,
            identity,
        );

        let output = run_bounded(&mut invocation.ssh("true"), params.connect_timeout, cancel)?;
        if !output.is_success() {
            let diagnostic = output.diagnostic();
            return Err(SessionError::Connection(if diagnostic.is_empty() {
                format!("ssh exited with {:?}", output.exit_code)
            } else {
                diagnostic.to_string()
            }));
        }
        debug!(host = %invocation.destination(), port = params.port, "connected");

        Ok(Box::new(OpenSshSession {
            invocation,
            command_timeout: params.command_timeout,
            strategy: self.strategy.clone(),
        }))
    }
}

/// A verified ssh target; every operation is a fresh ssh invocation
struct OpenSshSession {
    invocation: SshInvocation,
    command_timeout: Duration,
    strategy: Option<Arc<dyn TransferStrategy>>,
}

impl HostSession for OpenSshSession {
    fn run_command(
        &mut self,
        command: &str,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, SessionError> {
        run_bounded(&mut self.invocation.ssh(command), self.command_timeout, cancel)
    }

    fn copy_tree(
        &mut self,
        source: &Path,
        target: &str,
        cancel: &CancellationToken,
    ) -> Result<(), SessionError> {
        if !source.is_dir() {
            return Err(SessionError::Transfer(format!(
                "source path '{}' is not a directory",
                source.display()
            )));
        }
        let strategy = self.strategy.clone().ok_or_else(|| {
            SessionError::Unavailable(
                "no transfer method available. Install rsync (preferred) or scp".to_string(),
            )
        })?;

        let mkdir = self.run_command(&format!("mkdir -p {}", shell_quote(target)), cancel)?;
        if !mkdir.is_success() {
            return Err(SessionError::Transfer(format!(
                "could not create '{}': {}",
                target,
                mkdir.diagnostic()
            )));
        }

        debug!(
            host = %self.invocation.destination(),
            method = strategy.name(),
            source = %source.display(),
            target,
            "copying tree"
        );
        strategy.transfer(&self.invocation, source, target, self.command_timeout, cancel)
    }
}
