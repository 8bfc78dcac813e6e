//! Recording Host Connector
//!
//! An in-memory `HostConnector` that records every operation instead of
//! touching the network. Failures can be scripted per host address, which
//! makes it the test double for orchestrator and end-to-end scenario tests.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cancel::CancellationToken;
use crate::domain::ports::{
    CommandOutput, ConnectParams, HostConnector, HostSession, SessionError,
};

/// One operation seen by the connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedOp {
    Connect { user: String, port: u16 },
    Command(String),
    CopyTree { source: PathBuf, target: String },
}

#[derive(Debug, Clone, Default)]
struct Script {
    refused: HashSet<Ipv4Addr>,
    failing_commands: HashMap<(Ipv4Addr, String), CommandOutput>,
    failing_copies: HashMap<Ipv4Addr, String>,
    cancel_on: Option<(String, CancellationToken)>,
    command_delay: Duration,
}

#[derive(Debug, Default)]
struct Counters {
    open: AtomicUsize,
    max_open: AtomicUsize,
}

/// Connector that records operations per host
#[derive(Debug, Default)]
pub struct RecordingConnector {
    script: Arc<Script>,
    log: Arc<Mutex<Vec<(Ipv4Addr, RecordedOp)>>>,
    counters: Arc<Counters>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn script_mut(&mut self) -> &mut Script {
        Arc::make_mut(&mut self.script)
    }

    /// Connections to `address` fail with a connection error
    pub fn refuse_connection(mut self, address: Ipv4Addr) -> Self {
        self.script_mut().refused.insert(address);
        self
    }

    /// `command` exits with `exit_code` on `address`
    pub fn fail_command(
        mut self,
        address: Ipv4Addr,
        command: &str,
        exit_code: i32,
        stderr: &str,
    ) -> Self {
        self.script_mut().failing_commands.insert(
            (address, command.to_string()),
            CommandOutput {
                exit_code: Some(exit_code),
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    /// The tree copy to `address` fails with `message`
    pub fn fail_copy(mut self, address: Ipv4Addr, message: &str) -> Self {
        self.script_mut()
            .failing_copies
            .insert(address, message.to_string());
        self
    }

    /// Running `command` on any host trips `token`, as an external
    /// cancellation arriving mid-command would
    pub fn cancel_during(mut self, command: &str, token: CancellationToken) -> Self {
        self.script_mut().cancel_on = Some((command.to_string(), token));
        self
    }

    /// Every command takes at least `delay`
    pub fn with_command_delay(mut self, delay: Duration) -> Self {
        self.script_mut().command_delay = delay;
        self
    }

    /// Operations recorded for `address`, in order
    pub fn ops_for(&self, address: Ipv4Addr) -> Vec<RecordedOp> {
        self.log
            .lock()
            .map(|log| {
                log.iter()
                    .filter(|(a, _)| *a == address)
                    .map(|(_, op)| op.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Highest number of sessions that were open at the same time
    pub fn max_concurrent_sessions(&self) -> usize {
        self.counters.max_open.load(Ordering::SeqCst)
    }

    fn record(&self, address: Ipv4Addr, op: RecordedOp) {
        if let Ok(mut log) = self.log.lock() {
            log.push((address, op));
        }
    }
}

impl HostConnector for RecordingConnector {
    fn connect(
        &self,
        address: Ipv4Addr,
        params: &ConnectParams<'_>,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn HostSession>, SessionError> {
        if cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        self.record(
            address,
            RecordedOp::Connect {
                user: params.user.to_string(),
                port: params.port,
            },
        );
        if self.script.refused.contains(&address) {
            return Err(SessionError::Connection(format!(
                "ssh: connect to host {} port {}: Connection refused",
                address, params.port
            )));
        }

        let open = self.counters.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_open.fetch_max(open, Ordering::SeqCst);

        Ok(Box::new(RecordingSession {
            address,
            script: self.script.clone(),
            log: self.log.clone(),
            counters: self.counters.clone(),
        }))
    }
}

struct RecordingSession {
    address: Ipv4Addr,
    script: Arc<Script>,
    log: Arc<Mutex<Vec<(Ipv4Addr, RecordedOp)>>>,
    counters: Arc<Counters>,
}

impl RecordingSession {
    fn record(&self, op: RecordedOp) {
        if let Ok(mut log) = self.log.lock() {
            log.push((self.address, op));
        }
    }
}

impl HostSession for RecordingSession {
    fn run_command(
        &mut self,
        command: &str,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, SessionError> {
        self.record(RecordedOp::Command(command.to_string()));
        if !self.script.command_delay.is_zero() {
            std::thread::sleep(self.script.command_delay);
        }

        if let Some((trigger, token)) = &self.script.cancel_on {
            if trigger == command {
                token.cancel();
            }
        }
        if cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }

        Ok(self
            .script
            .failing_commands
            .get(&(self.address, command.to_string()))
            .cloned()
            .unwrap_or_else(CommandOutput::success))
    }

    fn copy_tree(
        &mut self,
        source: &Path,
        target: &str,
        cancel: &CancellationToken,
    ) -> Result<(), SessionError> {
        self.record(RecordedOp::CopyTree {
            source: source.to_path_buf(),
            target: target.to_string(),
        });
        if cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        match self.script.failing_copies.get(&self.address) {
            Some(message) => Err(SessionError::Transfer(message.clone())),
            None => Ok(()),
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.counters.open.fetch_sub(1, Ordering::SeqCst);
    }
}
