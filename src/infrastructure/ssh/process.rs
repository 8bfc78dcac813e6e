//! Bounded subprocess execution
//!
//! Every ssh, rsync and scp invocation goes through [`run_bounded`], which
//! captures output and kills the child on deadline or cancellation.

use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::cancel::CancellationToken;
use crate::domain::ports::{CommandOutput, SessionError};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run `command` to completion, bounded by `timeout` and `cancel`.
///
/// Stdin is closed so nothing ever waits on a password prompt.
pub(crate) fn run_bounded(
    command: &mut Command,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<CommandOutput, SessionError> {
    if cancel.is_cancelled() {
        return Err(SessionError::Cancelled);
    }
    let program = command.get_program().to_string_lossy().into_owned();
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| match e.kind() {
        ErrorKind::NotFound => SessionError::Unavailable(format!("'{}' not found in PATH", program)),
        _ => SessionError::from(e),
    })?;
    trace!(program = %program, pid = child.id(), "spawned");

    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let deadline = Instant::now() + timeout;
    let interrupted = loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok(CommandOutput {
                    exit_code: status.code(),
                    stdout: join(stdout),
                    stderr: join(stderr),
                });
            }
            Ok(None) => {}
            Err(e) => break SessionError::from(e),
        }
        if cancel.is_cancelled() {
            break SessionError::Cancelled;
        }
        if Instant::now() >= deadline {
            break SessionError::Timeout(timeout);
        }
        thread::sleep(POLL_INTERVAL);
    };

    // Reader threads are left to finish on their own: a grandchild may
    // still hold the pipes open after the child is gone.
    let _ = child.kill();
    let _ = child.wait();
    trace!(program = %program, error = %interrupted, "killed");
    Err(interrupted)
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
