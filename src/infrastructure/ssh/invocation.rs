//! OpenSSH command lines for one host

use std::net::Ipv4Addr;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use super::identity::SshIdentity;

/// Builds `ssh`, `scp` and `rsync` commands aimed at one host
pub(crate) struct SshInvocation {
    user: String,
    address: Ipv4Addr,
    port: u16,
    connect_timeout: Duration,
    identity: Arc<SshIdentity>,
}

impl SshInvocation {
    pub(crate) fn new(
        user: &str,
        address: Ipv4Addr,
        port: u16,
        connect_timeout: Duration,
        identity: Arc<SshIdentity>,
    ) -> Self {
        Self {
            user: user.to_string(),
            address,
            port,
            connect_timeout,
            identity,
        }
    }

    /// `user@address`
    pub(crate) fn destination(&self) -> String {
        format!("{}@{}", self.user, self.address)
    }

    /// `user@address:dir/`, the form rsync and scp take for a remote directory
    pub(crate) fn remote_dir(&self, target: &str) -> String {
        if target.ends_with('/') {
            format!("{}:{}", self.destination(), target)
        } else {
            format!("{}:{}/", self.destination(), target)
        }
    }

    fn options(&self) -> Vec<String> {
        let mut opts = vec![
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            "LogLevel=ERROR".to_string(),
        ];
        match self.identity.key_path() {
            Some(key) => opts.extend([
                "-i".to_string(),
                key.display().to_string(),
                "-o".to_string(),
                "IdentitiesOnly=yes".to_string(),
                "-o".to_string(),
                "BatchMode=yes".to_string(),
            ]),
            None => opts.extend([
                "-o".to_string(),
                "PreferredAuthentications=password,keyboard-interactive".to_string(),
                "-o".to_string(),
                "PubkeyAuthentication=no".to_string(),
                "-o".to_string(),
                "NumberOfPasswordPrompts=1".to_string(),
            ]),
        }
        opts
    }

    /// `program`, wrapped in `sshpass -e` for password auth
    fn base(&self, program: &str) -> Command {
        match self.identity.password() {
            Some(password) => {
                let mut cmd = Command::new("sshpass");
                cmd.arg("-e").arg(program).env("SSHPASS", password);
                cmd
            }
            None => Command::new(program),
        }
    }

    /// Run `remote_command` through the remote login shell
    pub(crate) fn ssh(&self, remote_command: &str) -> Command {
        let mut cmd = self.base("ssh");
        cmd.arg("-p")
            .arg(self.port.to_string())
            .args(self.options())
            .arg(self.destination())
            .arg(remote_command);
        cmd
    }

    /// `scp` with connection options applied; sources and target still to add
    pub(crate) fn scp(&self) -> Command {
        let mut cmd = self.base("scp");
        cmd.arg("-P").arg(self.port.to_string()).args(self.options());
        cmd
    }

    /// `rsync` using ssh with the same options as its remote shell
    pub(crate) fn rsync(&self) -> Command {
        let mut shell = Vec::new();
        if self.identity.password().is_some() {
            shell.extend(["sshpass".to_string(), "-e".to_string()]);
        }
        shell.extend(["ssh".to_string(), "-p".to_string(), self.port.to_string()]);
        shell.extend(self.options());

        let mut cmd = Command::new("rsync");
        if let Some(password) = self.identity.password() {
            cmd.env("SSHPASS", password);
        }
        let shell: Vec<String> = shell.iter().map(|part| shell_quote(part)).collect();
        cmd.arg("-e").arg(shell.join(" "));
        cmd
    }
}

/// Quote `s` for a POSIX shell
pub(crate) fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
