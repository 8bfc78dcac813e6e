//! Configuration type definitions

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_PORT: i32 = 22;
/// Connect timeout unit is seconds.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_PATH: &str = "./";

/// Deployment parameters
///
/// Empty strings and zero durations mean "unset" until [`Config::validate`]
/// has run. Afterwards exactly one selector and exactly one credential field
/// is non-empty, and every defaulted field holds a concrete value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Name of the load balancer whose members are deployed to
    pub loadbalancer: String,
    /// Droplet tag to deploy to
    pub tag: String,
    pub user: String,
    pub key_path: String,
    /// Inline private key (PEM / OpenSSH format)
    pub key: String,
    pub password: String,
    /// Signed so that a negative input can be defaulted rather than rejected
    pub port: i32,
    pub connect_timeout: Duration,
    /// Bound for each remote command and each file transfer
    pub command_timeout: Duration,
    /// DigitalOcean personal access token
    pub pat: String,
    pub source_path: PathBuf,
    /// Remote directory the source tree is copied into
    pub target_path: String,
    pub pre_sync: Vec<String>,
    pub post_sync: Vec<String>,
}

/// Which droplets a run targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSelector<'a> {
    LoadBalancer(&'a str),
    Tag(&'a str),
}

impl fmt::Display for HostSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadBalancer(name) => write!(f, "load balancer '{}'", name),
            Self::Tag(tag) => write!(f, "tag '{}'", tag),
        }
    }
}

impl Config {
    /// The host selector, if exactly one is set
    pub fn selector(&self) -> Option<HostSelector<'_>> {
        match (self.loadbalancer.is_empty(), self.tag.is_empty()) {
            (false, true) => Some(HostSelector::LoadBalancer(&self.loadbalancer)),
            (true, false) => Some(HostSelector::Tag(&self.tag)),
            _ => None,
        }
    }

    /// Number of credential fields that are set
    pub(crate) fn credential_count(&self) -> usize {
        [&self.key_path, &self.key, &self.password]
            .iter()
            .filter(|v| !v.is_empty())
            .count()
    }

    /// Port as an unsigned value (validated configs only hold positive ports)
    pub fn port(&self) -> u16 {
        u16::try_from(self.port).unwrap_or(DEFAULT_PORT as u16)
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("loadbalancer", &self.loadbalancer)
            .field("tag", &self.tag)
            .field("user", &self.user)
            .field("key_path", &self.key_path)
            .field("key", &redact(&self.key))
            .field("password", &redact(&self.password))
            .field("port", &self.port)
            .field("connect_timeout", &self.connect_timeout)
            .field("command_timeout", &self.command_timeout)
            .field("pat", &redact(&self.pat))
            .field("source_path", &self.source_path)
            .field("target_path", &self.target_path)
            .field("pre_sync", &self.pre_sync)
            .field("post_sync", &self.post_sync)
            .finish()
    }
}
