use std::path::PathBuf;
use std::time::Duration;

use clap::builder::FalseyValueParser;
use clap::Parser;
use drone_digitalocean::config::Config;
use drone_digitalocean::infrastructure::cloud::DEFAULT_API_URL;

/// Deploy a file tree and commands to DigitalOcean droplets
///
/// Every option can also be set through its `PLUGIN_*` environment variable
/// or, where listed, a bare fallback name (`TAG`, `SSH_USER`, ...).
#[derive(Parser, Debug)]
#[command(name = "drone-digitalocean")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Load balancer whose member droplets are deployed to
    #[arg(short = 'b', long, env = "PLUGIN_LOADBALANCER")]
    pub loadbalancer: Option<String>,

    /// Deploy to droplets carrying this tag [fallback: TAG]
    #[arg(long, env = "PLUGIN_TAG")]
    pub tag: Option<String>,

    /// SSH user [default: root] [fallback: SSH_USER]
    #[arg(short, long, env = "PLUGIN_SSH_USER")]
    pub user: Option<String>,

    /// Path to a private key file [fallback: SSH_KEY_PATH]
    #[arg(short = 'i', long, env = "PLUGIN_SSH_KEY_PATH")]
    pub key_path: Option<String>,

    /// Private key contents [fallback: SSH_KEY]
    #[arg(long, env = "PLUGIN_SSH_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// SSH password, requires sshpass [fallback: SSH_PASSWORD]
    #[arg(long, env = "PLUGIN_SSH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// SSH port [default: 22] [fallback: SSH_PORT]
    #[arg(short, long, env = "PLUGIN_SSH_PORT", allow_negative_numbers = true)]
    pub port: Option<i32>,

    /// Connect timeout, e.g. `30s`, `2m`; a bare number is seconds [default: 60s] [fallback: SSH_TIMEOUT]
    #[arg(long, env = "PLUGIN_SSH_TIMEOUT", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// DigitalOcean personal access token [fallback: PAT]
    #[arg(short = 't', long, env = "PLUGIN_PAT", hide_env_values = true)]
    pub pat: Option<String>,

    /// Local directory to copy [default: ./] [fallback: SOURCE]
    #[arg(long, env = "PLUGIN_SOURCE")]
    pub source: Option<PathBuf>,

    /// Remote directory to copy into [default: ./] [fallback: TARGET]
    #[arg(long, env = "PLUGIN_TARGET")]
    pub target: Option<String>,

    /// Command run before the copy; repeat for more, in order
    /// [env: PLUGIN_PRE_SYNC, comma-separated] [fallback: PRE_SYNC]
    #[arg(long = "pre-sync")]
    pub pre_sync: Vec<String>,

    /// Command run after the copy; repeat for more, in order
    /// [env: PLUGIN_POST_SYNC, comma-separated] [fallback: POST_SYNC]
    #[arg(long = "post-sync")]
    pub post_sync: Vec<String>,

    /// Hosts deployed to at once (0 = all)
    #[arg(long, env = "PLUGIN_CONCURRENCY", default_value_t = 0)]
    pub concurrency: usize,

    /// Bound for each remote command and transfer [default: 10m]
    #[arg(long, env = "PLUGIN_COMMAND_TIMEOUT", value_parser = parse_timeout)]
    pub command_timeout: Option<Duration>,

    /// Resolve and print the target hosts without deploying
    #[arg(long, env = "PLUGIN_DRY_RUN", value_parser = FalseyValueParser::new())]
    pub dry_run: bool,

    /// Output NDJSON events for CI
    #[arg(long)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// DigitalOcean API root
    #[arg(long, env = "PLUGIN_API_URL", default_value = DEFAULT_API_URL, hide = true)]
    pub api_url: String,
}

/// Split an environment list on commas. Flag values are never split.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// `30s`, `2m`, `1h30m`, or a bare number of seconds
pub fn parse_timeout(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(value).map_err(|e| format!("invalid duration '{}': {}", value, e))
}

impl Cli {
    /// Build the deployment config. Options unset on the command line and in
    /// their `PLUGIN_*` variable fall back to the bare variable via `env`.
    /// Command lists read both variables here rather than through clap.
    pub fn to_config(&self, env: impl Fn(&str) -> Option<String>) -> Result<Config, String> {
        let text = |value: &Option<String>, bare: &str| {
            value
                .clone()
                .or_else(|| env(bare))
                .unwrap_or_default()
        };
        let list = |value: &Vec<String>, plugin: &str, bare: &str| {
            if !value.is_empty() {
                return value.clone();
            }
            env(plugin)
                .or_else(|| env(bare))
                .map(|raw| split_list(&raw))
                .unwrap_or_default()
        };

        let port = match (self.port, env("SSH_PORT")) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw
                .trim()
                .parse()
                .map_err(|_| format!("invalid SSH_PORT '{}'", raw))?,
            (None, None) => 0,
        };
        let connect_timeout = match (self.timeout, env("SSH_TIMEOUT")) {
            (Some(timeout), _) => timeout,
            (None, Some(raw)) => parse_timeout(&raw)?,
            (None, None) => Duration::ZERO,
        };

        Ok(Config {
            loadbalancer: self.loadbalancer.clone().unwrap_or_default(),
            tag: text(&self.tag, "TAG"),
            user: text(&self.user, "SSH_USER"),
            key_path: text(&self.key_path, "SSH_KEY_PATH"),
            key: text(&self.key, "SSH_KEY"),
            password: text(&self.password, "SSH_PASSWORD"),
            port,
            connect_timeout,
            command_timeout: self.command_timeout.unwrap_or_default(),
            pat: text(&self.pat, "PAT"),
            source_path: self
                .source
                .clone()
                .or_else(|| env("SOURCE").map(PathBuf::from))
                .unwrap_or_default(),
            target_path: text(&self.target, "TARGET"),
            pre_sync: list(&self.pre_sync, "PLUGIN_PRE_SYNC", "PRE_SYNC"),
            post_sync: list(&self.post_sync, "PLUGIN_POST_SYNC", "POST_SYNC"),
        })
    }
}
