//! Configuration module
//!
//! Deployment parameters arrive from flags, `PLUGIN_*` environment variables,
//! their bare fallbacks and an optional env file (see `cli.rs`). They are
//! collected into one [`Config`], validated once in place, and then passed by
//! reference to the resolver and the orchestrator.

mod env_file;
mod types;
mod validator;

pub use env_file::{load_env_file, EnvFileStatus, ENV_FILE_VAR};
pub use types::{
    Config, HostSelector, DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PATH,
    DEFAULT_PORT, DEFAULT_USER,
};
