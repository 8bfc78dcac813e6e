//! Error types for drone-digitalocean
//!
//! Setup errors (`ConfigError`, `InventoryError`) abort the run before any host
//! is contacted. Per-host failures are not errors at this level; they are
//! recorded as data in each host's `Outcome`.

use thiserror::Error;

use crate::domain::ports::CloudError;

/// Result type alias for a whole deploy run
pub type DeployResult<T> = Result<T, DeployError>;

/// Configuration rejected by validation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("please provide only a loadbalancer or a tag")]
    AmbiguousSelector,

    #[error("please provide a loadbalancer or a tag")]
    MissingSelector,

    #[error("please provide only one of key path, key or password")]
    AmbiguousCredential,

    #[error("no key or password provided")]
    MissingCredential,

    #[error("no PAT provided")]
    MissingToken,
}

impl ConfigError {
    /// Stable machine-readable code (used in JSON output)
    pub fn code(&self) -> &'static str {
        match self {
            Self::AmbiguousSelector => "AmbiguousSelector",
            Self::MissingSelector => "MissingSelector",
            Self::AmbiguousCredential => "AmbiguousCredential",
            Self::MissingCredential => "MissingCredential",
            Self::MissingToken => "MissingToken",
        }
    }
}

/// Target host set could not be determined
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("cloud query failed: {0}")]
    CloudQueryFailed(#[from] CloudError),

    #[error("no droplets found for {selector}")]
    NoHostsFound { selector: String },
}

impl InventoryError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::CloudQueryFailed(_) => "CloudQueryFailed",
            Self::NoHostsFound { .. } => "NoHostsFound",
        }
    }
}

/// Fatal error for a deploy run
#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// The remote transport could not be prepared (a required local tool is missing)
    #[error("transport setup failed: {0}")]
    Transport(String),
}

impl DeployError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.code(),
            Self::Inventory(e) => e.code(),
            Self::Transport(_) => "TransportSetup",
        }
    }
}
