//! Deploy Options
//!
//! Run-level knobs that are not part of the deployment configuration itself.

/// Options for a deploy run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Maximum number of host pipelines running at once (0 = one per host)
    pub concurrency: usize,
}

impl DeployOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}
