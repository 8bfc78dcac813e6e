//! Result aggregation service
//!
//! Reduces per-host outcomes into one verdict. A run succeeds only when
//! every targeted host completed every stage.

use std::collections::HashMap;

use crate::domain::entities::{Host, Outcome};

/// Aggregate result of a deploy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    /// One outcome per host, in host-resolution order
    pub outcomes: Vec<Outcome>,
    pub overall_succeeded: bool,
}

impl DeployReport {
    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }

    /// Failed outcomes, in host order
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

pub struct ResultAggregator;

impl ResultAggregator {
    /// Build the report, ordering outcomes by the position of their host in
    /// `hosts` regardless of the order pipelines finished in.
    ///
    /// Outcomes for hosts not in `hosts` are kept, after the known ones.
    pub fn aggregate(hosts: &[Host], mut outcomes: Vec<Outcome>) -> DeployReport {
        let position: HashMap<u64, usize> = hosts
            .iter()
            .enumerate()
            .map(|(index, host)| (host.id(), index))
            .collect();
        outcomes.sort_by_key(|o| position.get(&o.host().id()).copied().unwrap_or(usize::MAX));

        // An empty run is never a success.
        let overall_succeeded = !outcomes.is_empty() && outcomes.iter().all(Outcome::is_success);

        DeployReport {
            outcomes,
            overall_succeeded,
        }
    }
}
