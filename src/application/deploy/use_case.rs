//! Deploy Use Case
//!
//! Orchestrates a deploy run:
//! 1. Validate the configuration (fail fast, no network)
//! 2. Resolve the target hosts from the cloud inventory (fail fast)
//! 3. Resolve the credential
//! 4. Run every host pipeline and aggregate the outcomes
//!
//! Steps 1-3 produce a [`DeployPlan`]; a dry run stops there.

use std::sync::Arc;

use tracing::info;

use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::domain::entities::Host;
use crate::domain::ports::{
    CloudInventory, DeployEvent, DeployEventSink, HostConnector, NoopEventSink,
};
use crate::domain::services::{CredentialProvider, DeployReport, InventoryResolver};
use crate::domain::value_objects::Credential;
use crate::error::{ConfigError, DeployResult};

use super::options::DeployOptions;
use super::orchestrator::SyncOrchestrator;

/// Everything decided before the first host is contacted
#[derive(Debug, Clone)]
pub struct DeployPlan {
    /// Human-readable selector, e.g. `tag 'web'`
    pub selector: String,
    pub hosts: Vec<Host>,
    /// Selected droplets skipped for lacking a public IPv4
    pub skipped_ids: Vec<u64>,
    pub credential: Credential,
}

/// Deploy use case - validation, inventory and pipelines
///
/// Parameterized by its ports so tests can run it against an in-memory
/// inventory and a recording connector.
pub struct DeployUseCase<'a, I, C>
where
    I: CloudInventory + ?Sized,
    C: HostConnector + ?Sized,
{
    inventory: &'a I,
    connector: &'a C,
    event_sink: Arc<dyn DeployEventSink>,
    cancel: CancellationToken,
}

impl<'a, I, C> DeployUseCase<'a, I, C>
where
    I: CloudInventory + ?Sized,
    C: HostConnector + ?Sized,
{
    pub fn new(inventory: &'a I, connector: &'a C) -> Self {
        Self {
            inventory,
            connector,
            event_sink: Arc::new(NoopEventSink),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn DeployEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Validate `config` in place and resolve the hosts and credential.
    pub fn plan(&self, config: &mut Config) -> DeployResult<DeployPlan> {
        config.validate()?;
        let selector = config.selector().ok_or(ConfigError::MissingSelector)?;

        let resolved = InventoryResolver::new(self.inventory).resolve(selector)?;
        let credential = CredentialProvider::resolve(config);

        info!(
            %selector,
            hosts = resolved.hosts.len(),
            skipped = resolved.skipped_ids.len(),
            "inventory resolved"
        );
        self.event_sink.on_event(DeployEvent::HostsResolved {
            selector: selector.to_string(),
            hosts: resolved.hosts.clone(),
            skipped_ids: resolved.skipped_ids.clone(),
        });

        Ok(DeployPlan {
            selector: selector.to_string(),
            hosts: resolved.hosts,
            skipped_ids: resolved.skipped_ids,
            credential,
        })
    }

    /// Run the pipelines of a plan produced from the same `config`.
    pub fn run(&self, plan: &DeployPlan, config: &Config, options: &DeployOptions) -> DeployReport {
        SyncOrchestrator::new(self.connector)
            .with_event_sink(self.event_sink.clone())
            .with_cancellation(self.cancel.clone())
            .with_concurrency(options.concurrency)
            .run(&plan.hosts, &plan.credential, config)
    }

    /// Plan and run in one go.
    pub fn execute(&self, config: &mut Config, options: &DeployOptions) -> DeployResult<DeployReport> {
        let plan = self.plan(config)?;
        Ok(self.run(&plan, config, options))
    }
}
