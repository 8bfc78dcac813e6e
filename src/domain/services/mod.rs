//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies of their own and are easily testable.

mod credential_provider;
mod inventory_resolver;
mod result_aggregator;

pub use credential_provider::CredentialProvider;
pub use inventory_resolver::{InventoryResolver, ResolvedInventory};
pub use result_aggregator::{DeployReport, ResultAggregator};
