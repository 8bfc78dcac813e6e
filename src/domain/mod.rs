//! Domain Layer
//!
//! The deploy core: which hosts to target and what a per-host outcome is,
//! without any network or process I/O.
//!
//! ## Structure
//!
//! - `entities/` - `Host`, `Outcome` and the pipeline stage machine
//! - `value_objects/` - `Credential`
//! - `services/` - `InventoryResolver`, `CredentialProvider`, `ResultAggregator`
//! - `ports/` - Interfaces for the cloud inventory, remote sessions and events
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the network or spawns processes
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
