//! Integration port: lifecycle, polling and service-call handling for
//! device integrations.
//!
//! An integration bridges an external protocol (a relay board's HTTP API,
//! …) into relayhub. It discovers devices/entities on setup, refreshes them
//! when the host polls, and handles service calls directed at entities it
//! owns.

use std::future::Future;

use relayhub_domain::device::Device;
use relayhub_domain::entity::Entity;
use relayhub_domain::error::RelayHubError;
use relayhub_domain::id::EntityId;

/// A pluggable device integration.
///
/// The binary crate calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): connect and return everything discovered
/// 2. [`poll`](Self::poll): called periodically by the host
/// 3. [`handle_service_call`](Self::handle_service_call): on user command
/// 4. [`teardown`](Self::teardown): on shutdown
///
/// The integration never runs its own timers.
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"denkovi"`).
    fn name(&self) -> &'static str;

    /// Initialise and return discovered devices with their entities.
    ///
    /// An error here is a hard setup failure: the host must not use the
    /// integration afterwards.
    fn setup(&mut self) -> impl Future<Output = Result<Vec<DiscoveredDevice>, RelayHubError>> + Send;

    /// Refresh every owned entity and return the new snapshots.
    ///
    /// Device failures are expected to be reported through the entity state
    /// (e.g. `Unavailable`) rather than as an error. The default
    /// implementation reports nothing.
    fn poll(&self) -> impl Future<Output = Result<Vec<Entity>, RelayHubError>> + Send {
        async { Ok(Vec::new()) }
    }

    /// Handle a service call (e.g. `turn_on`, `turn_off`, `toggle`) for an
    /// entity owned by this integration.
    ///
    /// Returns the new [`Entity`] state after handling the call.
    fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, RelayHubError>> + Send;

    /// Called on graceful shutdown.
    fn teardown(&self) -> impl Future<Output = Result<(), RelayHubError>> + Send;
}

/// A device and its associated entities discovered during integration setup.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub device: Device,
    pub entities: Vec<Entity>,
}
