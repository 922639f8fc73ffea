//! # relayhub-adapter-denkovi
//!
//! Integration for Denkovi relay boards (DAEnetIP and friends) driven
//! through their HTTP/JSON API.
//!
//! ## Wire protocol
//!
//! | Request | Meaning |
//! |---------|---------|
//! | `GET {resource}/current_state.json?pw={password}` | Full board state |
//! | `GET {resource}/current_state.json?pw={password}&Relay{N}={0\|1}` | Drive relay `N`, answer with the new state |
//!
//! Both answer `{"CurrentState":{"Output":[{"Value":0|1}, …]}}` where output
//! `N - 1` is relay `N`.
//!
//! ## Behaviour
//!
//! - One [`DeviceClient`] per board, shared by one [`RelaySwitch`] per
//!   configured relay.
//! - Full refreshes are throttled (5 minutes by default); commands never are.
//! - Device failures after setup only mark the affected switch unavailable.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `relayhub-app` and `relayhub-domain`.

pub mod client;
mod config;
mod error;
pub mod switch;
mod throttle;

pub use client::{ClientOptions, DeviceClient, SharedClient};
pub use config::{DenkoviConfig, RelayConfig, RelaySettings};
pub use error::{DeviceError, ProtocolError};
pub use switch::RelaySwitch;

use relayhub_app::ports::{DiscoveredDevice, Integration};
use relayhub_domain::device::Device;
use relayhub_domain::entity::Entity;
use relayhub_domain::error::{NotFoundError, RelayHubError, ValidationError};
use relayhub_domain::id::{DeviceId, EntityId};

/// Integration exposing the relays of one Denkovi board as switches.
pub struct DenkoviIntegration {
    config: DenkoviConfig,
    device_id: DeviceId,
    switches: Vec<RelaySwitch>,
}

impl DenkoviIntegration {
    /// Create the integration. Nothing is contacted until
    /// [`setup`](Integration::setup).
    #[must_use]
    pub fn new(config: DenkoviConfig) -> Self {
        Self {
            config,
            device_id: DeviceId::new(),
            switches: Vec::new(),
        }
    }

    /// Switches created by the last successful setup, ordered by relay index.
    #[must_use]
    pub fn switches(&self) -> &[RelaySwitch] {
        &self.switches
    }

    /// Check whether this integration owns the given entity.
    #[must_use]
    pub fn owns_entity(&self, entity_id: EntityId) -> bool {
        self.find(entity_id).is_some()
    }

    fn find(&self, entity_id: EntityId) -> Option<&RelaySwitch> {
        self.switches.iter().find(|s| s.entity_id() == entity_id)
    }

    fn device(&self, unique_id: &str) -> Result<Device, RelayHubError> {
        Device::builder()
            .id(self.device_id)
            .name(self.config.name.clone())
            .manufacturer("Denkovi")
            .integration(self.name())
            .unique_id(unique_id)
            .build()
    }
}

impl Integration for DenkoviIntegration {
    fn name(&self) -> &'static str {
        "denkovi"
    }

    async fn setup(&mut self) -> Result<Vec<DiscoveredDevice>, RelayHubError> {
        let relays = self.config.relays()?;

        let client = DeviceClient::connect(
            &self.config.resource,
            &self.config.password,
            self.config.client_options(),
        )
        .await
        .map_err(|err| {
            tracing::error!(resource = %self.config.resource, error = %err, "denkovi setup failed");
            err.into_domain()
        })?;
        let unique_id = client.base_url().to_string();
        let client = client.shared();

        let mut switches = Vec::with_capacity(relays.len());
        for relay in relays {
            let switch = RelaySwitch::attach(
                SharedClient::clone(&client),
                self.device_id,
                relay.name,
                relay.index,
                relay.polarity,
            )
            .await;
            switches.push(switch);
        }
        self.switches = switches;

        tracing::info!(
            resource = %unique_id,
            relays = self.switches.len(),
            "denkovi board ready"
        );

        let device = self.device(&unique_id)?;
        let entities = self
            .switches
            .iter()
            .map(RelaySwitch::entity)
            .collect::<Result<Vec<Entity>, _>>()?;
        Ok(vec![DiscoveredDevice { device, entities }])
    }

    async fn poll(&self) -> Result<Vec<Entity>, RelayHubError> {
        let mut entities = Vec::with_capacity(self.switches.len());
        for switch in &self.switches {
            switch.update().await;
            entities.push(switch.entity()?);
        }
        Ok(entities)
    }

    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        _data: serde_json::Value,
    ) -> Result<Entity, RelayHubError> {
        let switch = self.find(entity_id).ok_or_else(|| NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        })?;

        match service {
            "turn_on" => switch.turn_on().await,
            "turn_off" => switch.turn_off().await,
            "toggle" => switch.toggle().await,
            other => return Err(ValidationError::UnsupportedService(other.to_string()).into()),
        }
        switch.entity()
    }

    async fn teardown(&self) -> Result<(), RelayHubError> {
        tracing::info!(resource = %self.config.resource, "denkovi integration stopped");
        Ok(())
    }
}
