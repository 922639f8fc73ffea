//! Relay switch: one switch entity per configured relay channel.
//!
//! A switch never surfaces device errors to its caller: a failed refresh or
//! command is logged and marks the switch unavailable, keeping the last known
//! on/off state until a later call succeeds.

use std::sync::{Mutex, MutexGuard, PoisonError};

use relayhub_domain::entity::{AttributeValue, Entity, slugify};
use relayhub_domain::error::RelayHubError;
use relayhub_domain::id::{DeviceId, EntityId};
use relayhub_domain::relay::{Polarity, RelayIndex, RelayStatus, WireLevel};

use crate::client::SharedClient;
use crate::error::DeviceError;

/// A single relay channel exposed as a switch.
pub struct RelaySwitch {
    client: SharedClient,
    device_id: DeviceId,
    entity_id: EntityId,
    name: String,
    index: RelayIndex,
    polarity: Polarity,
    status: Mutex<RelayStatus>,
}

impl RelaySwitch {
    /// Bind a relay to the shared board client and seed its state.
    ///
    /// The seeding [`update`](Self::update) is subject to the client's
    /// refresh throttle, so right after the client connected it reads the
    /// initial response without another request.
    pub async fn attach(
        client: SharedClient,
        device_id: DeviceId,
        name: impl Into<String>,
        index: RelayIndex,
        polarity: Polarity,
    ) -> Self {
        let switch = Self {
            client,
            device_id,
            entity_id: EntityId::new(),
            name: name.into(),
            index,
            polarity,
            status: Mutex::new(RelayStatus::default()),
        };
        switch.update().await;
        switch
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn index(&self) -> RelayIndex {
        self.index
    }

    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Last known state; `None` until the first successful read.
    #[must_use]
    pub fn is_on(&self) -> Option<bool> {
        self.lock_status().is_on
    }

    /// Whether the last refresh or command succeeded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.lock_status().available
    }

    pub async fn turn_on(&self) {
        self.switch_to(true).await;
    }

    pub async fn turn_off(&self) {
        self.switch_to(false).await;
    }

    /// Turn off when known to be on, turn on otherwise.
    pub async fn toggle(&self) {
        let on = self.is_on() == Some(true);
        self.switch_to(!on).await;
    }

    /// Refresh the board (throttled) and re-read this relay.
    pub async fn update(&self) {
        let result = {
            let mut client = self.client.lock().await;
            match client.refresh().await {
                Ok(()) => client.read_relay_state(self.index).map_err(DeviceError::from),
                Err(err) => Err(err),
            }
        };

        match result {
            Ok(level) => self.record(level),
            Err(err) => {
                tracing::error!(relay = %self.index, error = %err, "error updating relay state");
                self.lock_status_mut().mark_unavailable();
            }
        }
    }

    /// Produce the [`Entity`] snapshot for the current state.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the builder fails.
    pub fn entity(&self) -> Result<Entity, RelayHubError> {
        Entity::builder()
            .id(self.entity_id)
            .device_id(self.device_id)
            .entity_id(self.slug())
            .friendly_name(self.name.clone())
            .state(self.lock_status().entity_state())
            .attribute("relay", AttributeValue::Int(i64::from(self.index.get())))
            .attribute("invert", AttributeValue::Bool(self.polarity.is_inverted()))
            .build()
    }

    fn slug(&self) -> String {
        let slug = slugify(&self.name);
        if slug.is_empty() {
            format!("switch.relay_{}", self.index)
        } else {
            format!("switch.{slug}")
        }
    }

    async fn switch_to(&self, on: bool) {
        let payload = self.polarity.payload(on);
        let result = {
            let mut client = self.client.lock().await;
            match client.set_relay(self.index, payload).await {
                Ok(()) => client.read_relay_state(self.index).map_err(DeviceError::from),
                Err(err) => Err(err),
            }
        };

        match result {
            Ok(level) => {
                self.record(level);
                tracing::info!(
                    name = %self.name,
                    relay = %self.index,
                    "turning {}",
                    if on { "on" } else { "off" }
                );
            }
            Err(err) => {
                tracing::error!(relay = %self.index, error = %err, "error turning relay on or off");
                self.lock_status_mut().mark_unavailable();
            }
        }
    }

    fn record(&self, level: WireLevel) {
        let is_on = self.polarity.is_on(level);
        self.lock_status_mut().record(is_on);
    }

    fn lock_status(&self) -> RelayStatus {
        *self.lock_status_mut()
    }

    fn lock_status_mut(&self) -> MutexGuard<'_, RelayStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
