//! Entity service: latest snapshots of the devices and entities reported
//! by integrations.
//!
//! Snapshots live in memory only; they are rebuilt from the integrations on
//! every start.

use std::collections::HashMap;

use tokio::sync::RwLock;

use relayhub_domain::device::Device;
use relayhub_domain::entity::Entity;
use relayhub_domain::error::{NotFoundError, RelayHubError};
use relayhub_domain::id::{DeviceId, EntityId};

use crate::ports::DiscoveredDevice;

/// In-memory registry of device and entity snapshots.
#[derive(Default)]
pub struct EntityService {
    devices: RwLock<HashMap<DeviceId, Device>>,
    entities: RwLock<HashMap<EntityId, Entity>>,
}

impl EntityService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a device discovered during setup together with its entities.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::Validation`] if the device or one of its
    /// entities violates domain invariants. Nothing is recorded in that case.
    pub async fn register(&self, discovered: DiscoveredDevice) -> Result<(), RelayHubError> {
        discovered.device.validate()?;
        for entity in &discovered.entities {
            entity.validate()?;
        }

        self.devices
            .write()
            .await
            .insert(discovered.device.id, discovered.device);
        let mut entities = self.entities.write().await;
        for entity in discovered.entities {
            entities.insert(entity.id, entity);
        }
        Ok(())
    }

    /// Store a fresh snapshot of an entity.
    ///
    /// When the entity is already known, its state history is preserved:
    /// `last_changed` only moves if the state differs from the stored one.
    /// A snapshot older than the stored one is dropped and the stored entity
    /// is returned, so a slow poll cannot undo a newer command result.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::Validation`] if invariants fail.
    pub async fn upsert_entity(&self, entity: Entity) -> Result<Entity, RelayHubError> {
        entity.validate()?;
        let mut entities = self.entities.write().await;
        let stored = match entities.remove(&entity.id) {
            Some(existing) if entity.last_updated < existing.last_updated => {
                tracing::debug!(
                    entity_id = %existing.entity_id,
                    stale = %entity.last_updated,
                    stored = %existing.last_updated,
                    "dropping stale snapshot"
                );
                existing
            }
            Some(mut existing) => {
                existing.update_state(entity.state, entity.last_updated);
                existing.friendly_name = entity.friendly_name;
                existing.attributes = entity.attributes;
                existing
            }
            None => entity,
        };
        entities.insert(stored.id, stored.clone());
        Ok(stored)
    }

    /// Look up an entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::NotFound`] when no entity with `id` exists.
    pub async fn get_entity(&self, id: EntityId) -> Result<Entity, RelayHubError> {
        self.entities.read().await.get(&id).cloned().ok_or_else(|| {
            NotFoundError {
                entity: "Entity",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all entities, ordered by their `entity_id` slug.
    pub async fn list_entities(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self.entities.read().await.values().cloned().collect();
        entities.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        entities
    }

    /// List all devices, ordered by name.
    pub async fn list_devices(&self) -> Vec<Device> {
        let mut devices: Vec<Device> = self.devices.read().await.values().cloned().collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        devices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use relayhub_domain::entity::EntityState;

    fn discovered(names: &[&str]) -> DiscoveredDevice {
        let device = Device::builder()
            .name("Board")
            .integration("test")
            .build()
            .unwrap();
        let entities = names
            .iter()
            .map(|name| {
                Entity::builder()
                    .device_id(device.id)
                    .entity_id(format!("switch.{name}"))
                    .friendly_name(*name)
                    .build()
                    .unwrap()
            })
            .collect();
        DiscoveredDevice { device, entities }
    }

    #[tokio::test]
    async fn should_list_registered_entities_sorted() {
        let service = EntityService::new();
        service.register(discovered(&["pump", "fan"])).await.unwrap();

        let ids: Vec<String> = service
            .list_entities()
            .await
            .into_iter()
            .map(|e| e.entity_id)
            .collect();
        assert_eq!(ids, vec!["switch.fan", "switch.pump"]);
        assert_eq!(service.list_devices().await.len(), 1);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_entity() {
        let service = EntityService::new();
        let result = service.get_entity(EntityId::new()).await;
        assert!(matches!(result, Err(RelayHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_preserve_last_changed_when_state_is_unchanged() {
        let service = EntityService::new();
        let dd = discovered(&["pump"]);
        let mut snapshot = dd.entities[0].clone();
        service.register(dd).await.unwrap();

        snapshot.state = EntityState::On;
        snapshot.last_updated += Duration::seconds(10);
        let first = service.upsert_entity(snapshot.clone()).await.unwrap();
        assert_eq!(first.state, EntityState::On);
        assert_eq!(first.last_changed, snapshot.last_updated);

        snapshot.last_updated += Duration::seconds(10);
        let second = service.upsert_entity(snapshot.clone()).await.unwrap();
        assert_eq!(second.last_changed, first.last_changed);
        assert_eq!(second.last_updated, snapshot.last_updated);
    }

    #[tokio::test]
    async fn should_keep_newer_state_when_older_snapshot_arrives_late() {
        let service = EntityService::new();
        let dd = discovered(&["pump"]);
        let polled = dd.entities[0].clone();
        service.register(dd).await.unwrap();

        let mut commanded = polled.clone();
        commanded.state = EntityState::On;
        commanded.last_updated += Duration::seconds(1);
        service.upsert_entity(commanded.clone()).await.unwrap();

        let mut stale = polled;
        stale.state = EntityState::Off;
        let stored = service.upsert_entity(stale).await.unwrap();

        assert_eq!(stored.state, EntityState::On);
        assert_eq!(stored.last_updated, commanded.last_updated);
        assert_eq!(
            service.get_entity(commanded.id).await.unwrap().state,
            EntityState::On
        );
    }

    #[tokio::test]
    async fn should_insert_unknown_entity_on_upsert() {
        let service = EntityService::new();
        let entity = discovered(&["fan"]).entities.remove(0);
        service.upsert_entity(entity.clone()).await.unwrap();
        assert_eq!(service.get_entity(entity.id).await.unwrap().entity_id, "switch.fan");
    }
}
