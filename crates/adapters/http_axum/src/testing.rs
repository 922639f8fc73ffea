//! In-memory integration used by the handler tests.

use std::sync::{Arc, Mutex};

use relayhub_app::ports::{DiscoveredDevice, Integration};
use relayhub_app::services::entity_service::EntityService;
use relayhub_app::services::integration_service::IntegrationService;
use relayhub_domain::device::Device;
use relayhub_domain::entity::{Entity, EntityState};
use relayhub_domain::error::{RelayHubError, ValidationError};
use relayhub_domain::id::EntityId;

use crate::state::AppState;

pub(crate) struct StubIntegration {
    entity: Mutex<Entity>,
}

impl Integration for StubIntegration {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn setup(&mut self) -> Result<Vec<DiscoveredDevice>, RelayHubError> {
        let device = Device::builder()
            .name("Stub board")
            .integration("stub")
            .build()?;
        let mut entity = self.entity.lock().unwrap();
        entity.device_id = device.id;
        Ok(vec![DiscoveredDevice {
            device,
            entities: vec![entity.clone()],
        }])
    }

    async fn handle_service_call(
        &self,
        _entity_id: EntityId,
        service: &str,
        _data: serde_json::Value,
    ) -> Result<Entity, RelayHubError> {
        let state = match service {
            "turn_on" => EntityState::On,
            "turn_off" => EntityState::Off,
            "fail" => return Err(RelayHubError::Integration("board offline".into())),
            other => return Err(ValidationError::UnsupportedService(other.to_string()).into()),
        };
        let mut entity = self.entity.lock().unwrap();
        entity.state = state;
        Ok(entity.clone())
    }

    async fn teardown(&self) -> Result<(), RelayHubError> {
        Ok(())
    }
}

/// State holding one registered `switch.stub` entity, initially off.
pub(crate) async fn test_state() -> (AppState<StubIntegration>, EntityId) {
    let entity = Entity::builder()
        .entity_id("switch.stub")
        .friendly_name("Stub")
        .state(EntityState::Off)
        .build()
        .unwrap();
    let id = entity.id;
    let mut integration = StubIntegration {
        entity: Mutex::new(entity),
    };
    let entities = Arc::new(EntityService::new());
    for discovered in integration.setup().await.unwrap() {
        entities.register(discovered).await.unwrap();
    }
    let service = IntegrationService::new(Arc::new(integration), entities);
    (AppState::new(service), id)
}
