//! Integration service: routes polls and service calls to an
//! [`Integration`] and records the resulting snapshots.

use std::sync::Arc;

use relayhub_domain::entity::Entity;
use relayhub_domain::error::RelayHubError;
use relayhub_domain::id::EntityId;

use crate::ports::Integration;
use crate::services::entity_service::EntityService;

/// Glue between a running integration and the entity snapshots.
///
/// Wraps `Arc`-ed parts so it is cheaply cloneable between the HTTP
/// handlers and the poll loop.
pub struct IntegrationService<I> {
    integration: Arc<I>,
    entities: Arc<EntityService>,
}

impl<I> Clone for IntegrationService<I> {
    fn clone(&self) -> Self {
        Self {
            integration: Arc::clone(&self.integration),
            entities: Arc::clone(&self.entities),
        }
    }
}

impl<I> IntegrationService<I>
where
    I: Integration + Send + Sync + 'static,
{
    /// Wrap an integration whose [`setup`](Integration::setup) already ran.
    pub fn new(integration: Arc<I>, entities: Arc<EntityService>) -> Self {
        Self {
            integration,
            entities,
        }
    }

    #[must_use]
    pub fn integration(&self) -> &I {
        &self.integration
    }

    /// Access the snapshot registry.
    #[must_use]
    pub fn entities(&self) -> &EntityService {
        &self.entities
    }

    /// Poll the integration once and store every returned snapshot.
    ///
    /// Returns the number of entities refreshed.
    ///
    /// # Errors
    ///
    /// Propagates an error returned by the integration or a validation
    /// error for an invalid snapshot.
    pub async fn poll_once(&self) -> Result<usize, RelayHubError> {
        let snapshots = self.integration.poll().await?;
        let count = snapshots.len();
        for entity in snapshots {
            self.entities.upsert_entity(entity).await?;
        }
        Ok(count)
    }

    /// Forward a service call to the integration and store the result.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::NotFound`] if the entity is not known, or
    /// whatever the integration reports for the call.
    pub async fn call_service(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, RelayHubError> {
        self.entities.get_entity(entity_id).await?;
        tracing::debug!(
            integration = self.integration.name(),
            %entity_id,
            service,
            "dispatching service call"
        );
        let entity = self
            .integration
            .handle_service_call(entity_id, service, data)
            .await?;
        self.entities.upsert_entity(entity).await
    }

    /// Tear the integration down.
    ///
    /// # Errors
    ///
    /// Propagates the integration's teardown error.
    pub async fn teardown(&self) -> Result<(), RelayHubError> {
        self.integration.teardown().await
    }
}
