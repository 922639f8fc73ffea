//! Shared application state for axum handlers.

use relayhub_app::ports::Integration;
use relayhub_app::services::integration_service::IntegrationService;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the integration itself does not need
/// to be `Clone`; only the `Arc` wrappers inside the service are cloned.
pub struct AppState<I> {
    /// Routes service calls to the integration and holds the snapshots.
    pub service: IntegrationService<I>,
}

impl<I> Clone for AppState<I> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<I> AppState<I>
where
    I: Integration + Send + Sync + 'static,
{
    pub fn new(service: IntegrationService<I>) -> Self {
        Self { service }
    }
}
