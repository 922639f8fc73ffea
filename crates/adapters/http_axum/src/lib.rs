//! # relayhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a small JSON API over the entities reported by the running
//!   integration (`/api/entities`, `/api/devices`)
//! - Map `POST /api/entities/{id}/services/{service}` into
//!   [`IntegrationService::call_service`](relayhub_app::services::integration_service::IntegrationService::call_service)
//! - Map [`RelayHubError`](relayhub_domain::error::RelayHubError) into
//!   HTTP status codes
//!
//! ## Dependency rule
//! Depends on `relayhub-app` (for the port trait and services) and
//! `relayhub-domain` (for the types serialized in responses). Never leaks
//! axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
