//! # relayhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the [`Integration`](ports::Integration) port that device
//!   adapters implement (setup, poll, service calls, teardown)
//! - Keep the latest entity/device snapshots reported by integrations
//!   ([`EntityService`](services::entity_service::EntityService))
//! - Route service calls and periodic polls to the owning integration
//!   ([`IntegrationService`](services::integration_service::IntegrationService))
//! - Drive the periodic refresh loop ([`poller`])
//!
//! ## Dependency rule
//! Depends on `relayhub-domain` only (plus `tokio` for locks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod poller;
pub mod ports;
pub mod services;
