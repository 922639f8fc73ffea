//! Application services: use-case implementations.

pub mod entity_service;
pub mod integration_service;
