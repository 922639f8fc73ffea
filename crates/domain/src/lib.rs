//! # relayhub-domain
//!
//! Pure domain model for the relayhub relay-board bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Entities** (state holders with identity: one per relay channel)
//! - Define **Devices** (the physical boards that expose one or more entities)
//! - Define the **relay wire semantics**: 1-based indexes, wire levels and
//!   active-low inversion
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod entity;
pub mod relay;
