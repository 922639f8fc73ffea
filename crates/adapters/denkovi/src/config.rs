//! Denkovi integration configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use relayhub_domain::error::ValidationError;
use relayhub_domain::relay::{Polarity, RelayIndex};

use crate::client::ClientOptions;

/// Configuration for one Denkovi relay board.
#[derive(Debug, Clone, Deserialize)]
pub struct DenkoviConfig {
    /// Base URL of the board, scheme included (e.g. `http://192.168.1.5`).
    pub resource: String,
    /// Password sent as the `pw` query parameter.
    pub password: String,
    /// Display name of the board.
    #[serde(default = "default_name")]
    pub name: String,
    /// Relays to expose, keyed by their 1-based index (`"1"`, `"2"`, …).
    #[serde(default)]
    pub relays: BTreeMap<String, RelayConfig>,
    /// Minimum time between two full refreshes, in seconds.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_refresh_timeout_secs")]
    pub refresh_timeout_secs: u64,
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

/// Per-relay settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub name: Option<String>,
    /// Active-low relay: wire level `0` means on.
    pub invert: bool,
}

/// A validated relay entry, ready to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub index: RelayIndex,
    pub name: String,
    pub polarity: Polarity,
}

fn default_name() -> String {
    "Denkovi switch".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    300
}

fn default_refresh_timeout_secs() -> u64 {
    30
}

fn default_command_timeout_secs() -> u64 {
    20
}

impl DenkoviConfig {
    /// Configuration with defaults and no relays.
    pub fn new(resource: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            password: password.into(),
            name: default_name(),
            relays: BTreeMap::new(),
            refresh_interval_secs: default_refresh_interval_secs(),
            refresh_timeout_secs: default_refresh_timeout_secs(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }

    #[must_use]
    pub fn with_relay(mut self, index: impl Into<String>, relay: RelayConfig) -> Self {
        self.relays.insert(index.into(), relay);
        self
    }

    /// Validate relay keys and return the relays ordered by index.
    ///
    /// A relay without a name is called `"{board name} {index}"`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRelayIndex`] for a key that is not a
    /// positive integer, and [`ValidationError::EmptyName`] when the board name
    /// is empty.
    pub fn relays(&self) -> Result<Vec<RelaySettings>, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let mut relays = self
            .relays
            .iter()
            .map(|(key, relay)| -> Result<RelaySettings, ValidationError> {
                let index: RelayIndex = key.parse()?;
                let name = relay
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map_or_else(|| format!("{} {index}", self.name), str::to_string);
                Ok(RelaySettings {
                    index,
                    name,
                    polarity: Polarity::from_invert(relay.invert),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        relays.sort_by_key(|relay| relay.index);
        Ok(relays)
    }

    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            refresh_interval: Duration::from_secs(self.refresh_interval_secs),
            refresh_timeout: Duration::from_secs(self.refresh_timeout_secs),
            command_timeout: Duration::from_secs(self.command_timeout_secs),
        }
    }
}
