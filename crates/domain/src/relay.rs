//! Relay wire semantics: channel addressing, wire levels and inversion.
//!
//! A relay board reports and accepts each output as a `0`/`1` wire level.
//! Active-low relays are configured as [`Polarity::Inverted`]: their
//! physical "on" corresponds to wire level `0`.

use std::fmt;
use std::num::NonZeroU16;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::EntityState;
use crate::error::ValidationError;

/// 1-based address of a relay channel on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayIndex(NonZeroU16);

impl RelayIndex {
    /// Create an index, returning `None` for `0`.
    #[must_use]
    pub fn new(index: u16) -> Option<Self> {
        NonZeroU16::new(index).map(Self)
    }

    #[must_use]
    pub fn get(self) -> u16 {
        self.0.get()
    }

    /// Zero-based position of this relay in the board's output array.
    #[must_use]
    pub fn position(self) -> usize {
        usize::from(self.0.get() - 1)
    }
}

impl fmt::Display for RelayIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RelayIndex {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<NonZeroU16>()
            .map(Self)
            .map_err(|_| ValidationError::InvalidRelayIndex(s.to_string()))
    }
}

/// Output level of a relay as seen on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireLevel {
    Low,
    High,
}

impl WireLevel {
    /// The `0`/`1` value used in requests and responses.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }

    /// Interpret a raw value reported by the board.
    ///
    /// Only `0` and `1` are meaningful; anything else yields `None`.
    #[must_use]
    pub fn from_raw(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Low),
            1 => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for WireLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Mapping between the logical on/off state and the wire level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// Wire level `1` energises the relay.
    #[default]
    Normal,
    /// Active-low: wire level `0` energises the relay.
    Inverted,
}

impl Polarity {
    #[must_use]
    pub fn from_invert(invert: bool) -> Self {
        if invert { Self::Inverted } else { Self::Normal }
    }

    #[must_use]
    pub fn is_inverted(self) -> bool {
        matches!(self, Self::Inverted)
    }

    /// Wire level to send in order to switch the relay `on` or off.
    #[must_use]
    pub fn payload(self, on: bool) -> WireLevel {
        match (self, on) {
            (Self::Normal, true) | (Self::Inverted, false) => WireLevel::High,
            (Self::Normal, false) | (Self::Inverted, true) => WireLevel::Low,
        }
    }

    /// Whether a reported wire level means the relay is on.
    #[must_use]
    pub fn is_on(self, level: WireLevel) -> bool {
        level != self.payload(false)
    }
}

/// Last known condition of a relay channel.
///
/// `is_on` stays `None` until the first successful read. A failure only
/// clears `available`; the last known `is_on` is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayStatus {
    pub is_on: Option<bool>,
    pub available: bool,
}

impl Default for RelayStatus {
    fn default() -> Self {
        Self {
            is_on: None,
            available: true,
        }
    }
}

impl RelayStatus {
    /// Record a successful read.
    pub fn record(&mut self, is_on: bool) {
        self.is_on = Some(is_on);
        self.available = true;
    }

    /// Record a failed read or command.
    pub fn mark_unavailable(&mut self) {
        self.available = false;
    }

    /// Project onto the generic entity state.
    #[must_use]
    pub fn entity_state(self) -> EntityState {
        match (self.available, self.is_on) {
            (false, _) => EntityState::Unavailable,
            (true, Some(true)) => EntityState::On,
            (true, Some(false)) => EntityState::Off,
            (true, None) => EntityState::Unknown,
        }
    }
}
