//! Denkovi adapter error types.

use relayhub_domain::error::RelayHubError;
use relayhub_domain::relay::RelayIndex;

/// Failure talking to a relay board.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The board could not be reached (refused, unroutable, timed out, …).
    #[error("no route to device {url}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The board answered, or would have been asked, in a way we cannot use.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Details about why a request or response is unusable.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("missing resource or schema in configuration, add http:// to {0:?}")]
    MissingScheme(String),

    #[error("unsupported URL scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    /// The HTTP request could not be built.
    #[error("failed to build request")]
    Request(#[source] reqwest::Error),

    /// Nothing has been fetched from the board yet.
    #[error("no response received from device")]
    NoResponse,

    #[error("unexpected HTTP response code: {0}")]
    UnexpectedStatus(u16),

    /// The body is not JSON at all.
    #[error("unexpected body, not JSON")]
    InvalidJson(#[source] serde_json::Error),

    /// The body is JSON but lacks `CurrentState.Output[].Value`.
    #[error("unexpected JSON shape")]
    UnexpectedShape(#[source] serde_json::Error),

    #[error("relay {index} not reported, device has {available} outputs")]
    RelayOutOfRange { index: RelayIndex, available: usize },

    #[error("relay {index} reported unexpected value {value:?}")]
    UnexpectedValue { index: RelayIndex, value: String },
}

impl DeviceError {
    /// Whether this is a transport-level failure.
    #[must_use]
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }

    /// Convert into a [`RelayHubError::Integration`] for propagation across
    /// port boundaries.
    #[must_use]
    pub fn into_domain(self) -> RelayHubError {
        RelayHubError::Integration(Box::new(self))
    }
}

impl From<DeviceError> for RelayHubError {
    fn from(err: DeviceError) -> Self {
        err.into_domain()
    }
}
