//! HTTP client for the board's `current_state.json` endpoint.
//!
//! Every request, refresh or command, returns the full board state. The
//! client keeps the last response it got, whichever request produced it,
//! and relay states are read back from that cached response.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::Mutex;

use relayhub_domain::relay::{RelayIndex, WireLevel};

use crate::error::{DeviceError, ProtocolError};
use crate::throttle::Throttle;

/// A [`DeviceClient`] shared by every relay of the same board.
///
/// The lock is held for a whole command-then-read sequence so that a relay
/// always reads the response to its own request.
pub type SharedClient = Arc<Mutex<DeviceClient>>;

const STATUS_PATH: &str = "current_state.json";

/// Timing knobs for a [`DeviceClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Minimum time between two real refresh calls.
    pub refresh_interval: Duration,
    pub refresh_timeout: Duration,
    pub command_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5 * 60),
            refresh_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(20),
        }
    }
}

/// Raw result of the most recent request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CachedResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

#[derive(Deserialize)]
struct StatusDocument {
    #[serde(rename = "CurrentState")]
    current_state: CurrentState,
}

#[derive(Deserialize)]
struct CurrentState {
    #[serde(rename = "Output")]
    outputs: Vec<Output>,
}

#[derive(Deserialize)]
struct Output {
    #[serde(rename = "Value")]
    value: RawValue,
}

/// Boards report values either as numbers or as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(i64),
    Text(String),
}

impl RawValue {
    fn level(&self) -> Option<WireLevel> {
        match self {
            Self::Number(value) => WireLevel::from_raw(*value),
            Self::Text(text) => text.trim().parse().ok().and_then(WireLevel::from_raw),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

/// Client for one relay board.
pub struct DeviceClient {
    base_url: String,
    password: String,
    http: Client,
    options: ClientOptions,
    throttle: Throttle,
    last_response: Option<CachedResponse>,
}

impl DeviceClient {
    /// Build a client without contacting the board.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingScheme`] or
    /// [`ProtocolError::UnsupportedScheme`] when `resource` is not an
    /// `http(s)://` URL.
    pub fn new(resource: &str, password: &str, options: ClientOptions) -> Result<Self, DeviceError> {
        let base_url = normalize_base_url(resource)?;
        let http = Client::builder().build().map_err(ProtocolError::Request)?;

        Ok(Self {
            base_url,
            password: password.to_string(),
            http,
            options,
            throttle: Throttle::new(options.refresh_interval),
            last_response: None,
        })
    }

    /// Build a client and perform the initial refresh.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Connect`] if the board cannot be reached and
    /// [`DeviceError::Protocol`] for a malformed resource URL or a non-200
    /// answer.
    pub async fn connect(
        resource: &str,
        password: &str,
        options: ClientOptions,
    ) -> Result<Self, DeviceError> {
        let mut client = Self::new(resource, password, options)?;
        client.refresh().await?;
        Ok(client)
    }

    /// Wrap into a [`SharedClient`].
    #[must_use]
    pub fn shared(self) -> SharedClient {
        Arc::new(Mutex::new(self))
    }

    /// Base URL of the board, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[cfg(test)]
    fn last_response(&self) -> Option<&CachedResponse> {
        self.last_response.as_ref()
    }

    /// Fetch the full board state, at most once per refresh interval.
    ///
    /// Calls within the interval return `Ok(())` without any request and
    /// leave the cached response untouched. Only a successful fetch starts a
    /// new interval.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Connect`] on transport failure (including
    /// timeout) and [`ProtocolError::UnexpectedStatus`] for a non-200 answer.
    /// A non-200 answer is still cached.
    pub async fn refresh(&mut self) -> Result<(), DeviceError> {
        if !self.throttle.is_ready(Instant::now()) {
            tracing::trace!(resource = %self.base_url, "refresh throttled");
            return Ok(());
        }

        tracing::info!(resource = %self.base_url, "updating relay board");
        let response = self.fetch(None, self.options.refresh_timeout).await?;
        let status = response.status;
        self.last_response = Some(response);

        if status != StatusCode::OK.as_u16() {
            return Err(ProtocolError::UnexpectedStatus(status).into());
        }
        self.throttle.mark(Instant::now());
        Ok(())
    }

    /// Drive one relay output to `level`. Never throttled.
    ///
    /// The answer, whatever its status, replaces the cached response.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Connect`] on transport failure (including
    /// timeout).
    pub async fn set_relay(&mut self, index: RelayIndex, level: WireLevel) -> Result<(), DeviceError> {
        tracing::debug!(resource = %self.base_url, relay = %index, %level, "sending relay command");
        let response = self
            .fetch(Some((index, level)), self.options.command_timeout)
            .await?;
        self.last_response = Some(response);
        Ok(())
    }

    /// Read the level of one relay from the cached response.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] if nothing is cached, the cached status is
    /// not 200, the body is not the expected JSON, or the relay is missing.
    pub fn read_relay_state(&self, index: RelayIndex) -> Result<WireLevel, ProtocolError> {
        let response = self.last_response.as_ref().ok_or(ProtocolError::NoResponse)?;
        parse_relay_level(response, index)
    }

    async fn fetch(
        &self,
        command: Option<(RelayIndex, WireLevel)>,
        timeout: Duration,
    ) -> Result<CachedResponse, DeviceError> {
        let url = format!("{}/{STATUS_PATH}", self.base_url);
        let mut request = self
            .http
            .get(&url)
            .query(&[("pw", self.password.as_str())])
            .timeout(timeout);
        if let Some((index, level)) = command {
            request = request.query(&[(format!("Relay{index}"), level.as_u8())]);
        }

        let response = request.send().await.map_err(|err| self.transport_error(err))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(err))?;
        Ok(CachedResponse { status, body })
    }

    fn transport_error(&self, err: reqwest::Error) -> DeviceError {
        if err.is_builder() {
            return ProtocolError::Request(err).into();
        }
        DeviceError::Connect {
            url: self.base_url.clone(),
            source: err,
        }
    }
}

fn normalize_base_url(resource: &str) -> Result<String, ProtocolError> {
    let trimmed = resource.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|_| ProtocolError::MissingScheme(resource.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ProtocolError::UnsupportedScheme(other.to_string())),
    }
}

fn parse_relay_level(response: &CachedResponse, index: RelayIndex) -> Result<WireLevel, ProtocolError> {
    if response.status != StatusCode::OK.as_u16() {
        return Err(ProtocolError::UnexpectedStatus(response.status));
    }

    let json: serde_json::Value =
        serde_json::from_str(&response.body).map_err(ProtocolError::InvalidJson)?;
    let document: StatusDocument =
        serde_json::from_value(json).map_err(ProtocolError::UnexpectedShape)?;

    let outputs = &document.current_state.outputs;
    let output = outputs
        .get(index.position())
        .ok_or(ProtocolError::RelayOutOfRange {
            index,
            available: outputs.len(),
        })?;

    output.value.level().ok_or_else(|| ProtocolError::UnexpectedValue {
        index,
        value: output.value.describe(),
    })
}
