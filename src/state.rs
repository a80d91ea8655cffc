mod request_id;

use crate::config::{resolve_api_key, AppConfig};
use crate::error::RelayError;
use crate::transport::UpstreamClient;

use request_id::RequestIdGenerator;

/// Shared application state accessible to all handlers.
///
/// Immutable after startup apart from the request-id counter.
pub struct AppState {
    pub config: AppConfig,
    pub upstream: UpstreamClient,
    request_ids: RequestIdGenerator,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, upstream: UpstreamClient) -> Self {
        Self {
            config,
            upstream,
            request_ids: RequestIdGenerator::new(),
        }
    }

    /// Build state from config with an explicit credential.
    ///
    /// # Errors
    ///
    /// Propagates [`UpstreamClient::new`] failures.
    pub fn from_config(config: AppConfig, api_key: Option<String>) -> Result<Self, RelayError> {
        let upstream = UpstreamClient::new(&config.upstream, &config.server, api_key)?;
        Ok(Self::new(config, upstream))
    }

    /// Build state reading the credential from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Propagates [`UpstreamClient::new`] failures.
    pub fn from_env(config: AppConfig) -> Result<Self, RelayError> {
        let api_key = resolve_api_key(&config.upstream);
        Self::from_config(config, api_key)
    }

    pub fn next_request_seq(&self) -> u64 {
        self.request_ids.next_seq()
    }

    #[must_use]
    pub fn request_uuid(&self, request_seq: u64) -> uuid::Uuid {
        self.request_ids.request_uuid(request_seq)
    }

    /// Allocate the id used to correlate all log lines of one request.
    pub fn next_request_id(&self) -> uuid::Uuid {
        self.request_uuid(self.next_request_seq())
    }
}
