use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;
use http::header::{self, HeaderMap, HeaderValue};

use crate::config::{ServerConfig, UpstreamConfig};
use crate::error::RelayError;
use crate::protocol::{ChatMessage, OpenAiChatRequest, OpenAiChatResponse};

const MAX_UPSTREAM_ERROR_CHARS: usize = 500;

fn build_reqwest_client(
    pool_max_idle_per_host: usize,
    pool_idle_timeout: Option<Duration>,
    timeout: Duration,
) -> Result<reqwest::Client, RelayError> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(pool_max_idle_per_host)
        .pool_idle_timeout(pool_idle_timeout)
        .tcp_nodelay(true)
        .connect_timeout(Duration::from_secs(5))
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .build()
        .map_err(|err| RelayError::Transport(format!("Failed to build HTTP client: {err}")))
}

/// Client for the single OpenAI-compatible chat-completions endpoint.
///
/// Every call is exactly one POST; nothing is retried.
pub struct UpstreamClient {
    client: reqwest::Client,
    endpoint: url::Url,
    api_key: Option<String>,
    api_key_env: String,
    model: String,
    temperature: f64,
}

impl UpstreamClient {
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] when the endpoint URL does not parse and
    /// [`RelayError::Transport`] when the HTTP client cannot be built.
    pub fn new(
        upstream: &UpstreamConfig,
        server: &ServerConfig,
        api_key: Option<String>,
    ) -> Result<Self, RelayError> {
        let endpoint = url::Url::parse(&upstream.completions_url()).map_err(|err| {
            RelayError::Config(format!("invalid upstream.base_url '{}': {err}", upstream.base_url))
        })?;
        let pool_idle_timeout = (server.http_pool_idle_timeout_secs > 0)
            .then(|| Duration::from_secs(server.http_pool_idle_timeout_secs));
        let client = build_reqwest_client(
            server.http_pool_max_idle_per_host,
            pool_idle_timeout,
            Duration::from_secs(server.timeout),
        )?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.filter(|key| !key.is_empty()),
            api_key_env: upstream.api_key_env.clone(),
            model: upstream.model.clone(),
            temperature: upstream.temperature,
        })
    }

    #[must_use]
    pub fn credential_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    fn credential(&self) -> Result<&str, RelayError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| RelayError::Config(format!("{} is not set", self.api_key_env)))
    }

    fn request_headers(api_key: &str) -> Result<HeaderMap, RelayError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
            RelayError::Config("upstream credential contains invalid header characters".into())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }

    async fn send(
        &self,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, RelayError> {
        let api_key = self.credential()?;
        let body = serde_json::to_vec(&OpenAiChatRequest {
            model: &self.model,
            messages,
            stream,
            temperature: self.temperature,
        })
        .map_err(|err| RelayError::Internal(format!("failed to encode upstream body: {err}")))?;

        let mut request = reqwest::Request::new(reqwest::Method::POST, self.endpoint.clone());
        *request.headers_mut() = Self::request_headers(api_key)?;
        *request.body_mut() = Some(reqwest::Body::from(body));

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|err| RelayError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_bytes = response.bytes().await.unwrap_or_default();
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                message: sanitize_upstream_error(&body_bytes),
            });
        }
        Ok(response)
    }

    /// Non-streaming completion.
    ///
    /// # Errors
    ///
    /// Missing credential, transport failure, non-success status, or a body
    /// that is not a chat-completion object.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<OpenAiChatResponse, RelayError> {
        let response = self.send(messages, false).await?;
        let body = response
            .bytes()
            .await
            .map_err(|err| RelayError::Transport(format!("failed to read upstream body: {err}")))?;
        serde_json::from_slice(&body)
            .map_err(|err| RelayError::Decode(format!("invalid upstream completion: {err}")))
    }

    /// Streaming completion; the returned handle owns the live response.
    ///
    /// # Errors
    ///
    /// Missing credential, transport failure, non-success status, or a
    /// response that declares an empty body.
    pub async fn open_stream(&self, messages: &[ChatMessage]) -> Result<UpstreamStream, RelayError> {
        let response = self.send(messages, true).await?;
        if response.content_length() == Some(0) {
            return Err(RelayError::Upstream {
                status: response.status().as_u16(),
                message: "empty stream".to_string(),
            });
        }
        Ok(UpstreamStream { response })
    }
}

/// A successful streaming response not yet being read.
///
/// Dropping it, or dropping the byte stream it turns into, releases the
/// upstream connection.
pub struct UpstreamStream {
    response: reqwest::Response,
}

impl UpstreamStream {
    pub fn into_byte_stream(self) -> impl Stream<Item = Result<Bytes, reqwest::Error>> + Send {
        self.response.bytes_stream()
    }
}

/// Upstream error body as text, cut to 500 characters on a char boundary.
#[must_use]
pub fn sanitize_upstream_error(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    match text.char_indices().nth(MAX_UPSTREAM_ERROR_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
