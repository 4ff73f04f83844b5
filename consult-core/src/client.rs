//! HTTP client for the ask API.
//!
//! Orchestrates one logical ask request: tries the streaming transport
//! first, transparently falls back to the single-shot endpoint when the
//! server signals that streaming is unsupported, and normalizes both paths
//! to one result shape.

use crate::config::ConsultConfig;
use crate::error::{AskError, ConfigError};
use crate::stream::SseAccumulator;
use crate::types::{AskRequest, AskResult};
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use tracing::debug;

/// Streaming ask endpoint, relative to the base URL.
const STREAM_ENDPOINT: &str = "/api/ask/stream";
/// Single-shot fallback endpoint.
const FALLBACK_ENDPOINT: &str = "/api/ask";

/// Error detail used when the server body is empty.
const GENERIC_FAILURE: &str = "The ask request failed";

/// Callback receiving the full accumulated answer after each delta.
pub type PartialAnswerSink<'a> = &'a mut dyn FnMut(&str);

/// Client for the Consult ask API.
///
/// The base URL is injected at construction; a trailing slash is stripped.
pub struct AskClient {
    http: Client,
    base_url: String,
}

impl AskClient {
    /// Create a client from configuration, validating the base URL.
    pub fn new(config: &ConsultConfig) -> Result<Self, ConfigError> {
        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|_| ConfigError::InvalidBaseUrl {
            url: config.api_base_url.clone(),
        })?;
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    /// The normalized base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one logical ask request.
    ///
    /// Tries `/api/ask/stream` first; status 404 or 501 means the server
    /// does not support streaming and triggers exactly one fallback call to
    /// `/api/ask` with the same payload. Any other non-success status fails
    /// with the server-provided body text. `on_partial` observes the full
    /// accumulated answer after each delta on both paths.
    pub async fn ask(
        &self,
        request: &AskRequest,
        mut on_partial: Option<PartialAnswerSink<'_>>,
    ) -> Result<AskResult, AskError> {
        let url = format!("{}{}", self.base_url, STREAM_ENDPOINT);
        debug!(url = url.as_str(), mode = %request.mode, "Sending streaming ask request");

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(|e| AskError::Request {
                message: format!("Streaming ask request failed: {e}"),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::NOT_IMPLEMENTED {
            debug!(%status, "Streaming unsupported by server, using single-shot fallback");
            return self.ask_single(request, on_partial).await;
        }
        if !status.is_success() {
            return Err(Self::request_error(status, response).await);
        }

        let mut accumulator = SseAccumulator::new();
        let mut byte_stream = response.bytes_stream();
        let mut emit = |partial: &str| {
            if let Some(sink) = on_partial.as_mut() {
                sink(partial);
            }
        };

        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk.map_err(|e| AskError::Stream {
                message: format!("Failed to read streaming response body: {e}"),
            })?;
            accumulator.push(&chunk, &mut emit)?;
        }
        accumulator.finish(&mut emit)?;

        Ok(accumulator.into_result())
    }

    /// Single JSON request/response exchange for servers without streaming.
    ///
    /// To keep the callback contract identical across transports, a
    /// non-empty answer is delivered to `on_partial` once, in full.
    async fn ask_single(
        &self,
        request: &AskRequest,
        mut on_partial: Option<PartialAnswerSink<'_>>,
    ) -> Result<AskResult, AskError> {
        let url = format!("{}{}", self.base_url, FALLBACK_ENDPOINT);
        debug!(url = url.as_str(), "Sending single-shot ask request");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AskError::Request {
                message: format!("Ask request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::request_error(status, response).await);
        }

        let result: AskResult = response.json().await.map_err(|e| AskError::ResponseParse {
            message: format!("Invalid ask response: {e}"),
        })?;

        if !result.answer.is_empty() {
            if let Some(sink) = on_partial.as_mut() {
                sink(&result.answer);
            }
        }
        Ok(result)
    }

    /// Build a request error from a non-success response, using the body
    /// text as detail or a generic message when it is empty.
    async fn request_error(status: StatusCode, response: reqwest::Response) -> AskError {
        let detail = response.text().await.unwrap_or_default();
        let message = if detail.trim().is_empty() {
            format!("{GENERIC_FAILURE} (HTTP {status})")
        } else {
            detail
        };
        AskError::Request { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(url: &str) -> ConsultConfig {
        ConsultConfig {
            api_base_url: url.to_string(),
            ..ConsultConfig::default()
        }
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let client = AskClient::new(&config_with("https://consult.example.org/")).unwrap();
        assert_eq!(client.base_url(), "https://consult.example.org");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = AskClient::new(&config_with("not a url"));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }
}
