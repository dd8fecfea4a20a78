//! Request layer
//!
//! A single generic entry point that performs an HTTP call, attaches the bearer credential
//! and an optional `If-Match` precondition, and returns a [`ResponseEnvelope`]. Non-success
//! statuses are never errors here; only transport failures and undecodable structured
//! bodies are.

use newwork_core::{ClientConfig, ErrorContext, NewworkError, NewworkResult};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, ETAG, IF_MATCH, USER_AGENT,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::store::SessionStore;

pub mod envelope;
pub mod options;


pub use envelope::{decode_payload, is_structured, Payload, ResponseEnvelope};
pub use options::{Method, RequestOptions};

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP client bound to one backend origin and one credential store
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
    store: SessionStore,
}

impl ApiClient {
    /// Create a client for `config.base_url` reading credentials from `store`
    pub fn new(config: ClientConfig, store: SessionStore) -> NewworkResult<Self> {
        config.validate()?;
        let client = create_http_client(&config)?;

        info!(base_url = %config.base_url, "Created Newwork API client");

        Ok(Self {
            client,
            config: Arc::new(config),
            store,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Perform a call and normalize the response
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> NewworkResult<ResponseEnvelope<T>> {
        let url = self.config.url_for(path);
        let headers = self.build_headers(&options)?;

        debug!(
            method = %options.method,
            url = %url,
            authenticated = headers.contains_key(AUTHORIZATION),
            conditional = options.if_match.is_some(),
            "Sending request"
        );

        let mut builder = self
            .client
            .request(options.method.into(), &url)
            .headers(headers);
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(method = %options.method, url = %url, error = %e, "Request failed before a response");
            transport_failure(e, &url, "send")
        })?;

        let status = response.status();
        let concurrency_token = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let structured = is_structured(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        );

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_failure(e, &url, "read_body"))?;
        let data = decode_payload::<T>(status, structured, &body)?;

        debug!(
            method = %options.method,
            url = %url,
            status = status.as_u16(),
            etag = ?concurrency_token,
            "Request completed"
        );

        Ok(ResponseEnvelope {
            ok: status.is_success(),
            data,
            concurrency_token,
            status: status.as_u16(),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> NewworkResult<ResponseEnvelope<T>> {
        self.request(path, RequestOptions::get()).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> NewworkResult<ResponseEnvelope<T>> {
        self.request(path, RequestOptions::delete()).await
    }

    /// Assemble headers for one call, snapshotting the current credential
    ///
    /// Order matters: caller headers may override `Content-Type`, but never the
    /// credential or the precondition.
    pub(crate) fn build_headers(&self, options: &RequestOptions) -> NewworkResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        if options.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }

        for (key, value) in &options.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                NewworkError::InvalidRequest {
                    message: format!("Invalid header name '{}': {}", key, e),
                    field: Some(key.clone()),
                    context: ErrorContext::new("api_client").with_operation("build_headers"),
                }
            })?;
            headers.insert(name, header_value(value, key)?);
        }

        if let Some(token) = self.store.credential() {
            let mut value = header_value(&format!("Bearer {}", token), AUTHORIZATION.as_str())?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        if let Some(if_match) = &options.if_match {
            headers.insert(IF_MATCH, header_value(if_match, IF_MATCH.as_str())?);
        }

        Ok(headers)
    }
}

fn header_value(value: &str, name: &str) -> NewworkResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| NewworkError::InvalidRequest {
        message: format!("Invalid header value for '{}': {}", name, e),
        field: Some(name.to_string()),
        context: ErrorContext::new("api_client").with_operation("build_headers"),
    })
}

fn transport_failure(error: reqwest::Error, url: &str, operation: &str) -> NewworkError {
    let suggestion = if error.is_timeout() {
        "Increase timeout_seconds or check backend latency"
    } else if error.is_connect() {
        "Check that the backend is running and NEWWORK_API_URL is correct"
    } else {
        "Check network connectivity and API status"
    };

    NewworkError::Transport {
        message: format!("HTTP exchange with {} failed: {}", url, error),
        source: Some(Box::new(error)),
        context: ErrorContext::new("api_client")
            .with_operation(operation)
            .with_metadata("url", url)
            .with_suggestion(suggestion),
    }
}

/// Build the shared HTTP client with common configuration
pub(crate) fn create_http_client(config: &ClientConfig) -> NewworkResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(&config.user_agent, USER_AGENT.as_str())?);

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| NewworkError::Internal {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })
}
