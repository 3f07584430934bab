//! Request transport: GET/POST/DELETE against the configured server.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};

/// A successful response, body fully read.
#[derive(Clone, Debug)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl RawResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            Error::MalformedResponse(format!("unexpected response body: {}", e))
        })
    }
}

/// Issues requests with the shared connection settings.
#[derive(Debug)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: Url,
    config: Arc<ConnectionConfig>,
}

impl Transport {
    pub(crate) fn new(http: reqwest::Client, config: Arc<ConnectionConfig>) -> Result<Self> {
        let base_url = base_url(&config)?;
        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    pub(crate) fn config(&self) -> &Arc<ConnectionConfig> {
        &self.config
    }

    /// Build the full URL for a path, one segment per element.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidArgument(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn get(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<RawResponse> {
        let request = self.request(Method::GET, segments)?.query(query);
        self.send(request).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
        query: &[(&str, &str)],
    ) -> Result<RawResponse> {
        let body = serde_json::to_string(body)?;
        let request = self
            .request(Method::POST, segments)?
            .header("Content-Type", "application/json")
            .query(query)
            .body(body);
        self.send(request).await
    }

    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<RawResponse> {
        let request = self.request(Method::DELETE, segments)?;
        self.send(request).await
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "sending request");
        Ok(self
            .http
            .request(method, url)
            .basic_auth(self.config.user(), Some(self.config.pass())))
    }

    async fn send(&self, request: RequestBuilder) -> Result<RawResponse> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), %body, "request failed");
            return Err(Error::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// `{protocol}://{host}:{port}/{base_path}`
fn base_url(config: &ConnectionConfig) -> Result<Url> {
    let root = format!(
        "{}://{}:{}/",
        config.protocol().scheme(),
        config.host(),
        config.port()
    );
    let mut url = Url::parse(&root)
        .map_err(|e| Error::InvalidArgument(format!("invalid server address '{}': {}", root, e)))?;

    let prefix: Vec<&str> = config
        .base_path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    if !prefix.is_empty() {
        url.path_segments_mut()
            .map_err(|_| Error::InvalidArgument(format!("{} cannot be a base URL", root)))?
            .pop_if_empty()
            .extend(prefix);
    }
    Ok(url)
}
