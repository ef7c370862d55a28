//! Default transport backed by `reqwest`.
//!
//! # Design
//! reqwest's own redirect handling is switched off so every 3xx reaches the
//! collector untouched. The response body is exposed as a stream and only
//! read if the collector asks for it.

use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::{StreamExt, TryStreamExt};
use jsonist_core::{HttpMethod, HttpRequest, OutboundBody, ResponseMeta, Transport, TransportError, TransportResponse};

/// Settings for the default transport. Timeouts are enforced by reqwest;
/// the collector itself never times out.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        let client = builder.build().map_err(TransportError::new)?;
        Ok(Self { client })
    }
}

impl ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<TransportResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            None => builder,
            Some(OutboundBody::Full(bytes)) => builder.body(bytes),
            Some(OutboundBody::Stream(source)) => builder.body(reqwest::Body::wrap_stream(source)),
        };

        let response = builder.send().await.map_err(TransportError::new)?;

        let meta = response_meta(response.status().as_u16(), response.headers());
        let body = response.bytes_stream().map_err(TransportError::new).boxed();

        Ok(TransportResponse { meta, body })
    }
}

/// Header values that are not valid UTF-8 are kept, with the invalid bytes
/// replaced by U+FFFD.
fn response_meta(status_code: u16, headers: &reqwest::header::HeaderMap) -> ResponseMeta {
    ResponseMeta {
        status_code,
        headers: headers
            .iter()
            .map(|(name, value)| {
                let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                (name.as_str().to_string(), value)
            })
            .collect(),
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<TransportResponse, TransportError>> {
        Box::pin(self.execute(request))
    }
}
