//! Async driver and the callback / awaitable surface.
//!
//! # Design
//! `Client::dispatch` is the one place a call runs: it spawns the hop loop
//! on the tokio runtime and hands the outcome to a callback exactly once.
//! The `*_with` methods expose it directly; the plain async methods wrap it
//! with a oneshot channel, so both forms share every line of behavior.
//!
//! The hop loop itself is linear: send, let the `Collector` look at the
//! head, then either drop the body and build the next GET, or buffer the
//! body and decode it.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures_util::TryStreamExt;
use jsonist_core::{
    request, BodyStream, Collector, Error, HttpMethod, Options, Reply, RequestBody, Step, Transport,
    TransportError, TransportResponse,
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::transport::{ClientConfig, ReqwestTransport};

/// Outcome of a call: the decoded reply or the classified error.
pub type Outcome = Result<Reply, Error>;

/// JSON client over a pluggable transport.
///
/// Cheap to clone; calls made from clones are independent and share nothing
/// but the transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

struct Call {
    method: HttpMethod,
    url: String,
    body: Option<RequestBody>,
    options: Options,
}

impl Client {
    /// Client over the default reqwest transport.
    pub fn new() -> Result<Self, Error> {
        Self::with_config(&ClientConfig::default())
    }

    pub fn with_config(config: &ClientConfig) -> Result<Self, Error> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    // ---------------------------------------------------------------------------
    // Awaitable form
    // ---------------------------------------------------------------------------

    pub async fn get(&self, url: &str, options: &Options) -> Outcome {
        self.call(Call::new(HttpMethod::Get, url, None, options)).await
    }

    pub async fn post(&self, url: &str, body: RequestBody, options: &Options) -> Outcome {
        self.call(Call::new(HttpMethod::Post, url, Some(body), options)).await
    }

    pub async fn put(&self, url: &str, body: RequestBody, options: &Options) -> Outcome {
        self.call(Call::new(HttpMethod::Put, url, Some(body), options)).await
    }

    /// DELETE never carries a body.
    pub async fn delete(&self, url: &str, options: &Options) -> Outcome {
        self.call(Call::new(HttpMethod::Delete, url, None, options)).await
    }

    // ---------------------------------------------------------------------------
    // Callback form
    // ---------------------------------------------------------------------------

    pub fn get_with<F>(&self, url: &str, options: &Options, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        self.dispatch(Call::new(HttpMethod::Get, url, None, options), callback)
    }

    pub fn post_with<F>(&self, url: &str, body: RequestBody, options: &Options, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        self.dispatch(Call::new(HttpMethod::Post, url, Some(body), options), callback)
    }

    pub fn put_with<F>(&self, url: &str, body: RequestBody, options: &Options, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        self.dispatch(Call::new(HttpMethod::Put, url, Some(body), options), callback)
    }

    pub fn delete_with<F>(&self, url: &str, options: &Options, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        self.dispatch(Call::new(HttpMethod::Delete, url, None, options), callback)
    }

    // ---------------------------------------------------------------------------
    // Core
    // ---------------------------------------------------------------------------

    async fn call(&self, call: Call) -> Outcome {
        let (tx, rx) = oneshot::channel();
        self.dispatch(call, move |outcome| {
            // the receiver is gone only if the caller dropped this future
            let _ = tx.send(outcome);
        });
        rx.await
            .unwrap_or_else(|_| Err(TransportError::msg("request task ended without an outcome").into()))
    }

    fn dispatch<F>(&self, call: Call, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let transport = call.options.transport.clone().unwrap_or_else(|| self.transport.clone());
        tokio::spawn(async move {
            let outcome = collect(transport.as_ref(), call).await;
            callback(outcome);
        })
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Call {
    fn new(method: HttpMethod, url: &str, body: Option<RequestBody>, options: &Options) -> Self {
        Self {
            method,
            url: url.to_string(),
            body,
            options: options.clone(),
        }
    }
}

/// Run every hop of one call and decode the final response.
async fn collect(transport: &dyn Transport, call: Call) -> Outcome {
    let Call {
        method,
        url,
        body,
        options,
    } = call;

    let url = request::parse_target(&url)?;
    let mut req = request::build(method, url, body, &options.headers);
    let mut collector = Collector::new(&req, options.follow_redirects);

    loop {
        debug!(method = %req.method, url = %req.url, "sending request");
        let response = match transport.send(req).await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %collector.current_url(), error = %e, "transport failed");
                return Err(collector.on_transport_error(e));
            }
        };

        match collector.on_response(&response.meta) {
            Ok(Step::Redirect(next)) => {
                debug!(
                    status = response.meta.status_code,
                    location = %next,
                    hop = collector.redirects(),
                    "following redirect"
                );
                drop(response);
                req = request::build_redirect(next, &options.headers);
                collector.on_redirect_sent(&req)?;
            }
            Ok(Step::ReadBody) => {
                let TransportResponse { meta, body } = response;
                let body = match buffer(body).await {
                    Ok(body) => body,
                    Err(e) => return Err(collector.on_transport_error(e)),
                };
                debug!(status = meta.status_code, len = body.len(), "decoding response");
                return collector.decode(meta, body);
            }
            Err(e) => {
                if let Error::RedirectLimitExceeded { count } = e {
                    warn!(count, url = %collector.current_url(), "redirect limit reached");
                }
                return Err(e);
            }
        }
    }
}

/// Read a response body to completion.
async fn buffer(mut body: BodyStream) -> Result<Bytes, TransportError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = body.try_next().await? {
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}
