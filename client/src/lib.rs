//! Thin JSON-over-HTTP client.
//!
//! # Overview
//! Sends GET/POST/PUT/DELETE requests with JSON defaults, optionally follows
//! redirects for GET, buffers the final response and decodes it as JSON.
//! Every operation comes in two forms: an async method that resolves to the
//! outcome, and a `*_with` method that delivers it to a callback.
//!
//! ```no_run
//! # async fn demo() -> Result<(), jsonist::Error> {
//! use jsonist::{Options, RequestBody};
//! use serde_json::json;
//!
//! let reply = jsonist::get("http://localhost:3000/doc", &Options::new().follow_redirects(true)).await?;
//! println!("{} {:?}", reply.response.status_code, reply.data);
//!
//! let reply = jsonist::post("http://localhost:3000/echo", RequestBody::Json(json!({"a": 1})), &Options::new()).await?;
//! # let _ = reply;
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - Building and decoding live in `jsonist-core` and never do I/O.
//! - A JSON body is a success at any status code; callers check
//!   `reply.response.status_code` themselves.
//! - The transport can be replaced per client or per call, which is how the
//!   tests run without a network.

mod client;
mod transport;

use std::sync::OnceLock;

pub use client::{Client, Outcome};
pub use jsonist_core::{
    BodyStream, ByteStream, Error, ErrorKind, FollowRedirects, HttpMethod, HttpRequest, Options, OutboundBody, Reply,
    RequestBody, ResponseMeta, Transport, TransportError, TransportResponse, DEFAULT_REDIRECT_LIMIT,
};
pub use transport::{ClientConfig, ReqwestTransport};

/// Process-wide client behind the free functions.
///
/// Its connection pool outlives any one tokio runtime. A pooled connection
/// opened on a runtime that has since shut down fails on reuse, so code that
/// runs on several runtimes (each `#[tokio::test]` builds its own) should
/// hold a [`Client`] per runtime instead.
fn shared() -> Result<Client, Error> {
    static SHARED: OnceLock<Client> = OnceLock::new();
    if let Some(client) = SHARED.get() {
        return Ok(client.clone());
    }
    let client = Client::new()?;
    Ok(SHARED.get_or_init(|| client).clone())
}

/// `GET` on the process-wide client. Prefer [`Client::get`] when more than
/// one tokio runtime issues requests.
pub async fn get(url: &str, options: &Options) -> Outcome {
    shared()?.get(url, options).await
}

/// `POST` on the process-wide client. Prefer [`Client::post`] when more than
/// one tokio runtime issues requests.
pub async fn post(url: &str, body: RequestBody, options: &Options) -> Outcome {
    shared()?.post(url, body, options).await
}

/// `PUT` on the process-wide client. Prefer [`Client::put`] when more than
/// one tokio runtime issues requests.
pub async fn put(url: &str, body: RequestBody, options: &Options) -> Outcome {
    shared()?.put(url, body, options).await
}

/// `DELETE` on the process-wide client. Prefer [`Client::delete`] when more than
/// one tokio runtime issues requests.
pub async fn delete(url: &str, options: &Options) -> Outcome {
    shared()?.delete(url, options).await
}
