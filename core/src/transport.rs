//! The seam between the core and whatever actually moves bytes.
//!
//! A `Transport` sends one `HttpRequest` and returns the response head as
//! soon as it is available, with the body still unread. The driver decides
//! from the head whether to drain the body or drop it.

use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;

use crate::error::TransportError;
use crate::http::{HttpRequest, ResponseMeta};

/// Response body chunks as they arrive.
pub type BodyStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// A response whose body has not been read yet.
pub struct TransportResponse {
    pub meta: ResponseMeta,
    pub body: BodyStream,
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Sends single requests. Implementations must not follow redirects
/// themselves; 3xx responses are returned as-is.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<TransportResponse, TransportError>>;
}
