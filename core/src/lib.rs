//! I/O-free core of the JSON client.
//!
//! # Overview
//! Builds `HttpRequest` values and decodes response bodies without touching
//! the network (host-does-IO pattern). The `jsonist` crate runs the actual
//! round-trips through a `Transport` and feeds the results back in.
//!
//! # Design
//! - `request` builds one hop: default JSON headers, caller headers on top,
//!   body encoded or streamed.
//! - `Collector` is the per-call redirect state machine; `decode` turns a
//!   buffered body into a `Reply` or a classified `Error`.
//! - `Transport` is the only seam to the outside world, so tests can swap in
//!   a scripted one.

pub mod body;
pub mod collector;
pub mod error;
pub mod http;
pub mod options;
pub mod request;
pub mod transport;

pub use body::RequestBody;
pub use collector::{decode, Collector, CollectorState, Reply, Step};
pub use error::{BoxError, Error, ErrorKind, TransportError};
pub use http::{ByteStream, HttpMethod, HttpRequest, OutboundBody, ResponseMeta};
pub use options::{FollowRedirects, Options, DEFAULT_REDIRECT_LIMIT};
pub use transport::{BodyStream, Transport, TransportResponse};
