//! Request bodies for POST and PUT.
//!
//! # Design
//! The caller states up front whether a body is a JSON value to serialize or
//! a byte source to forward verbatim. Streamed bodies are never buffered or
//! re-encoded; they are handed to the transport as a stream.

use std::fmt;

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};
use serde::Serialize;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::http::{ByteStream, OutboundBody};

/// Body argument of `post` and `put`.
pub enum RequestBody {
    /// A JSON value, serialized and sent as the complete body.
    Json(serde_json::Value),
    /// Bytes written by the caller's source, forwarded without re-encoding.
    Stream(ByteStream),
}

impl RequestBody {
    /// Convert any serializable value into a JSON body.
    ///
    /// Fails only when `value` cannot be represented as JSON (for example a
    /// map with non-string keys). No request is made in that case.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(RequestBody::Json)
    }

    /// Forward a stream of byte chunks.
    pub fn stream<S>(source: S) -> Self
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    {
        RequestBody::Stream(source.boxed())
    }

    /// Forward everything read from `reader`, e.g. an open file.
    pub fn reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        RequestBody::Stream(ReaderStream::new(reader).boxed())
    }

    /// Send pre-encoded bytes verbatim.
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        let chunk: std::io::Result<Bytes> = Ok(bytes.into());
        RequestBody::Stream(stream::iter([chunk]).boxed())
    }

    /// Encode into the form the transport sends.
    ///
    /// `serde_json::Value` owns its children, so there are no cycles to trip
    /// over and its `Display` output is the compact JSON text.
    pub fn into_outbound(self) -> OutboundBody {
        match self {
            RequestBody::Json(value) => OutboundBody::Full(Bytes::from(value.to_string())),
            RequestBody::Stream(source) => OutboundBody::Stream(source),
        }
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Json(value) => f.debug_tuple("Json").field(value).finish(),
            RequestBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}
