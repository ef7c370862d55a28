//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe one hop of a request as plain data. The core crate
//! builds `HttpRequest` values and inspects `ResponseMeta` values without
//! ever touching the network; the driver in the `jsonist` crate hands them
//! to a `Transport`.
//!
//! Header names are stored as given and compared ASCII case-insensitively.

use std::fmt;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied bytes forwarded into the outbound request as they arrive.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// The body of an outbound request, already encoded.
pub enum OutboundBody {
    /// A complete body, sent in one piece.
    Full(Bytes),
    /// A streamed body, forwarded chunk by chunk without re-encoding.
    Stream(ByteStream),
}

impl fmt::Debug for OutboundBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundBody::Full(bytes) => f.debug_tuple("Full").field(bytes).finish(),
            OutboundBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// One hop of a request described as plain data.
///
/// Built by `request::build`. A fresh value is produced for every redirect
/// hop; the previous one is consumed by the transport.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<OutboundBody>,
}

impl HttpRequest {
    /// Look up a request header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Status line and headers of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
}

impl ResponseMeta {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a response header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let meta = ResponseMeta::new(200).with_header("Content-Type", "application/json");
        assert_eq!(meta.header("content-type"), Some("application/json"));
        assert_eq!(meta.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(meta.header("location"), None);
    }

    #[test]
    fn method_display_is_uppercase() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!(HttpMethod::Get.as_str(), "GET");
    }
}
