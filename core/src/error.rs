//! Error types for the JSON client.
//!
//! # Design
//! A closed set of variants, one per way a call can fail. `Http` and `Parse`
//! both mean "the body was not JSON"; they are split on the status code so
//! callers can tell an error page (status >= 300) from a server that simply
//! does not speak JSON. Both keep the raw body bytes for inspection.
//!
//! A JSON body is never an error, whatever the status code.

use bytes::Bytes;

use crate::http::ResponseMeta;

/// Boxed source of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A connection-level failure reported by the transport, or a target the
/// transport cannot address.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    /// Wrap an underlying error, keeping it as the `source`.
    pub fn new(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// A transport failure with no underlying error.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::new(e)
    }
}

/// Discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Http,
    Parse,
    RedirectLimitExceeded,
}

/// The ways a call can fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a usable response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-JSON body with a status code of 300 or above.
    #[error("{message}")]
    Http {
        message: String,
        status_code: u16,
        data: Bytes,
        response: ResponseMeta,
    },

    /// Non-JSON body with a status code below 300.
    #[error("{message}")]
    Parse {
        message: String,
        status_code: u16,
        data: Bytes,
        response: ResponseMeta,
    },

    /// The redirect chain reached the configured hop limit.
    #[error("Response was redirected too many times ({count})")]
    RedirectLimitExceeded { count: u32 },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::Transport,
            Error::Http { .. } => ErrorKind::Http,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::RedirectLimitExceeded { .. } => ErrorKind::RedirectLimitExceeded,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Status code of the response that failed to decode.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http { status_code, .. } | Error::Parse { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Raw body bytes of the response that failed to decode.
    pub fn data(&self) -> Option<&Bytes> {
        match self {
            Error::Http { data, .. } | Error::Parse { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&ResponseMeta> {
        match self {
            Error::Http { response, .. } | Error::Parse { response, .. } => Some(response),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn redirect_limit_message_embeds_count() {
        let err = Error::RedirectLimitExceeded { count: 3 };
        assert_eq!(err.to_string(), "Response was redirected too many times (3)");
        assert_eq!(err.kind(), ErrorKind::RedirectLimitExceeded);
        assert!(err.status_code().is_none());
        assert!(err.data().is_none());
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::from(TransportError::from(io));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.message(), "refused");
        let Error::Transport(inner) = &err else {
            panic!("expected transport error");
        };
        assert!(inner.source().is_some());
    }

    #[test]
    fn http_error_exposes_fields() {
        let err = Error::Http {
            message: "JSON parse error: expected value".to_string(),
            status_code: 502,
            data: Bytes::from_static(b"bad gateway"),
            response: ResponseMeta::new(502),
        };
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(err.data().map(|d| d.as_ref()), Some(&b"bad gateway"[..]));
        assert_eq!(err.response().map(|r| r.status_code), Some(502));
    }
}
