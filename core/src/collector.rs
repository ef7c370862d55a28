//! Redirect state machine and response decoding.
//!
//! # Design
//! `Collector` is driven by events from the outside and never does I/O:
//!
//! ```text
//! Sending --head--> AwaitingBody --redirect--> Redirecting --sent--> Sending
//!                        |
//!                        +--read body--> Decoding --> Done | Failed
//! ```
//!
//! Any transport failure moves straight to `Failed`. A redirect is followed
//! only for GET requests with redirects enabled, a 301/302/307/308 status and
//! a `location` header. The body of a followed redirect is never decoded.

use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{Error, TransportError};
use crate::http::{HttpMethod, HttpRequest, ResponseMeta};
use crate::options::FollowRedirects;
use crate::request::resolve_location;

/// Successful outcome of a call.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Parsed body, `None` when the body was empty.
    pub data: Option<serde_json::Value>,
    pub response: ResponseMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Sending,
    AwaitingBody,
    Redirecting,
    Decoding,
    Done,
    Failed,
}

/// What the driver must do after the response head arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Drop the body and send a GET to this URL.
    Redirect(Url),
    /// Read the body to completion and call `Collector::decode`.
    ReadBody,
}

/// Per-call state: current hop URL, hop counter and lifecycle state.
#[derive(Debug)]
pub struct Collector {
    method: HttpMethod,
    current: Url,
    limit: Option<u32>,
    redirects: u32,
    state: CollectorState,
}

impl Collector {
    /// Start tracking a call whose first hop is `request`.
    pub fn new(request: &HttpRequest, follow: FollowRedirects) -> Self {
        Self {
            method: request.method,
            current: request.url.clone(),
            limit: follow.limit(),
            redirects: 0,
            state: CollectorState::Sending,
        }
    }

    pub fn state(&self) -> CollectorState {
        self.state
    }

    /// Number of redirects followed so far.
    pub fn redirects(&self) -> u32 {
        self.redirects
    }

    /// URL of the hop in flight.
    pub fn current_url(&self) -> &Url {
        &self.current
    }

    /// Response head received for the current hop.
    pub fn on_response(&mut self, meta: &ResponseMeta) -> Result<Step, Error> {
        self.expect(CollectorState::Sending)?;
        self.state = CollectorState::AwaitingBody;

        let Some(location) = self.redirect_location(meta) else {
            self.state = CollectorState::Decoding;
            return Ok(Step::ReadBody);
        };

        // redirect_location only returns Some when a limit is set
        let limit = self.limit.unwrap_or(0);
        if self.redirects >= limit {
            self.state = CollectorState::Failed;
            return Err(Error::RedirectLimitExceeded { count: limit });
        }

        match resolve_location(&self.current, location) {
            Ok(next) => {
                self.redirects += 1;
                self.state = CollectorState::Redirecting;
                Ok(Step::Redirect(next))
            }
            Err(e) => {
                self.state = CollectorState::Failed;
                Err(e)
            }
        }
    }

    /// The follow-up request for the last `Step::Redirect` is on its way.
    pub fn on_redirect_sent(&mut self, request: &HttpRequest) -> Result<(), Error> {
        self.expect(CollectorState::Redirecting)?;
        self.current = request.url.clone();
        self.state = CollectorState::Sending;
        Ok(())
    }

    /// The transport failed; nothing of this call is decoded.
    pub fn on_transport_error(&mut self, error: TransportError) -> Error {
        self.state = CollectorState::Failed;
        Error::Transport(error)
    }

    /// Decode the fully buffered body of the final hop.
    pub fn decode(&mut self, meta: ResponseMeta, body: Bytes) -> Result<Reply, Error> {
        self.expect(CollectorState::Decoding)?;
        let outcome = decode(meta, body);
        self.state = if outcome.is_ok() {
            CollectorState::Done
        } else {
            CollectorState::Failed
        };
        outcome
    }

    fn redirect_location<'a>(&self, meta: &'a ResponseMeta) -> Option<&'a str> {
        self.limit?;
        if self.method != HttpMethod::Get || !is_redirect_status(meta.status_code) {
            return None;
        }
        meta.header("location")
    }

    fn expect(&mut self, state: CollectorState) -> Result<(), Error> {
        if self.state == state {
            return Ok(());
        }
        let err = TransportError::msg(format!(
            "unexpected event in state {:?}, expected {state:?}",
            self.state
        ));
        self.state = CollectorState::Failed;
        Err(err.into())
    }
}

pub fn is_redirect_status(status: u16) -> bool {
    matches!(status, 301 | 302 | 307 | 308)
}

/// Classify a complete response body.
///
/// Empty bodies decode to `None` and JSON bodies to their value, whatever the
/// status. Anything else is an `Http` error at status 300 and above, and a
/// `Parse` error below.
pub fn decode(meta: ResponseMeta, body: Bytes) -> Result<Reply, Error> {
    if body.is_empty() {
        return Ok(Reply {
            data: None,
            response: meta,
        });
    }

    match parse_json(&body) {
        Ok(value) => Ok(Reply {
            data: Some(value),
            response: meta,
        }),
        Err(e) => {
            let message = format!("JSON parse error: {e}");
            let status_code = meta.status_code;
            if status_code >= 300 {
                Err(Error::Http {
                    message,
                    status_code,
                    data: body,
                    response: meta,
                })
            } else {
                Err(Error::Parse {
                    message,
                    status_code,
                    data: body,
                    response: meta,
                })
            }
        }
    }
}

/// Parse a whole body with no nesting limit. Deep documents grow the stack
/// on the heap instead of overflowing it.
fn parse_json(body: &[u8]) -> serde_json::Result<Value> {
    let mut de = serde_json::Deserializer::from_slice(body);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}
