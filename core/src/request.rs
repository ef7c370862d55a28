//! Request building.
//!
//! Every hop gets a freshly built `HttpRequest`. Defaults are
//! `accept: application/json` on every request and
//! `content-type: application/json` on POST and PUT; a header the caller
//! supplies under the same name (any case) replaces the default.

use url::Url;

use crate::body::RequestBody;
use crate::error::{Error, TransportError};
use crate::http::{find_header, HttpMethod, HttpRequest};

pub const JSON_MIME: &str = "application/json";

/// Parse the target of the first hop, which must be absolute.
pub fn parse_target(target: &str) -> Result<Url, Error> {
    Url::parse(target).map_err(|e| TransportError::msg(format!("invalid URL `{target}`: {e}")).into())
}

/// Resolve a `location` header against the URL of the hop that returned it.
pub fn resolve_location(current: &Url, location: &str) -> Result<Url, Error> {
    current
        .join(location)
        .map_err(|e| TransportError::msg(format!("invalid redirect location `{location}`: {e}")).into())
}

/// Build the request for one hop.
///
/// `body` is ignored for GET and DELETE, which never carry one.
pub fn build(method: HttpMethod, url: Url, body: Option<RequestBody>, headers: &[(String, String)]) -> HttpRequest {
    let has_body = matches!(method, HttpMethod::Post | HttpMethod::Put);

    let mut merged = Vec::with_capacity(headers.len() + 2);
    if has_body && find_header(headers, "content-type").is_none() {
        merged.push(("content-type".to_string(), JSON_MIME.to_string()));
    }
    if find_header(headers, "accept").is_none() {
        merged.push(("accept".to_string(), JSON_MIME.to_string()));
    }
    merged.extend(headers.iter().cloned());

    HttpRequest {
        method,
        url,
        headers: merged,
        body: if has_body { body.map(RequestBody::into_outbound) } else { None },
    }
}

/// Build the follow-up GET for a redirect hop.
pub fn build_redirect(url: Url, headers: &[(String, String)]) -> HttpRequest {
    build(HttpMethod::Get, url, None, headers)
}
