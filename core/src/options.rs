//! Per-call options.
//!
//! `Options` deserializes from the same shape callers would write by hand:
//!
//! ```json
//! { "headers": { "authorization": "Bearer x" }, "followRedirects": 5 }
//! ```
//!
//! `followRedirects` takes `true` (limit of 10), `false`, or a hop limit.
//! The transport override is code-only and never deserialized.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use crate::transport::Transport;

/// Hop limit used when redirects are enabled without an explicit count.
pub const DEFAULT_REDIRECT_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FollowRedirects {
    #[default]
    Disabled,
    Enabled,
    Limit(u32),
}

impl FollowRedirects {
    /// The hop limit, or `None` when redirects are not followed.
    ///
    /// A limit of zero means redirects are not followed.
    pub fn limit(&self) -> Option<u32> {
        match *self {
            FollowRedirects::Disabled | FollowRedirects::Limit(0) => None,
            FollowRedirects::Enabled => Some(DEFAULT_REDIRECT_LIMIT),
            FollowRedirects::Limit(n) => Some(n),
        }
    }
}

impl From<bool> for FollowRedirects {
    fn from(enabled: bool) -> Self {
        if enabled {
            FollowRedirects::Enabled
        } else {
            FollowRedirects::Disabled
        }
    }
}

impl From<u32> for FollowRedirects {
    fn from(limit: u32) -> Self {
        FollowRedirects::Limit(limit)
    }
}

impl<'de> Deserialize<'de> for FollowRedirects {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Limit(u32),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Flag(enabled) => enabled.into(),
            Raw::Limit(limit) => limit.into(),
        })
    }
}

/// Options accepted by every operation.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Options {
    /// Extra request headers, merged over the defaults.
    #[serde(default, deserialize_with = "deserialize_headers")]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub follow_redirects: FollowRedirects,
    /// Replaces the client's transport for this call.
    #[serde(skip)]
    pub transport: Option<Arc<dyn Transport>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn follow_redirects(mut self, follow: impl Into<FollowRedirects>) -> Self {
        self.follow_redirects = follow.into();
        self
    }

    pub fn max_redirects(self, limit: u32) -> Self {
        self.follow_redirects(FollowRedirects::Limit(limit))
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("headers", &self.headers)
            .field("follow_redirects", &self.follow_redirects)
            .field("transport", &self.transport.as_ref().map(|_| ".."))
            .finish()
    }
}

fn deserialize_headers<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(String, String)>, D::Error> {
    let map = serde_json::Map::deserialize(deserializer)?;
    map.into_iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(value) => Ok((name, value)),
            other => Err(serde::de::Error::custom(format!(
                "header `{name}` must be a string, got {other}"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_redirects_limits() {
        assert_eq!(FollowRedirects::Disabled.limit(), None);
        assert_eq!(FollowRedirects::Enabled.limit(), Some(10));
        assert_eq!(FollowRedirects::Limit(3).limit(), Some(3));
        assert_eq!(FollowRedirects::Limit(0).limit(), None);
    }

    #[test]
    fn deserialize_bool_and_integer() {
        let opts: Options = serde_json::from_str(r#"{"followRedirects": true}"#).unwrap();
        assert_eq!(opts.follow_redirects, FollowRedirects::Enabled);

        let opts: Options = serde_json::from_str(r#"{"followRedirects": 4}"#).unwrap();
        assert_eq!(opts.follow_redirects, FollowRedirects::Limit(4));

        let opts: Options = serde_json::from_str(r#"{"followRedirects": false}"#).unwrap();
        assert_eq!(opts.follow_redirects.limit(), None);
    }

    #[test]
    fn deserialize_headers_map() {
        let opts: Options =
            serde_json::from_str(r#"{"headers": {"accept": "text/plain", "x-trace": "1"}}"#).unwrap();
        assert!(opts.headers.contains(&("accept".to_string(), "text/plain".to_string())));
        assert!(opts.headers.contains(&("x-trace".to_string(), "1".to_string())));
        assert!(opts.transport.is_none());
    }

    #[test]
    fn deserialize_rejects_non_string_header() {
        let result: Result<Options, _> = serde_json::from_str(r#"{"headers": {"x-n": 1}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn defaults_do_not_follow() {
        let opts: Options = serde_json::from_str("{}").unwrap();
        assert!(opts.headers.is_empty());
        assert_eq!(opts.follow_redirects, FollowRedirects::Disabled);
    }
}
