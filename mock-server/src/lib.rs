use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// What `/echo` saw of a request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// `METHOD /path` of every request served, oldest first.
pub type RequestLog = Arc<RwLock<Vec<String>>>;

pub fn doc() -> Value {
    json!({ "a": "test", "doc": true, "arr": [{ "of": "things" }] })
}

pub fn app() -> Router {
    let log: RequestLog = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/doc", get(|| async { Json(doc()) }))
        .route("/empty", get(|| async { StatusCode::OK }))
        .route("/text", get(|| async { "this is not json" }))
        .route(
            "/error",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "internal error") }),
        )
        .route(
            "/error-json",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "internal error" }))) }),
        )
        .route("/redirect", get(|| async { found("/foobar") }))
        .route("/foobar", get(|| async { Json(json!({ "redirected": true })) }))
        .route("/chain/{n}", get(chain))
        .route("/echo", post(echo).put(echo).delete(echo))
        .route("/requests", get(requests))
        .layer(middleware::from_fn_with_state(log.clone(), record))
        .with_state(log)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// `n` relative redirects before landing on a JSON document.
async fn chain(Path(n): Path<u32>) -> Response {
    if n == 0 {
        return Json(json!({ "hops": "done" })).into_response();
    }
    found(&(n - 1).to_string())
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(Echo {
        method: method.to_string(),
        accept: text(header::ACCEPT),
        content_type: text(header::CONTENT_TYPE),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn requests(State(log): State<RequestLog>) -> Json<Vec<String>> {
    Json(log.read().await.clone())
}

async fn record(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    if request.uri().path() != "/requests" {
        log.write()
            .await
            .push(format!("{} {}", request.method(), request.uri().path()));
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "POST".to_string(),
            accept: Some("application/json".to_string()),
            content_type: None,
            body: "{}".to_string(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["accept"], "application/json");
        assert!(json["content_type"].is_null());
        assert_eq!(json["body"], "{}");
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "PUT".to_string(),
            accept: None,
            content_type: Some("text/plain".to_string()),
            body: "not json".to_string(),
        };
        let back: Echo = serde_json::from_str(&serde_json::to_string(&echo).unwrap()).unwrap();
        assert_eq!(back, echo);
    }

    #[test]
    fn doc_has_nested_array() {
        assert_eq!(doc()["arr"][0]["of"], "things");
    }
}
