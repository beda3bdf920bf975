//! Note: this server is a local stand-in for the public httpbin service. It
//! implements only the handful of endpoints the Wirebind HTTP backends are
//! exercised against, and echoes requests without any authentication.

use axum::{
    Json, Router,
    body::Bytes,
    extract::Path,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use serde_json::{Map, Value};
use std::net::SocketAddr;
use tokio::net::{TcpListener, ToSocketAddrs};

/// Binds to an address and starts serving.
pub async fn serve<A: ToSocketAddrs>(addr: A) -> Result<SocketAddr, axum::BoxError> {
    let listener = TcpListener::bind(addr).await?;
    serve_with_listener(listener).await
}

/// Starts serving on a pre-bound `TcpListener`.
///
/// Bind the listener to port 0 to get an ephemeral port, then read it back
/// from `listener.local_addr()` before handing the listener over.
pub async fn serve_with_listener(listener: TcpListener) -> Result<SocketAddr, axum::BoxError> {
    let address = listener.local_addr()?;
    tracing::info!("Httpbin server running on {:?}", address);
    axum::serve(listener, router()).await?;
    Ok(address)
}

/// The routes served by [`serve_with_listener`].
pub fn router() -> Router {
    Router::new()
        .route("/anything", any(anything))
        .route("/anything/{*rest}", any(anything))
        .route("/headers", get(headers))
        .route("/status/{code}", any(status))
        .route("/response-headers", any(response_headers))
}

/// Echoes the method, query, form, JSON body and headers of the request.
async fn anything(method: Method, uri: Uri, request_headers: HeaderMap, body: Bytes) -> Json<Value> {
    let is_form = content_type_is(&request_headers, "application/x-www-form-urlencoded");
    let is_json = content_type_is(&request_headers, "application/json");

    let form = if is_form {
        group_pairs(&body)
    } else {
        Map::new()
    };
    let json = if is_json {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    } else {
        Value::Null
    };
    let data = if is_form {
        String::new()
    } else {
        String::from_utf8_lossy(&body).into_owned()
    };

    tracing::debug!("Echoing {} {}", method, uri);

    let mut echo = Map::new();
    echo.insert("method".to_owned(), Value::from(method.as_str()));
    echo.insert("url".to_owned(), Value::from(uri.to_string()));
    echo.insert(
        "args".to_owned(),
        Value::Object(group_pairs(uri.query().unwrap_or_default().as_bytes())),
    );
    echo.insert("form".to_owned(), Value::Object(form));
    echo.insert("data".to_owned(), Value::from(data));
    echo.insert("json".to_owned(), json);
    echo.insert("headers".to_owned(), Value::Object(header_map(&request_headers)));
    Json(Value::Object(echo))
}

async fn headers(request_headers: HeaderMap) -> Json<Value> {
    let mut echo = Map::new();
    echo.insert("headers".to_owned(), Value::Object(header_map(&request_headers)));
    Json(Value::Object(echo))
}

/// Answers with the requested status and an empty body.
async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => status.into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "invalid status code").into_response(),
    }
}

/// Sets every query pair as a response header and echoes them as JSON.
async fn response_headers(uri: Uri) -> Response {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(uri.query().unwrap_or_default()).unwrap_or_default();

    let mut response_headers = HeaderMap::new();
    for (name, value) in &pairs {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            return (StatusCode::BAD_REQUEST, "invalid header").into_response();
        };
        response_headers.append(name, value);
    }

    let body = group_pairs(uri.query().unwrap_or_default().as_bytes());
    (response_headers, Json(Value::Object(body))).into_response()
}

fn content_type_is(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(expected))
}

/// Decodes URL-encoded pairs; repeated keys collect into an array.
fn group_pairs(encoded: &[u8]) -> Map<String, Value> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(encoded).unwrap_or_default();

    let mut grouped = Map::new();
    for (name, value) in pairs {
        match grouped.get_mut(&name) {
            None => {
                grouped.insert(name, Value::String(value));
            }
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
        }
    }
    grouped
}

/// Header names in `Title-Case`, the way httpbin reports them.
fn header_map(headers: &HeaderMap) -> Map<String, Value> {
    let mut echoed = Map::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        let name = title_case(name.as_str());
        match echoed.get_mut(&name) {
            Some(Value::String(existing)) => {
                existing.push(',');
                existing.push_str(value);
            }
            _ => {
                echoed.insert(name, Value::from(value));
            }
        }
    }
    echoed
}

fn title_case(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_pairs_collects_repeated_keys() {
        let grouped = group_pairs(b"foo=42&barqux=100500&barqux=100501");

        assert_eq!(
            Value::Object(grouped),
            serde_json::json!({ "foo": "42", "barqux": ["100500", "100501"] })
        );
    }

    #[test]
    fn test_title_case_header_names() {
        assert_eq!(title_case("x-foo"), "X-Foo");
        assert_eq!(title_case("content-type"), "Content-Type");
    }
}
