use crate::error::TransportError;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use wirebind_http::{HttpRequest, HttpResponse};

/// Bytes of a failed response body kept in [`TransportError::Status`].
const BODY_PREVIEW_LIMIT: usize = 512;

pub(crate) enum Body {
    Empty,
    Form(Vec<(String, String)>),
    Json(Value),
}

/// A marker-built request resolved against a base URL, ready to be handed to
/// either reqwest client.
pub(crate) struct Prepared {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Body,
}

pub(crate) fn prepare(base_url: &Url, request: &HttpRequest) -> Result<Prepared, TransportError> {
    let mut url = join(base_url, request.path_or_default())?;
    if !request.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &request.query {
            pairs.append_pair(name, value);
        }
    }

    let mut headers = HeaderMap::new();
    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|error| TransportError::Prepare(format!("header `{name}`: {error}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|error| TransportError::Prepare(format!("header `{name}`: {error}")))?;
        headers.append(name, value);
    }

    let body = match (request.form.is_empty(), &request.json) {
        (true, None) => Body::Empty,
        (false, None) => Body::Form(request.form.clone()),
        (true, Some(json)) => Body::Json(json.clone()),
        (false, Some(_)) => {
            return Err(TransportError::Prepare(
                "request carries both form fields and a JSON body".to_owned(),
            ));
        }
    };

    tracing::debug!("Prepared {} {}", request.method_or_default(), url);

    Ok(Prepared {
        method: request.method_or_default(),
        url,
        headers,
        body,
    })
}

/// Appends `path` to the base URL's path, keeping any prefix and query the
/// base carries. The base fragment is dropped.
fn join(base_url: &Url, path: &str) -> Result<Url, TransportError> {
    if base_url.cannot_be_a_base() {
        return Err(TransportError::Prepare(format!(
            "base URL `{base_url}` cannot carry a path"
        )));
    }

    let mut url = base_url.clone();
    url.set_path(&format!(
        "{}/{}",
        base_url.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    ));
    url.set_fragment(None);
    Ok(url)
}

/// Turns a received response into an [`HttpResponse`], or a status error for
/// anything outside 2xx.
pub(crate) fn finish(
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
) -> Result<HttpResponse, TransportError> {
    if !status.is_success() {
        let end = body.len().min(BODY_PREVIEW_LIMIT);
        return Err(TransportError::Status {
            status,
            body_preview: String::from_utf8_lossy(&body[..end]).into_owned(),
        });
    }
    Ok(HttpResponse::new(status, headers, body))
}
