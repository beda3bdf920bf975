use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde_json::{Map, Value};
use wirebind::Protocol;

/// The HTTP protocol family.
#[derive(Debug, Clone, Copy, Default)]
pub struct Http;

impl Protocol for Http {
    type Request = HttpRequest;
    type Response = HttpResponse;

    /// JSON bodies decode as JSON, other UTF-8 bodies as a JSON string, and
    /// empty bodies as `null`.
    fn payload(response: &HttpResponse) -> Result<Value, String> {
        if response.body.is_empty() {
            return Ok(Value::Null);
        }

        match serde_json::from_slice(&response.body) {
            Ok(value) => Ok(value),
            Err(_) => std::str::from_utf8(&response.body)
                .map(|text| Value::String(text.to_owned()))
                .map_err(|error| format!("response body is neither JSON nor text: {error}")),
        }
    }
}

/// Transport-neutral HTTP request assembled by the HTTP markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpRequest {
    pub method: Option<Method>,
    pub path: Option<String>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl HttpRequest {
    /// The request method; `GET` unless a method marker set one.
    pub fn method_or_default(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }

    /// The request path; `/` unless a path marker set one.
    pub fn path_or_default(&self) -> &str {
        self.path.as_deref().unwrap_or("/")
    }

    /// The JSON body as an object, creating an empty one if needed.
    pub fn json_object(&mut self) -> Result<&mut Map<String, Value>, String> {
        match self.json.get_or_insert_with(|| Value::Object(Map::new())) {
            Value::Object(object) => Ok(object),
            other => Err(format!("JSON body is already set to a non-object value: {other}")),
        }
    }
}

/// Raw HTTP response handed back by an HTTP backend.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}
