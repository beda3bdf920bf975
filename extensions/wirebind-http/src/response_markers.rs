use crate::protocol::{Http, HttpResponse};
use http::HeaderName;
use serde_json::Value;
use wirebind::{Marker, ResponseMarker};

/// The numeric response status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseStatus;

impl ResponseMarker<Http> for ResponseStatus {
    fn apply(&self, response: &HttpResponse) -> Result<Value, String> {
        Ok(Value::from(response.status.as_u16()))
    }
}

/// The canonical reason phrase of the response status, `null` if unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReasonPhrase;

impl ResponseMarker<Http> for ReasonPhrase {
    fn apply(&self, response: &HttpResponse) -> Result<Value, String> {
        Ok(response
            .status
            .canonical_reason()
            .map_or(Value::Null, Value::from))
    }
}

/// One response header, `null` when the response does not carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeader(String);

impl ResponseHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl ResponseMarker<Http> for ResponseHeader {
    fn apply(&self, response: &HttpResponse) -> Result<Value, String> {
        match response.headers.get(self.0.as_str()) {
            None => Ok(Value::Null),
            Some(value) => value
                .to_str()
                .map(Value::from)
                .map_err(|error| format!("header `{}` is not text: {error}", self.0)),
        }
    }

    fn check(&self) -> Result<(), String> {
        HeaderName::from_bytes(self.0.as_bytes())
            .map(|_| ())
            .map_err(|error| format!("invalid header name `{}`: {error}", self.0))
    }
}

/// The response body as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Text;

impl ResponseMarker<Http> for Text {
    fn apply(&self, response: &HttpResponse) -> Result<Value, String> {
        std::str::from_utf8(&response.body)
            .map(Value::from)
            .map_err(|error| format!("response body is not UTF-8: {error}"))
    }
}

macro_rules! response_marker {
    ($($marker:ident),*) => {
        $(
            impl From<$marker> for Marker<Http> {
                fn from(marker: $marker) -> Self {
                    Marker::response(marker)
                }
            }
        )*
    };
}

response_marker!(ResponseStatus, ReasonPhrase, ResponseHeader, Text);
