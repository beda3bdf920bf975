use crate::protocol::{Http, HttpRequest};
use crate::render::render_values;
use http::{HeaderName, HeaderValue};
use serde_json::Value;
use wirebind::{Marker, ParameterMarker};

macro_rules! parameter_marker {
    ($marker:ident) => {
        impl From<$marker> for Marker<Http> {
            fn from(marker: $marker) -> Self {
                Marker::parameter(marker)
            }
        }
    };
}

/// Places the argument into the query string under the given name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam(String);

impl QueryParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl ParameterMarker<Http> for QueryParam {
    fn apply(&self, request: &mut HttpRequest, value: &Value) -> Result<(), String> {
        for rendered in render_values(value) {
            request.query.push((self.0.clone(), rendered));
        }
        Ok(())
    }
}

parameter_marker!(QueryParam);

/// Places the argument into a request header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header(String);

impl Header {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl ParameterMarker<Http> for Header {
    fn apply(&self, request: &mut HttpRequest, value: &Value) -> Result<(), String> {
        for rendered in render_values(value) {
            HeaderValue::from_str(&rendered)
                .map_err(|error| format!("invalid value for header `{}`: {error}", self.0))?;
            request.headers.push((self.0.clone(), rendered));
        }
        Ok(())
    }

    fn check(&self) -> Result<(), String> {
        HeaderName::from_bytes(self.0.as_bytes())
            .map(|_| ())
            .map_err(|error| format!("invalid header name `{}`: {error}", self.0))
    }
}

parameter_marker!(Header);

/// Places the argument into a URL-encoded form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField(String);

impl FormField {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl ParameterMarker<Http> for FormField {
    fn apply(&self, request: &mut HttpRequest, value: &Value) -> Result<(), String> {
        for rendered in render_values(value) {
            request.form.push((self.0.clone(), rendered));
        }
        Ok(())
    }
}

parameter_marker!(FormField);

/// Spreads a record argument over the form, one field per record field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormData;

impl ParameterMarker<Http> for FormData {
    fn apply(&self, request: &mut HttpRequest, value: &Value) -> Result<(), String> {
        match value {
            Value::Null => Ok(()),
            Value::Object(fields) => {
                for (name, field) in fields {
                    for rendered in render_values(field) {
                        request.form.push((name.clone(), rendered));
                    }
                }
                Ok(())
            }
            other => Err(format!("form data must be a record, got {other}")),
        }
    }
}

parameter_marker!(FormData);

/// Uses the argument as the JSON body.
///
/// A record merges into a body object built by earlier markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json;

impl ParameterMarker<Http> for Json {
    fn apply(&self, request: &mut HttpRequest, value: &Value) -> Result<(), String> {
        match (&mut request.json, value) {
            (_, Value::Null) => {}
            (Some(Value::Object(body)), Value::Object(fields)) => {
                body.extend(fields.iter().map(|(name, field)| (name.clone(), field.clone())));
            }
            (json, value) => *json = Some(value.clone()),
        }
        Ok(())
    }
}

parameter_marker!(Json);

/// Places the argument under one key of the JSON body object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonField(String);

impl JsonField {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl ParameterMarker<Http> for JsonField {
    fn apply(&self, request: &mut HttpRequest, value: &Value) -> Result<(), String> {
        request.json_object()?.insert(self.0.clone(), value.clone());
        Ok(())
    }
}

parameter_marker!(JsonField);
