use crate::error::ArgumentError;
use serde::Serialize;
use serde_json::Value;

/// Call-time arguments as handed to a bound method: positional values
/// followed by keyword values, both in call order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<Value>,
    keyword: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Appends a keyword argument.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_keyword(name, value);
        self
    }

    pub fn push_positional(&mut self, value: impl Into<Value>) {
        self.positional.push(value.into());
    }

    pub fn push_keyword(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.keyword.push((name.into(), value.into()));
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &[(String, Value)] {
        &self.keyword
    }
}

/// Arguments resolved against a method's formal parameters, defaults
/// included, in parameter declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    values: Vec<(String, Value)>,
}

impl BoundArguments {
    pub(crate) fn from_values(values: Vec<(String, Value)>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(parameter, _)| parameter == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Serializes a typed argument for the dispatch table.
///
/// Used by the code generated with [`service!`](crate::service).
pub fn serialize_argument<T: Serialize + ?Sized>(
    method: &str,
    parameter: &str,
    value: &T,
) -> Result<Value, ArgumentError> {
    serde_json::to_value(value).map_err(|error| ArgumentError::Invalid {
        method: method.to_owned(),
        parameter: parameter.to_owned(),
        reason: error.to_string(),
    })
}

/// Serializes a declared default value as the parameter's type `T`.
pub fn serialize_default<T: Serialize, V: Into<T>>(value: V) -> Result<Value, serde_json::Error> {
    serde_json::to_value(value.into())
}
