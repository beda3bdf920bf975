//! Bind-time description of one interface method.
//!
//! A [`Signature`] is extracted once per method when an interface is bound
//! and is shared, read-only, by every call made through the bound method.
//! Extraction validates the declaration so that malformed parameters and
//! markers surface as [`BindingError`]s before any traffic.

use crate::arguments::{Arguments, BoundArguments};
use crate::error::{ArgumentError, BindingError};
use crate::interface::MethodSpec;
use crate::marker::{Annotation, Marker, MarkerKind, MethodMarker, ParameterMarker, ResponseMarker};
use crate::protocol::Protocol;
use crate::record::ResultType;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Bindable by position only.
    PositionalOnly,
    PositionalOrKeyword,
    /// Bindable by name only.
    KeywordOnly,
}

impl ParameterKind {
    fn accepts_position(self) -> bool {
        !matches!(self, ParameterKind::KeywordOnly)
    }
}

/// Value used for a parameter the caller did not supply.
#[derive(Clone)]
pub enum ParameterDefault {
    Value(Value),
    /// Evaluated again on every call.
    Factory(Arc<dyn Fn() -> Result<Value, serde_json::Error> + Send + Sync>),
}

impl ParameterDefault {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Value, serde_json::Error> + Send + Sync + 'static,
    {
        ParameterDefault::Factory(Arc::new(factory))
    }

    fn resolve(&self) -> Result<Value, serde_json::Error> {
        match self {
            ParameterDefault::Value(value) => Ok(value.clone()),
            ParameterDefault::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for ParameterDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
            ParameterDefault::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// One formal parameter of an interface method.
#[derive(Debug)]
pub struct Parameter<P: Protocol> {
    name: String,
    kind: ParameterKind,
    default: Option<ParameterDefault>,
    annotation: Annotation<P>,
}

impl<P: Protocol> Clone for Parameter<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            default: self.default.clone(),
            annotation: self.annotation.clone(),
        }
    }
}

impl<P: Protocol> Parameter<P> {
    /// A positional-or-keyword parameter without default or markers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::PositionalOrKeyword,
            default: None,
            annotation: Annotation::default(),
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: ParameterKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(ParameterDefault::Value(value.into()));
        self
    }

    /// Default computed by `factory` on every call that omits the argument.
    #[must_use]
    pub fn default_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<Value, serde_json::Error> + Send + Sync + 'static,
    {
        self.default = Some(ParameterDefault::factory(factory));
        self
    }

    #[must_use]
    pub fn annotated(mut self, annotation: Annotation<P>) -> Self {
        self.annotation = annotation;
        self
    }

    #[must_use]
    pub fn marker(mut self, marker: impl Into<Marker<P>>) -> Self {
        self.annotation.push(marker);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn default(&self) -> Option<&ParameterDefault> {
        self.default.as_ref()
    }

    pub fn annotation(&self) -> &Annotation<P> {
        &self.annotation
    }
}

/// A parameter marker together with the parameter whose value it places.
#[derive(Debug)]
pub struct BoundParameterMarker<P: Protocol> {
    pub name: String,
    pub marker: Arc<dyn ParameterMarker<P>>,
}

impl<P: Protocol> Clone for BoundParameterMarker<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            marker: Arc::clone(&self.marker),
        }
    }
}

/// The response markers of one result field, in declaration order.
#[derive(Debug)]
pub struct BoundResponseMarkers<P: Protocol> {
    pub name: String,
    pub markers: Vec<Arc<dyn ResponseMarker<P>>>,
}

impl<P: Protocol> Clone for BoundResponseMarkers<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            markers: self.markers.clone(),
        }
    }
}

#[derive(Debug)]
pub struct Signature<P: Protocol> {
    name: String,
    doc: Vec<String>,
    parameters: Vec<Parameter<P>>,
    method_markers: Vec<Arc<dyn MethodMarker<P>>>,
    return_type: ResultType<P>,
    parameter_markers: Vec<BoundParameterMarker<P>>,
    response_markers: Vec<BoundResponseMarkers<P>>,
}

impl<P: Protocol> Signature<P> {
    /// Extracts and validates the signature of `method`.
    pub fn from_method(method: &MethodSpec<P>) -> Result<Self, BindingError> {
        let name = method.name();
        let parameters = method.parameters();

        check_parameters(name, parameters)?;

        let parameter_names: Vec<&str> = parameters.iter().map(Parameter::name).collect();

        check_kind(name, "the method", method.annotation(), MarkerKind::Method)?;
        let method_markers = method.annotation().method_markers();
        for marker in &method_markers {
            marker
                .check(&parameter_names)
                .map_err(|reason| BindingError::MalformedMarker {
                    method: name.to_owned(),
                    target: "the method".to_owned(),
                    reason,
                })?;
        }

        let mut parameter_markers = Vec::new();
        for parameter in parameters {
            let target = format!("parameter `{}`", parameter.name());
            check_kind(name, &target, parameter.annotation(), MarkerKind::Parameter)?;

            for marker in parameter.annotation().parameter_markers() {
                marker.check().map_err(|reason| BindingError::MalformedMarker {
                    method: name.to_owned(),
                    target: target.clone(),
                    reason,
                })?;
                parameter_markers.push(BoundParameterMarker {
                    name: parameter.name().to_owned(),
                    marker,
                });
            }
        }

        let return_type = method.return_type().cloned().unwrap_or_else(ResultType::successful);

        let mut response_markers = Vec::new();
        for field in return_type.fields() {
            let target = format!("result field `{}`", field.name());
            check_kind(name, &target, field.annotation(), MarkerKind::Response)?;

            if let Some(known) = return_type.field_names() {
                if !known.contains(&field.name()) {
                    return Err(BindingError::MalformedMarker {
                        method: name.to_owned(),
                        target,
                        reason: format!("`{}` has no such field", return_type.name()),
                    });
                }
            }

            let markers = field.annotation().response_markers();
            for marker in &markers {
                marker.check().map_err(|reason| BindingError::MalformedMarker {
                    method: name.to_owned(),
                    target: target.clone(),
                    reason,
                })?;
            }

            if !markers.is_empty() {
                response_markers.push(BoundResponseMarkers {
                    name: field.name().to_owned(),
                    markers,
                });
            }
        }

        Ok(Self {
            name: name.to_owned(),
            doc: method.doc_lines().to_vec(),
            parameters: parameters.to_vec(),
            method_markers,
            return_type,
            parameter_markers,
            response_markers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &[String] {
        &self.doc
    }

    pub fn parameters(&self) -> &[Parameter<P>] {
        &self.parameters
    }

    pub fn method_markers(&self) -> &[Arc<dyn MethodMarker<P>>] {
        &self.method_markers
    }

    pub fn return_type(&self) -> &ResultType<P> {
        &self.return_type
    }

    pub fn parameter_markers(&self) -> &[BoundParameterMarker<P>] {
        &self.parameter_markers
    }

    pub fn response_markers(&self) -> &[BoundResponseMarkers<P>] {
        &self.response_markers
    }

    /// Maps call-time arguments onto the formal parameters.
    ///
    /// Positional values fill positional-capable parameters in order; keyword
    /// values are matched by name. Parameters left unfilled take their
    /// default, and factory defaults are evaluated here, once per call.
    pub fn bind_arguments(&self, arguments: &Arguments) -> Result<BoundArguments, ArgumentError> {
        let method = || self.name.clone();
        let mut slots: Vec<Option<Value>> = vec![None; self.parameters.len()];

        let positional_slots = self
            .parameters
            .iter()
            .take_while(|parameter| parameter.kind.accepts_position())
            .count();

        if arguments.positional().len() > positional_slots {
            return Err(ArgumentError::TooManyPositional {
                method: method(),
                expected: positional_slots,
                given: arguments.positional().len(),
            });
        }

        for (slot, value) in slots.iter_mut().zip(arguments.positional()) {
            *slot = Some(value.clone());
        }

        for (keyword, value) in arguments.keyword() {
            let Some(index) = self
                .parameters
                .iter()
                .position(|parameter| &parameter.name == keyword)
            else {
                return Err(ArgumentError::UnexpectedKeyword {
                    method: method(),
                    parameter: keyword.clone(),
                });
            };

            if self.parameters[index].kind == ParameterKind::PositionalOnly {
                return Err(ArgumentError::PositionalOnly {
                    method: method(),
                    parameter: keyword.clone(),
                });
            }

            if slots[index].is_some() {
                return Err(ArgumentError::MultipleValues {
                    method: method(),
                    parameter: keyword.clone(),
                });
            }

            slots[index] = Some(value.clone());
        }

        let mut values = Vec::with_capacity(self.parameters.len());
        for (parameter, slot) in self.parameters.iter().zip(slots) {
            let value = match (slot, &parameter.default) {
                (Some(value), _) => value,
                (None, Some(default)) => {
                    default.resolve().map_err(|error| ArgumentError::Invalid {
                        method: method(),
                        parameter: parameter.name.clone(),
                        reason: error.to_string(),
                    })?
                }
                (None, None) => {
                    return Err(ArgumentError::Missing {
                        method: method(),
                        parameter: parameter.name.clone(),
                    });
                }
            };
            values.push((parameter.name.clone(), value));
        }

        Ok(BoundArguments::from_values(values))
    }
}

fn check_parameters<P: Protocol>(method: &str, parameters: &[Parameter<P>]) -> Result<(), BindingError> {
    let mut seen = HashSet::new();
    let mut keyword_capable = false;
    let mut keyword_only = false;
    let mut defaulted_positional = false;

    for parameter in parameters {
        if !seen.insert(parameter.name()) {
            return Err(BindingError::DuplicateParameter {
                method: method.to_owned(),
                parameter: parameter.name().to_owned(),
            });
        }

        match parameter.kind {
            ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword if keyword_only => {
                return Err(BindingError::MisorderedParameter {
                    method: method.to_owned(),
                    parameter: parameter.name().to_owned(),
                });
            }
            ParameterKind::PositionalOnly if keyword_capable => {
                return Err(BindingError::MisorderedParameter {
                    method: method.to_owned(),
                    parameter: parameter.name().to_owned(),
                });
            }
            ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword => {
                if parameter.default.is_some() {
                    defaulted_positional = true;
                } else if defaulted_positional {
                    return Err(BindingError::MissingDefault {
                        method: method.to_owned(),
                        parameter: parameter.name().to_owned(),
                    });
                }
            }
            ParameterKind::KeywordOnly => keyword_only = true,
        }

        if parameter.kind != ParameterKind::PositionalOnly {
            keyword_capable = true;
        }
    }

    Ok(())
}

fn check_kind<P: Protocol>(
    method: &str,
    target: &str,
    annotation: &Annotation<P>,
    expected: MarkerKind,
) -> Result<(), BindingError> {
    match annotation.foreign_kind(expected) {
        Some(found) => Err(BindingError::MisplacedMarker {
            method: method.to_owned(),
            target: target.to_owned(),
            expected,
            found,
        }),
        None => Ok(()),
    }
}
