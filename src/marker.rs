//! Markers are the transport-mapping metadata attached to parameters, result
//! fields and methods of an interface.
//!
//! - [`ParameterMarker`] places one argument value into the outgoing request.
//! - [`ResponseMarker`] derives one result field from the raw response.
//! - [`MethodMarker`] prepares the request for the whole method and may wrap
//!   the bound call with cross-cutting behavior.
//!
//! Markers are immutable. An [`Annotation`] is the ordered list of markers
//! attached to one target; the `*_markers` extractors pick out the markers of
//! one kind while preserving declaration order.

use crate::arguments::{Arguments, BoundArguments};
use crate::backend::{Backend, ServiceMethod};
use crate::error::Error;
use crate::mode::Mode;
use crate::protocol::{Outcome, Protocol};
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Result of one bound call, before the typed facade downcasts it.
pub type CallResult = Result<Outcome, Error>;

/// Continuation handed to [`MethodMarker::around_async`].
pub type AsyncNext = Arc<dyn Fn(Arguments) -> BoxFuture<'static, CallResult> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Parameter,
    Response,
    Method,
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerKind::Parameter => write!(f, "parameter"),
            MarkerKind::Response => write!(f, "response"),
            MarkerKind::Method => write!(f, "method"),
        }
    }
}

/// Places one call-time argument into the outgoing request.
///
/// Markers targeting the same request location must accumulate values rather
/// than overwrite them.
pub trait ParameterMarker<P: Protocol>: fmt::Debug + Send + Sync + 'static {
    fn apply(&self, request: &mut P::Request, value: &Value) -> Result<(), String>;

    /// Validates the marker's own configuration at bind time.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Derives one result field's value from the raw backend response.
pub trait ResponseMarker<P: Protocol>: fmt::Debug + Send + Sync + 'static {
    fn apply(&self, response: &P::Response) -> Result<Value, String>;

    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Rule applying to an entire method.
///
/// `prepare_request` runs while the request is built, before any parameter
/// marker. The `around_*` hooks wrap the bound call; the defaults pass the
/// call through unchanged.
pub trait MethodMarker<P: Protocol>: fmt::Debug + Send + Sync + 'static {
    fn prepare_request(
        &self,
        _request: &mut P::Request,
        _arguments: &BoundArguments,
    ) -> Result<(), String> {
        Ok(())
    }

    fn around_blocking(
        &self,
        arguments: Arguments,
        next: &dyn Fn(Arguments) -> CallResult,
    ) -> CallResult {
        next(arguments)
    }

    fn around_async(&self, arguments: Arguments, next: AsyncNext) -> BoxFuture<'static, CallResult> {
        next(arguments)
    }

    /// Validates the marker against the method's parameter names at bind time.
    fn check(&self, _parameters: &[&str]) -> Result<(), String> {
        Ok(())
    }
}

/// One marker of any kind.
#[derive(Debug)]
pub enum Marker<P: Protocol> {
    Parameter(Arc<dyn ParameterMarker<P>>),
    Response(Arc<dyn ResponseMarker<P>>),
    Method(Arc<dyn MethodMarker<P>>),
}

impl<P: Protocol> Clone for Marker<P> {
    fn clone(&self) -> Self {
        match self {
            Marker::Parameter(marker) => Marker::Parameter(Arc::clone(marker)),
            Marker::Response(marker) => Marker::Response(Arc::clone(marker)),
            Marker::Method(marker) => Marker::Method(Arc::clone(marker)),
        }
    }
}

impl<P: Protocol> Marker<P> {
    pub fn parameter(marker: impl ParameterMarker<P>) -> Self {
        Marker::Parameter(Arc::new(marker))
    }

    pub fn response(marker: impl ResponseMarker<P>) -> Self {
        Marker::Response(Arc::new(marker))
    }

    pub fn method(marker: impl MethodMarker<P>) -> Self {
        Marker::Method(Arc::new(marker))
    }

    pub fn kind(&self) -> MarkerKind {
        match self {
            Marker::Parameter(_) => MarkerKind::Parameter,
            Marker::Response(_) => MarkerKind::Response,
            Marker::Method(_) => MarkerKind::Method,
        }
    }
}

/// Ordered markers attached to a parameter, a result field or a method.
#[derive(Debug)]
pub struct Annotation<P: Protocol> {
    markers: Vec<Marker<P>>,
}

impl<P: Protocol> Default for Annotation<P> {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
        }
    }
}

impl<P: Protocol> Clone for Annotation<P> {
    fn clone(&self) -> Self {
        Self {
            markers: self.markers.clone(),
        }
    }
}

impl<P: Protocol> Annotation<P> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, marker: impl Into<Marker<P>>) -> Self {
        self.push(marker);
        self
    }

    pub fn push(&mut self, marker: impl Into<Marker<P>>) {
        self.markers.push(marker.into());
    }

    pub fn markers(&self) -> &[Marker<P>] {
        &self.markers
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn parameter_markers(&self) -> Vec<Arc<dyn ParameterMarker<P>>> {
        self.markers
            .iter()
            .filter_map(|marker| match marker {
                Marker::Parameter(marker) => Some(Arc::clone(marker)),
                _ => None,
            })
            .collect()
    }

    pub fn response_markers(&self) -> Vec<Arc<dyn ResponseMarker<P>>> {
        self.markers
            .iter()
            .filter_map(|marker| match marker {
                Marker::Response(marker) => Some(Arc::clone(marker)),
                _ => None,
            })
            .collect()
    }

    pub fn method_markers(&self) -> Vec<Arc<dyn MethodMarker<P>>> {
        self.markers
            .iter()
            .filter_map(|marker| match marker {
                Marker::Method(marker) => Some(Arc::clone(marker)),
                _ => None,
            })
            .collect()
    }

    /// First marker whose kind differs from `expected`, if any.
    pub(crate) fn foreign_kind(&self, expected: MarkerKind) -> Option<MarkerKind> {
        self.markers
            .iter()
            .map(Marker::kind)
            .find(|kind| *kind != expected)
    }
}

/// Wraps a bound method with one method marker, keeping its signature.
pub fn wrap<B: Backend>(
    method: ServiceMethod<B>,
    marker: Arc<dyn MethodMarker<B::Protocol>>,
) -> ServiceMethod<B> {
    Arc::new(move |backend: &Arc<B>, arguments: Arguments| {
        <B::Mode as Mode>::around(&marker, Arc::clone(&method), Arc::clone(backend), arguments)
    })
}

/// Folds `markers` over `method` in declaration order: the last marker
/// becomes the outermost wrapper.
pub fn wrap_all<B: Backend>(
    method: ServiceMethod<B>,
    markers: &[Arc<dyn MethodMarker<B::Protocol>>],
) -> ServiceMethod<B> {
    markers
        .iter()
        .fold(method, |method, marker| wrap(method, Arc::clone(marker)))
}
