use crate::marker::{Annotation, Marker};
use crate::protocol::Protocol;
use crate::record::{Record, ResultType};
use crate::signature::Parameter;

/// How a declared method is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// Takes the service instance (`&self`); the only bindable kind.
    Instance,
    /// Associated function without a receiver.
    Static,
}

/// Reflectable description of one interface method.
#[derive(Debug)]
pub struct MethodSpec<P: Protocol> {
    name: String,
    doc: Vec<String>,
    receiver: Receiver,
    is_abstract: bool,
    parameters: Vec<Parameter<P>>,
    annotation: Annotation<P>,
    returns: Option<ResultType<P>>,
}

impl<P: Protocol> Clone for MethodSpec<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            doc: self.doc.clone(),
            receiver: self.receiver,
            is_abstract: self.is_abstract,
            parameters: self.parameters.clone(),
            annotation: self.annotation.clone(),
            returns: self.returns.clone(),
        }
    }
}

impl<P: Protocol> MethodSpec<P> {
    /// An abstract instance method with no parameters and no declared result.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: Vec::new(),
            receiver: Receiver::Instance,
            is_abstract: true,
            parameters: Vec::new(),
            annotation: Annotation::default(),
            returns: None,
        }
    }

    #[must_use]
    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }

    #[must_use]
    pub fn receiver(mut self, receiver: Receiver) -> Self {
        self.receiver = receiver;
        self
    }

    /// Marks the method as already provided by the interface itself.
    #[must_use]
    pub fn provided(mut self) -> Self {
        self.is_abstract = false;
        self
    }

    #[must_use]
    pub fn parameter(mut self, parameter: Parameter<P>) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn marker(mut self, marker: impl Into<Marker<P>>) -> Self {
        self.annotation.push(marker);
        self
    }

    #[must_use]
    pub fn returns<R: Record<P>>(mut self) -> Self {
        self.returns = Some(ResultType::of::<R>());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc_lines(&self) -> &[String] {
        &self.doc
    }

    pub fn receiver_kind(&self) -> Receiver {
        self.receiver
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn parameters(&self) -> &[Parameter<P>] {
        &self.parameters
    }

    pub fn annotation(&self) -> &Annotation<P> {
        &self.annotation
    }

    /// The declared result type, if any.
    pub fn return_type(&self) -> Option<&ResultType<P>> {
        self.returns.as_ref()
    }

    /// Whether a bound implementation installs this method: an instance
    /// method whose name does not mark it private.
    pub fn is_bindable(&self) -> bool {
        self.receiver == Receiver::Instance && !self.name.starts_with('_')
    }
}

/// Everything the binder needs to know about an interface.
#[derive(Debug)]
pub struct Interface<P: Protocol> {
    name: String,
    methods: Vec<MethodSpec<P>>,
}

impl<P: Protocol> Interface<P> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn method(mut self, method: MethodSpec<P>) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[MethodSpec<P>] {
        &self.methods
    }
}

/// A service interface that can be bound to a backend.
///
/// Usually implemented by [`service!`](crate::service) for the trait object
/// type of the declared trait.
pub trait ServiceInterface: 'static {
    type Protocol: Protocol;

    fn describe() -> Interface<Self::Protocol>;
}
