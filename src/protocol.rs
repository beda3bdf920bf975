use serde_json::Value;
use std::any::Any;
use std::fmt;

/// A transport protocol family (HTTP, SOAP, ...).
///
/// The protocol fixes the request representation that parameter and method
/// markers write into, and the raw response representation that response
/// markers read from. Backends speaking the same protocol share markers.
pub trait Protocol: fmt::Debug + Clone + Send + Sync + 'static {
    /// Outgoing request; every call starts from `Default::default()`.
    type Request: Default + fmt::Debug + Send + 'static;

    /// Raw response handed back by the backend transport.
    type Response: fmt::Debug + Send + 'static;

    /// Extracts the structured payload the result record is decoded from.
    fn payload(response: &Self::Response) -> Result<Value, String>;
}

/// A decoded, type-erased result record.
pub type Outcome = Box<dyn Any + Send>;
