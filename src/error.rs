use crate::marker::MarkerKind;
use thiserror::Error;

/// Boxed error used as the source of transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Raised while binding an interface to a backend.
///
/// These always indicate a defect in the interface declaration or in one of
/// its markers, and are reported before any call is made.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BindingError {
    #[error("interface `{interface}` declares method `{method}` more than once")]
    DuplicateMethod { interface: String, method: String },

    #[error("method `{method}` declares parameter `{parameter}` more than once")]
    DuplicateParameter { method: String, parameter: String },

    #[error(
        "method `{method}`: parameter `{parameter}` has no default but follows a positional parameter with one"
    )]
    MissingDefault { method: String, parameter: String },

    #[error(
        "method `{method}`: parameter `{parameter}` is out of order; positional-only parameters come first and keyword-only last"
    )]
    MisorderedParameter { method: String, parameter: String },

    #[error("method `{method}`: {target} carries a {found} marker, expected {expected} markers only")]
    MisplacedMarker {
        method: String,
        target: String,
        expected: MarkerKind,
        found: MarkerKind,
    },

    #[error("method `{method}`: malformed marker on {target}: {reason}")]
    MalformedMarker {
        method: String,
        target: String,
        reason: String,
    },

    #[error("interface `{interface}` leaves abstract method `{method}` unimplemented")]
    Unimplemented { interface: String, method: String },

    #[error("service `{service}` has no bound method `{method}`")]
    UnknownMethod { service: String, method: String },

    #[error("binder table entry for `{interface}` has an unexpected class type")]
    ClassMismatch { interface: String },
}

/// Raised when call-time arguments do not satisfy a method's parameters.
///
/// Always reported before the backend is contacted.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArgumentError {
    #[error("`{method}` is missing required argument `{parameter}`")]
    Missing { method: String, parameter: String },

    #[error("`{method}` got an unexpected keyword argument `{parameter}`")]
    UnexpectedKeyword { method: String, parameter: String },

    #[error("`{method}` got multiple values for argument `{parameter}`")]
    MultipleValues { method: String, parameter: String },

    #[error("`{method}` takes {expected} positional arguments but {given} were given")]
    TooManyPositional {
        method: String,
        expected: usize,
        given: usize,
    },

    #[error("`{method}`: positional-only argument `{parameter}` was passed by keyword")]
    PositionalOnly { method: String, parameter: String },

    #[error("`{method}`: argument `{parameter}` is invalid: {reason}")]
    Invalid {
        method: String,
        parameter: String,
        reason: String,
    },

    #[error("`{method}`: request could not be prepared: {reason}")]
    Request { method: String, reason: String },
}

/// Error returned by a bound service method.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Arguments(#[from] ArgumentError),

    /// The backend failed to execute the request or answered with a
    /// non-success status. Decoding is never attempted afterwards.
    #[error("`{method}` transport call failed: {source}")]
    Transport {
        method: String,
        #[source]
        source: BoxError,
    },

    #[error("`{method}` could not decode `{result_type}`{}: {reason}", field_suffix(.field))]
    Decode {
        method: String,
        result_type: String,
        field: Option<String>,
        reason: String,
    },
}

impl Error {
    /// `true` for failures raised by the backend transport.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

fn field_suffix(field: &Option<String>) -> String {
    match field {
        Some(field) => format!(" field `{field}`"),
        None => String::new(),
    }
}
