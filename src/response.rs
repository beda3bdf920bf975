use crate::protocol::Protocol;
use crate::record::{FieldAnnotation, Record};
use serde::Deserialize;

/// A result shape the remote side uses to report a failure in-band.
///
/// A fault decodes like any other record; [`Fault::into_error`] turns it into
/// the error the caller raises.
pub trait Fault {
    type Error: std::error::Error + Send + Sync + 'static;

    fn into_error(self) -> Self::Error;
}

/// A declared result that is either the success record `S` or the fault `F`.
///
/// Decoding tries the alternatives in order: the fault shape first, then the
/// success shape. The payload is a decoding error when neither matches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Response<S, F> {
    Fault(F),
    Success(S),
}

impl<S, F: Fault> Response<S, F> {
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Response::Fault(_))
    }

    pub fn success(self) -> Option<S> {
        match self {
            Response::Success(success) => Some(success),
            Response::Fault(_) => None,
        }
    }

    pub fn fault(self) -> Option<F> {
        match self {
            Response::Fault(fault) => Some(fault),
            Response::Success(_) => None,
        }
    }

    /// The success record, or the fault's error.
    pub fn into_result(self) -> Result<S, F::Error> {
        match self {
            Response::Success(success) => Ok(success),
            Response::Fault(fault) => Err(fault.into_error()),
        }
    }

    /// Fails with the fault's error if this is a fault, keeping the response.
    pub fn raise_for_result(&self) -> Result<(), F::Error>
    where
        F: Clone,
    {
        match self {
            Response::Success(_) => Ok(()),
            Response::Fault(fault) => Err(fault.clone().into_error()),
        }
    }
}

impl<P, S, F> Record<P> for Response<S, F>
where
    P: Protocol,
    S: Record<P>,
    F: Record<P> + Fault,
{
    fn field_annotations() -> Vec<FieldAnnotation<P>> {
        let mut fields = F::field_annotations();
        fields.extend(S::field_annotations());
        fields
    }

    fn field_names() -> Option<Vec<&'static str>> {
        let mut names = F::field_names()?;
        names.extend(S::field_names()?);
        Some(names)
    }
}
