use crate::arguments::Arguments;
use crate::backend::{Backend, ServiceMethod};
use crate::error::Error;
use crate::marker::{AsyncNext, CallResult, MethodMarker};
use crate::protocol::Outcome;
use futures::future::{self, BoxFuture};
use std::any::type_name;
use std::sync::Arc;

/// Execution mode of a backend.
///
/// Blocking and non-blocking backends satisfy the same binder contract; the
/// mode only decides what a bound call hands back to its caller and how a
/// method marker wraps it.
pub trait Mode: Send + Sync + 'static {
    /// What an erased bound call returns.
    type Output: Send + 'static;

    /// What a typed interface method returns for result type `T`.
    type Typed<T: Send + 'static>;

    /// Runs `method` on `backend` through `marker`'s wrapping hook.
    fn around<B: Backend<Mode = Self>>(
        marker: &Arc<dyn MethodMarker<B::Protocol>>,
        method: ServiceMethod<B>,
        backend: Arc<B>,
        arguments: Arguments,
    ) -> Self::Output;

    /// Lifts an already known outcome into this mode.
    fn ready(result: CallResult) -> Self::Output;

    /// Narrows an erased output to the declared result type.
    fn typed<T: Send + 'static>(method: &str, output: Self::Output) -> Self::Typed<T>;

    /// A typed output that fails with `error` without calling anything.
    fn fail<T: Send + 'static>(error: Error) -> Self::Typed<T>;
}

/// Calls run to completion on the caller's thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocking;

/// Calls return a future that suspends once, at the transport call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonBlocking;

impl Mode for Blocking {
    type Output = CallResult;
    type Typed<T: Send + 'static> = Result<T, Error>;

    fn around<B: Backend<Mode = Self>>(
        marker: &Arc<dyn MethodMarker<B::Protocol>>,
        method: ServiceMethod<B>,
        backend: Arc<B>,
        arguments: Arguments,
    ) -> Self::Output {
        marker.around_blocking(arguments, &|arguments| method(&backend, arguments))
    }

    fn ready(result: CallResult) -> Self::Output {
        result
    }

    fn typed<T: Send + 'static>(method: &str, output: Self::Output) -> Self::Typed<T> {
        output.and_then(|outcome| downcast(method, outcome))
    }

    fn fail<T: Send + 'static>(error: Error) -> Self::Typed<T> {
        Err(error)
    }
}

impl Mode for NonBlocking {
    type Output = BoxFuture<'static, CallResult>;
    type Typed<T: Send + 'static> = BoxFuture<'static, Result<T, Error>>;

    fn around<B: Backend<Mode = Self>>(
        marker: &Arc<dyn MethodMarker<B::Protocol>>,
        method: ServiceMethod<B>,
        backend: Arc<B>,
        arguments: Arguments,
    ) -> Self::Output {
        let next: AsyncNext = Arc::new(move |arguments| method(&backend, arguments));
        marker.around_async(arguments, next)
    }

    fn ready(result: CallResult) -> Self::Output {
        Box::pin(future::ready(result))
    }

    fn typed<T: Send + 'static>(method: &str, output: Self::Output) -> Self::Typed<T> {
        let method = method.to_owned();
        Box::pin(async move { downcast(&method, output.await?) })
    }

    fn fail<T: Send + 'static>(error: Error) -> Self::Typed<T> {
        Box::pin(future::ready(Err(error)))
    }
}

fn downcast<T: Send + 'static>(method: &str, outcome: Outcome) -> Result<T, Error> {
    outcome
        .downcast::<T>()
        .map(|record| *record)
        .map_err(|_| Error::Decode {
            method: method.to_owned(),
            result_type: type_name::<T>().to_owned(),
            field: None,
            reason: "bound method produced a different result type".to_owned(),
        })
}
