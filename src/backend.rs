use crate::arguments::Arguments;
use crate::error::{BoxError, Error};
use crate::marker::CallResult;
use crate::mode::{Blocking, Mode, NonBlocking};
use crate::protocol::Protocol;
use crate::request::{build_request, decode_response};
use crate::signature::Signature;
use futures::future::{self, BoxFuture};
use std::sync::Arc;
use tracing::Instrument;

type RequestOf<B> = <<B as Backend>::Protocol as Protocol>::Request;
type ResponseOf<B> = <<B as Backend>::Protocol as Protocol>::Response;

/// A callable installed on a bound service for one interface method.
///
/// It receives the backend held by the bound service and the call-time
/// arguments.
pub type ServiceMethod<B> = Arc<
    dyn Fn(&Arc<B>, Arguments) -> <<B as Backend>::Mode as Mode>::Output + Send + Sync,
>;

/// Turns a method signature into a [`ServiceMethod`].
///
/// A plain function pointer, so that its address can serve as the binder's
/// identity in the binder table.
pub type MethodBinder<B> = fn(Arc<Signature<<B as Backend>::Protocol>>) -> ServiceMethod<B>;

/// A transport backend that interfaces can be bound to.
pub trait Backend: Send + Sync + Sized + 'static {
    type Protocol: Protocol;
    type Mode: Mode;

    /// The backend's method binder.
    fn binder(&self) -> MethodBinder<Self>;
}

/// Guard returned by [`RequestScope::enter`]; dropping it releases the scope.
pub type ScopeGuard = Box<dyn Send>;

/// A resource acquired around every transport call of a backend.
///
/// The guard is dropped on every exit path: success, transport error, and
/// cancellation of an async call.
pub trait RequestScope: Send + Sync + 'static {
    fn enter(&self, method: &str) -> ScopeGuard;
}

/// Blocking transport call.
pub trait Transport: Backend<Mode = Blocking> {
    fn send(&self, request: RequestOf<Self>) -> Result<ResponseOf<Self>, BoxError>;

    fn request_scope(&self) -> Option<&dyn RequestScope> {
        None
    }
}

/// Asynchronous transport call.
#[async_trait::async_trait]
pub trait AsyncTransport: Backend<Mode = NonBlocking> {
    async fn send(&self, request: RequestOf<Self>) -> Result<ResponseOf<Self>, BoxError>;

    fn request_scope(&self) -> Option<&dyn RequestScope> {
        None
    }
}

/// Method binder shared by blocking backends.
///
/// Per call: bind arguments and build the request, send it inside the
/// backend's request scope, decode the response.
pub fn bind_blocking_method<B: Transport>(signature: Arc<Signature<B::Protocol>>) -> ServiceMethod<B> {
    Arc::new(move |backend: &Arc<B>, arguments: Arguments| -> CallResult {
        let request = build_request(&signature, &arguments)?;

        let span = tracing::debug_span!("bound_call", method = %signature.name());
        let _entered = span.enter();

        let response = {
            let _scope = backend
                .request_scope()
                .map(|scope| scope.enter(signature.name()));
            Transport::send(backend.as_ref(), request).map_err(|source| Error::Transport {
                method: signature.name().to_owned(),
                source,
            })?
        };

        decode_response(&signature, &response)
    })
}

/// Method binder shared by async backends.
///
/// Identical to [`bind_blocking_method`] except that the transport call is
/// awaited. Request building happens before the returned future is created.
pub fn bind_async_method<B: AsyncTransport>(signature: Arc<Signature<B::Protocol>>) -> ServiceMethod<B> {
    Arc::new(
        move |backend: &Arc<B>, arguments: Arguments| -> BoxFuture<'static, CallResult> {
            let request = match build_request(&signature, &arguments) {
                Ok(request) => request,
                Err(error) => return Box::pin(future::ready(Err(error))),
            };

            let backend = Arc::clone(backend);
            let signature = Arc::clone(&signature);
            let span = tracing::debug_span!("bound_call", method = %signature.name());

            Box::pin(
                async move {
                    let response = {
                        let _scope = AsyncTransport::request_scope(backend.as_ref())
                            .map(|scope| scope.enter(signature.name()));
                        AsyncTransport::send(backend.as_ref(), request)
                            .await
                            .map_err(|source| Error::Transport {
                                method: signature.name().to_owned(),
                                source,
                            })?
                    };

                    decode_response(&signature, &response)
                }
                .instrument(span),
            )
        },
    )
}
