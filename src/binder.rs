use crate::arguments::Arguments;
use crate::backend::{Backend, MethodBinder, ServiceMethod};
use crate::binder_table::{BinderKey, ClassEntry, binder_table};
use crate::error::BindingError;
use crate::interface::ServiceInterface;
use crate::marker::wrap_all;
use crate::mode::Mode;
use crate::signature::Signature;
use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A bound method: its signature and the wrapped callable installed for it.
pub struct InstalledMethod<B: Backend> {
    signature: Arc<Signature<B::Protocol>>,
    call: ServiceMethod<B>,
}

impl<B: Backend> InstalledMethod<B> {
    pub fn signature(&self) -> &Signature<B::Protocol> {
        &self.signature
    }
}

/// The implementation of interface `I` synthesized for backend type `B`.
///
/// Built once per interface, backend type and binder, then shared through the
/// binder table. Immutable after construction.
pub struct ServiceClass<I: ?Sized, B: Backend> {
    name: String,
    interface: String,
    methods: HashMap<String, InstalledMethod<B>>,
    _interface: PhantomData<fn(&I)>,
}

impl<I, B> ServiceClass<I, B>
where
    I: ServiceInterface<Protocol = B::Protocol> + ?Sized,
    B: Backend,
{
    /// Installs one wrapped callable per bindable method of `I`.
    pub fn build(binder: MethodBinder<B>) -> Result<Self, BindingError> {
        let interface = I::describe();
        let mut methods = HashMap::new();

        for method in interface.methods() {
            if !method.is_bindable() {
                if method.is_abstract() {
                    return Err(BindingError::Unimplemented {
                        interface: interface.name().to_owned(),
                        method: method.name().to_owned(),
                    });
                }
                continue;
            }

            if methods.contains_key(method.name()) {
                return Err(BindingError::DuplicateMethod {
                    interface: interface.name().to_owned(),
                    method: method.name().to_owned(),
                });
            }

            let signature = Arc::new(Signature::from_method(method)?);
            let call = wrap_all(binder(Arc::clone(&signature)), signature.method_markers());

            methods.insert(
                method.name().to_owned(),
                InstalledMethod { signature, call },
            );
        }

        let name = format!("BoundService[{}]", interface.name());
        tracing::debug!("Built `{}` with {} methods.", name, methods.len());

        Ok(Self {
            name,
            interface: interface.name().to_owned(),
            methods,
            _interface: PhantomData,
        })
    }
}

impl<I: ?Sized, B: Backend> ServiceClass<I, B> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interface_name(&self) -> &str {
        &self.interface
    }

    pub fn method(&self, name: &str) -> Option<&InstalledMethod<B>> {
        self.methods.get(name)
    }

    /// Names of the installed methods, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<I: ?Sized, B: Backend> fmt::Debug for ServiceClass<I, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClass")
            .field("name", &self.name)
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Returns the memoized implementation of `I` for binder `binder`.
///
/// The same interface, backend type and binder always yield the same `Arc`
/// while the entry stays in the binder table.
pub fn bind_class<I, B>(binder: MethodBinder<B>) -> Result<Arc<ServiceClass<I, B>>, BindingError>
where
    I: ServiceInterface<Protocol = B::Protocol> + ?Sized,
    B: Backend,
{
    let key = BinderKey {
        interface: TypeId::of::<I>(),
        backend: TypeId::of::<B>(),
        binder: binder as usize,
    };
    let table = binder_table();

    let entry = match table.get(&key) {
        Some(entry) => {
            tracing::debug!("Serving `{}` from the binder table.", type_name::<I>());
            entry
        }
        None => {
            // Built outside the table lock; a concurrent build of the same key
            // loses and adopts the stored class.
            let class: ClassEntry = Arc::new(ServiceClass::<I, B>::build(binder)?);
            let entry = table.get_or_insert(key, class);
            tracing::debug!("Installed `{}` in the binder table.", type_name::<I>());
            entry
        }
    };

    entry
        .downcast::<ServiceClass<I, B>>()
        .map_err(|_| BindingError::ClassMismatch {
            interface: type_name::<I>().to_owned(),
        })
}

/// Binds interface `I` to `backend`.
pub fn bind<I, B>(backend: B) -> Result<BoundService<I, B>, BindingError>
where
    I: ServiceInterface<Protocol = B::Protocol> + ?Sized,
    B: Backend,
{
    bind_shared(Arc::new(backend))
}

/// Binds interface `I` to a backend that is already shared.
pub fn bind_shared<I, B>(backend: Arc<B>) -> Result<BoundService<I, B>, BindingError>
where
    I: ServiceInterface<Protocol = B::Protocol> + ?Sized,
    B: Backend,
{
    let class = bind_class::<I, B>(backend.binder())?;
    Ok(BoundService { class, backend })
}

/// A ready-to-use service: interface `I` implemented on top of `backend`.
pub struct BoundService<I: ?Sized, B: Backend> {
    class: Arc<ServiceClass<I, B>>,
    backend: Arc<B>,
}

impl<I: ?Sized, B: Backend> BoundService<I, B> {
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn class(&self) -> &Arc<ServiceClass<I, B>> {
        &self.class
    }

    /// Invokes the installed method `method` with untyped arguments.
    pub fn call(&self, method: &str, arguments: Arguments) -> <B::Mode as Mode>::Output {
        match self.class.methods.get(method) {
            Some(installed) => (installed.call)(&self.backend, arguments),
            None => <B::Mode as Mode>::ready(Err(BindingError::UnknownMethod {
                service: self.class.name.clone(),
                method: method.to_owned(),
            }
            .into())),
        }
    }

    /// Invokes `method` and narrows its result to `T`.
    pub fn call_typed<T: Send + 'static>(
        &self,
        method: &str,
        arguments: Arguments,
    ) -> <B::Mode as Mode>::Typed<T> {
        <B::Mode as Mode>::typed(method, self.call(method, arguments))
    }
}

impl<I: ?Sized, B: Backend> Clone for BoundService<I, B> {
    fn clone(&self) -> Self {
        Self {
            class: Arc::clone(&self.class),
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<I: ?Sized, B: Backend> fmt::Debug for BoundService<I, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(&self.class.name).finish_non_exhaustive()
    }
}
