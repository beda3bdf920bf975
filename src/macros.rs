//! Declarative macro for defining bindable service interfaces.
//!
//! [`service!`](crate::service) turns one trait-like declaration into:
//!
//! - the interface trait, generic over the execution mode through its
//!   associated `Mode` type, with one method per declaration;
//! - a [`ServiceInterface`](crate::ServiceInterface) description of the trait
//!   object type `dyn Trait<Mode = M>`, listing parameters, defaults and
//!   markers;
//! - the trait implementation for
//!   [`BoundService`](crate::BoundService), dispatching each method through
//!   the callable installed for it;
//! - an inherent `bind` constructor on `dyn Trait<Mode = M>`.
//!
//! # Example
//!
//! ```rust,ignore
//! wirebind::service! {
//!     /// Echo endpoints.
//!     pub trait Echo: Http {
//!         /// Echoes query parameters back.
//!         #[marker(HttpMethod::get())]
//!         #[marker(Path::new("/anything"))]
//!         fn echo(&self, foo: i64 => [QueryParam::new("foobar")], bar: &str = "default") -> Anything;
//!     }
//! }
//!
//! let echo = <dyn Echo<Mode = Blocking>>::bind(backend)?;
//! let anything = echo.echo(100500, None)?;
//! ```
//!
//! Parameters with a default (`= expr`) are exposed as `Option<T>`; `None`
//! leaves the argument out so the default applies. The default expression is
//! evaluated on every call that omits it. Methods without `-> T` return
//! [`SuccessfulResponse`](crate::SuccessfulResponse).
//!
//! # Attribute order
//!
//! Each method takes its `///` doc lines first, then its `#[marker(..)]`
//! attributes, then the `fn` item. Any other order is rejected with a
//! `malformed service! declaration` error:
//!
//! ```compile_fail
//! wirebind::service! {
//!     pub trait Echo: Http {
//!         #[marker(HttpMethod::get())]
//!         /// Documentation after a marker.
//!         fn echo(&self) -> Anything;
//!     }
//! }
//! ```

#[macro_export]
macro_rules! service {
    (@param_type $pty:ty) => { $pty };
    (@param_type $pty:ty, $default:expr) => { ::core::option::Option<$pty> };

    (@returns) => { $crate::SuccessfulResponse };
    (@returns $ret:ty) => { $ret };

    (@push $arguments:ident, $method:ident, $param:ident) => {
        $arguments.push_keyword(
            stringify!($param),
            $crate::serialize_argument(stringify!($method), stringify!($param), &$param)?,
        );
    };
    (@push $arguments:ident, $method:ident, $param:ident, $default:expr) => {
        if let ::core::option::Option::Some(value) = &$param {
            $arguments.push_keyword(
                stringify!($param),
                $crate::serialize_argument(stringify!($method), stringify!($param), value)?,
            );
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis trait $name:ident: $protocol:ty {
            $(
                $(#[doc = $mdoc:literal])*
                $(#[marker($mm:expr)])*
                fn $method:ident(
                    &self
                    $(, $param:ident: $pty:ty $(= $default:expr)? $(=> [$($pm:expr),* $(,)?])?)*
                    $(,)?
                ) $(-> $ret:ty)?;
            )*
        }
    ) => {
        $(#[$meta])*
        $vis trait $name: ::core::marker::Send + ::core::marker::Sync {
            type Mode: $crate::Mode;

            $(
                $(#[doc = $mdoc])*
                fn $method(
                    &self
                    $(, $param: $crate::service!(@param_type $pty $(, $default)?))*
                ) -> <Self::Mode as $crate::Mode>::Typed<$crate::service!(@returns $($ret)?)>;
            )*
        }

        impl<M: $crate::Mode> $crate::ServiceInterface for dyn $name<Mode = M> {
            type Protocol = $protocol;

            fn describe() -> $crate::Interface<$protocol> {
                $crate::Interface::new(stringify!($name))
                $(
                    .method(
                        $crate::MethodSpec::new(stringify!($method))
                        $(.doc($mdoc.trim()))*
                        $(
                            .parameter(
                                $crate::Parameter::new(stringify!($param))
                                $(.default_factory(|| $crate::serialize_default::<$pty, _>($default)))?
                                $($(.marker($pm))*)?
                            )
                        )*
                        $(.marker($mm))*
                        .returns::<$crate::service!(@returns $($ret)?)>()
                    )
                )*
            }
        }

        impl<B> $name for $crate::BoundService<dyn $name<Mode = <B as $crate::Backend>::Mode>, B>
        where
            B: $crate::Backend<Protocol = $protocol>,
        {
            type Mode = <B as $crate::Backend>::Mode;

            $(
                #[allow(unused_mut, clippy::redundant_closure_call)]
                fn $method(
                    &self
                    $(, $param: $crate::service!(@param_type $pty $(, $default)?))*
                ) -> <Self::Mode as $crate::Mode>::Typed<$crate::service!(@returns $($ret)?)> {
                    let arguments = (|| -> ::core::result::Result<$crate::Arguments, $crate::ArgumentError> {
                        let mut arguments = $crate::Arguments::new();
                        $($crate::service!(@push arguments, $method, $param $(, $default)?);)*
                        ::core::result::Result::Ok(arguments)
                    })();

                    match arguments {
                        ::core::result::Result::Ok(arguments) => self
                            .call_typed::<$crate::service!(@returns $($ret)?)>(stringify!($method), arguments),
                        ::core::result::Result::Err(error) => {
                            <<B as $crate::Backend>::Mode as $crate::Mode>::fail::<
                                $crate::service!(@returns $($ret)?),
                            >(error.into())
                        }
                    }
                }
            )*
        }

        impl<M: $crate::Mode> dyn $name<Mode = M> {
            /// Binds this interface to `backend`.
            #[allow(dead_code)]
            $vis fn bind<B>(
                backend: B,
            ) -> ::core::result::Result<$crate::BoundService<Self, B>, $crate::BindingError>
            where
                B: $crate::Backend<Protocol = $protocol, Mode = M>,
            {
                $crate::bind::<Self, B>(backend)
            }
        }
    };

    ($($tokens:tt)*) => {
        ::core::compile_error!(
            "malformed `service!` declaration: each method takes `///` doc lines first, then `#[marker(..)]` attributes, then `fn name(&self, ...)`"
        );
    };
}
