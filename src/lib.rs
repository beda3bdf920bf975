//! Binds annotated service interfaces to pluggable transport backends.
//!
//! An interface is a set of method signatures whose parameters, result fields
//! and methods carry markers describing how each piece maps onto a transport
//! request or response. Binding an interface to a backend extracts one
//! [`Signature`] per method, asks the backend's [`MethodBinder`] for a callable,
//! wraps it with the method markers and installs it on a [`ServiceClass`]
//! that is memoized per interface, backend type and binder.

mod arguments;
pub use arguments::*;
mod backend;
pub use backend::*;
mod binder;
pub use binder::*;
mod binder_table;
pub use binder_table::{BINDER_TABLE_CAPACITY, BinderKey, LruTable, cached_classes};
mod error;
pub use error::*;
mod interface;
pub use interface::*;
mod macros;
mod marker;
pub use marker::*;
mod mode;
pub use mode::*;
mod protocol;
pub use protocol::*;
mod record;
pub use record::*;
mod request;
pub use request::*;
mod response;
pub use response::*;
mod retry;
pub use retry::*;
mod signature;
pub use signature::*;
