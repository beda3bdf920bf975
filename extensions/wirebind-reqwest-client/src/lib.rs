//! Wirebind HTTP backends on top of `reqwest`.
//!
//! [`HttpBackend`] drives an async `reqwest::Client`; [`BlockingHttpBackend`]
//! (feature `blocking`, on by default) drives `reqwest::blocking::Client`.
//! Both turn the marker-built [`wirebind_http::HttpRequest`] into a reqwest
//! request the same way and treat every non-2xx status as a transport error.

mod async_backend;
pub use async_backend::*;
#[cfg(feature = "blocking")]
mod blocking_backend;
#[cfg(feature = "blocking")]
pub use blocking_backend::*;
mod error;
pub use error::*;
mod prepare;

pub use reqwest;
