//! Interfaces and result records for the httpbin echo endpoints.

mod httpbin;
pub use httpbin::*;
