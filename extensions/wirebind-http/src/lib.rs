//! HTTP protocol support for Wirebind interfaces.
//!
//! Method markers fix the verb and the path, parameter markers place
//! arguments into the query string, headers, form or JSON body, and response
//! markers lift the status, headers or raw text of the response into result
//! fields. Markers writing to the same location accumulate in call order.

mod method_markers;
pub use method_markers::*;
mod parameter_markers;
pub use parameter_markers::*;
mod protocol;
pub use protocol::*;
mod render;
mod response_markers;
pub use response_markers::*;

pub use http;
