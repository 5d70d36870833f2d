//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! tracing and static response header decoration.

pub mod response_headers;
pub mod trace;

pub use response_headers::ResponseHeaders;
pub use trace::{Trace, TraceId};
