//! HTTP protocol layer module
//!
//! Negotiation policies and response plumbing, independent of the filesystem
//! walk done by the handler layer. Each policy is a plain function over
//! header values so it can be exercised without a server.

pub mod body;
pub mod cache;
pub mod compression;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::{ResponseBody, Stage, StreamPipeline};
pub use range::parse_range_header;
pub use response::{build_304_response, build_500_response, build_html_response};
