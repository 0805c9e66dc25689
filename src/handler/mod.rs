//! Request handler module
//!
//! Maps requests onto the root directory: path resolution, directory
//! listings, and the dispatcher that composes them with the HTTP policies.

pub mod dispatcher;
pub mod listing;
pub mod resolver;

// Re-export main entry point
pub use dispatcher::{handle_request, Dispatcher};
