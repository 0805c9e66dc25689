//! MIME type detection module
//!
//! Content-Type from the file extension. Text types get an explicit UTF-8 charset.

use std::path::Path;

/// Get Content-Type for a file path
pub fn get_content_type(path: &Path) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() == mime_guess::mime::TEXT
        || mime.essence_str() == "application/javascript"
        || mime.essence_str() == "application/json"
    {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.essence_str().to_string()
    }
}
