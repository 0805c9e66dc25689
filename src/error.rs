//! Request handling errors
//!
//! Every variant is answered with a 500 whose body is the display string.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// Any stat, open, seek, or directory read failure, whatever the cause
    #[error("{op} '{}': {source}", path.display())]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Request path on the reject list
    #[error("not served: {0}")]
    Rejected(String),

    #[error("failed to render listing: {0}")]
    Render(#[from] minijinja::Error),
}

impl ServeError {
    pub fn filesystem(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            op,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ServeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filesystem_display_is_never_empty() {
        let err = ServeError::filesystem(
            "stat",
            "/srv/missing.txt",
            io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        );
        let msg = err.to_string();
        assert!(msg.contains("stat"));
        assert!(msg.contains("/srv/missing.txt"));
        assert!(msg.contains("No such file or directory"));
    }

    #[test]
    fn test_rejected_display() {
        assert_eq!(
            ServeError::Rejected("/favicon.ico".to_string()).to_string(),
            "not served: /favicon.ico"
        );
    }
}
