//! Request path resolution
//!
//! Joins the request path onto the root and stats the result. The join does
//! no normalization of its own: `..` segments are left for the OS to resolve.

use crate::error::{Result, ServeError};
use std::borrow::Cow;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::fs;

/// Metadata read once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    /// Inode change time (ctime), used for `Last-Modified`
    pub changed: SystemTime,
    pub is_dir: bool,
}

impl FileStat {
    fn from_metadata(meta: &std::fs::Metadata) -> std::io::Result<Self> {
        Ok(Self {
            size: meta.len(),
            changed: change_time(meta)?,
            is_dir: meta.is_dir(),
        })
    }
}

/// ctime where the platform has one, otherwise the modification time
#[cfg(unix)]
fn change_time(meta: &std::fs::Metadata) -> std::io::Result<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    match (u64::try_from(meta.ctime()), u32::try_from(meta.ctime_nsec())) {
        (Ok(secs), Ok(nanos)) => Ok(UNIX_EPOCH + Duration::new(secs, nanos)),
        // Pre-epoch change time
        _ => meta.modified(),
    }
}

#[cfg(not(unix))]
fn change_time(meta: &std::fs::Metadata) -> std::io::Result<SystemTime> {
    meta.modified()
}

/// A request path mapped onto the filesystem
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Percent-decoded request path, used for listing titles and urls
    pub request_path: String,
    pub fs_path: PathBuf,
    pub stat: FileStat,
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Percent-decode a request path; undecodable input is used verbatim
    pub fn decode(request_path: &str) -> Cow<'_, str> {
        urlencoding::decode(request_path).unwrap_or(Cow::Borrowed(request_path))
    }

    /// Join a decoded request path onto the root
    pub fn join(&self, request_path: &str) -> PathBuf {
        self.root.join(request_path.trim_start_matches('/'))
    }

    /// Decode, join, and stat
    pub async fn resolve(&self, raw_path: &str) -> Result<Resolved> {
        let request_path = Self::decode(raw_path).into_owned();
        let fs_path = self.join(&request_path);

        let stat = fs::metadata(&fs_path)
            .await
            .and_then(|meta| FileStat::from_metadata(&meta))
            .map_err(|e| ServeError::filesystem("stat", &fs_path, e))?;

        Ok(Resolved {
            request_path,
            fs_path,
            stat,
        })
    }
}
