//! HTTP Range request module
//!
//! Single `bytes=<start>-<end>` ranges with either side optional. Bounds are
//! never rejected: the end is clamped to the file and a start past the end
//! produces an empty window, so no 416 is ever generated.

use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, Take};

/// Requested byte interval, end inclusive and not yet checked against the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: u64,
    /// None means through the last byte
    pub end: Option<u64>,
    /// A `Range` header was present, so the response is 206
    pub partial: bool,
}

impl RangeSpec {
    /// Whole file, no `Range` header
    pub const fn full() -> Self {
        Self {
            start: 0,
            end: None,
            partial: false,
        }
    }

    /// Resolve against the file size into the bytes actually read
    pub fn window(&self, file_size: u64) -> ByteWindow {
        let Some(last) = file_size.checked_sub(1) else {
            return ByteWindow { start: 0, len: 0 };
        };
        let end = self.end.map_or(last, |e| e.min(last));
        let len = if self.start > end {
            0
        } else {
            end - self.start + 1
        };
        ByteWindow {
            start: self.start,
            len,
        }
    }
}

/// Bytes to read: `len` bytes starting at `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteWindow {
    pub start: u64,
    pub len: u64,
}

impl ByteWindow {
    /// `Content-Range` value, None for an empty window
    pub fn content_range(&self, file_size: u64) -> Option<String> {
        (self.len > 0).then(|| {
            format!(
                "bytes {}-{}/{file_size}",
                self.start,
                self.start + self.len - 1
            )
        })
    }
}

/// Parse the `Range` header.
///
/// Any present header marks the response partial. A value that is not of the
/// `bytes=<digits>-<digits>` form falls back to the whole file.
///
/// # Examples
/// ```ignore
/// let spec = parse_range_header(Some("bytes=0-4"));
/// assert_eq!(spec.window(10).len, 5);
///
/// let spec = parse_range_header(Some("bytes=5-"));
/// assert_eq!(spec.window(10).start, 5);
/// ```
pub fn parse_range_header(range_header: Option<&str>) -> RangeSpec {
    let Some(header) = range_header else {
        return RangeSpec::full();
    };

    let whole = RangeSpec {
        partial: true,
        ..RangeSpec::full()
    };

    let Some(spec) = header.trim().strip_prefix("bytes=") else {
        return whole;
    };
    let Some((start_str, end_str)) = spec.split_once('-') else {
        return whole;
    };

    let (Some(start), Some(end)) = (parse_bound(start_str), parse_bound(end_str)) else {
        return whole;
    };

    RangeSpec {
        start: start.unwrap_or(0),
        end,
        partial: true,
    }
}

/// Empty side -> `Some(None)`, digits -> `Some(Some(n))`, anything else -> None
fn parse_bound(s: &str) -> Option<Option<u64>> {
    let s = s.trim();
    if s.is_empty() {
        return Some(None);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().map(Some)
}

/// Open the file and position a reader over exactly the window's bytes
pub async fn open_window(path: &Path, window: ByteWindow) -> std::io::Result<Take<File>> {
    let mut file = File::open(path).await?;
    if window.start > 0 && window.len > 0 {
        file.seek(SeekFrom::Start(window.start)).await?;
    }
    Ok(file.take(window.len))
}
