//! Response compression module
//!
//! Negotiates an encoding from `Accept-Encoding` and provides the streaming
//! stage that compresses a body chunk by chunk.

use bytes::Bytes;
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use futures_util::ready;
use futures_util::stream::Stream;
use std::io::{self, Write};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Supported content codings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gzip,
    /// zlib-wrapped deflate, which is what HTTP calls `deflate`
    Deflate,
}

impl Encoding {
    /// `Content-Encoding` header value
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }
}

/// Pick an encoding for the `Accept-Encoding` value.
///
/// gzip wins over deflate whenever both appear as whole words; quality values
/// are not considered. Anything else (br, zstd, identity) means no compression.
pub fn negotiate(accept_encoding: Option<&str>) -> Option<Encoding> {
    let accept = accept_encoding?;
    if contains_word(accept, "gzip") {
        Some(Encoding::Gzip)
    } else if contains_word(accept, "deflate") {
        Some(Encoding::Deflate)
    } else {
        None
    }
}

/// True if `word` occurs with no word character on either side
fn contains_word(haystack: &str, word: &str) -> bool {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    haystack.match_indices(word).any(|(i, _)| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + word.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}

/// Incremental encoder writing into an in-memory buffer that is drained per chunk
enum Encoder {
    Gzip(GzEncoder<Vec<u8>>),
    Deflate(ZlibEncoder<Vec<u8>>),
}

impl Encoder {
    fn new(encoding: Encoding, level: u32) -> Self {
        let level = Compression::new(level);
        match encoding {
            Encoding::Gzip => Self::Gzip(GzEncoder::new(Vec::new(), level)),
            Encoding::Deflate => Self::Deflate(ZlibEncoder::new(Vec::new(), level)),
        }
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self {
            Self::Gzip(e) => e.write_all(chunk),
            Self::Deflate(e) => e.write_all(chunk),
        }
    }

    /// Compressed bytes produced so far
    fn take_output(&mut self) -> Vec<u8> {
        match self {
            Self::Gzip(e) => std::mem::take(e.get_mut()),
            Self::Deflate(e) => std::mem::take(e.get_mut()),
        }
    }

    /// Flush remaining data and the trailer
    fn finish(self) -> io::Result<Vec<u8>> {
        match self {
            Self::Gzip(e) => e.finish(),
            Self::Deflate(e) => e.finish(),
        }
    }
}

/// Stream stage that compresses its upstream.
///
/// Upstream is only polled when this stage is polled, so the consumer's pace
/// governs how fast the source is read.
pub struct Compress<S> {
    inner: S,
    encoder: Option<Encoder>,
}

impl<S> Compress<S> {
    pub fn new(inner: S, encoding: Encoding, level: u32) -> Self {
        Self {
            inner,
            encoder: Some(Encoder::new(encoding, level)),
        }
    }
}

impl<S> Stream for Compress<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            let Some(encoder) = this.encoder.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                Some(Ok(chunk)) => {
                    if let Err(e) = encoder.write_chunk(&chunk) {
                        this.encoder = None;
                        return Poll::Ready(Some(Err(e)));
                    }
                    let out = encoder.take_output();
                    // Small chunks may be held back by the encoder; keep pulling
                    if !out.is_empty() {
                        return Poll::Ready(Some(Ok(Bytes::from(out))));
                    }
                }
                Some(Err(e)) => {
                    this.encoder = None;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    let result = this
                        .encoder
                        .take()
                        .map(|encoder| encoder.finish().map(Bytes::from));
                    return Poll::Ready(result);
                }
            }
        }
    }
}
