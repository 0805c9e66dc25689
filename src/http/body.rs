//! Response body types and the file streaming pipeline
//!
//! A file body is an ordered list of stages: the bounded file read first,
//! then any transforms, with hyper as the sink pulling from the last stage.
//! Dropping the body (client gone) drops every stage and the file handle.

use super::compression::{Compress, Encoding};
use crate::logger;
use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt, TryStreamExt};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use std::io;
use tokio::fs::File;
use tokio::io::Take;
use tokio_util::io::ReaderStream;

/// Body type for every response the server produces
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Read size for file chunks
const CHUNK_SIZE: usize = 64 * 1024;

pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Transform applied between the source and the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compress { encoding: Encoding, level: u32 },
}

impl Stage {
    fn wrap(
        self,
        upstream: BoxStream<'static, io::Result<Bytes>>,
    ) -> BoxStream<'static, io::Result<Bytes>> {
        match self {
            Self::Compress { encoding, level } => {
                Compress::new(upstream, encoding, level).boxed()
            }
        }
    }
}

/// Ordered chain: bounded file read -> stages -> network sink
pub struct StreamPipeline {
    source: Take<File>,
    stages: Vec<Stage>,
}

impl StreamPipeline {
    pub const fn new(source: Take<File>) -> Self {
        Self {
            source,
            stages: Vec::new(),
        }
    }

    /// Append a stage after the ones already added
    #[must_use]
    pub fn then(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Assemble the chain into a body for hyper to poll
    pub fn into_body(self) -> ResponseBody {
        let source = ReaderStream::with_capacity(self.source, CHUNK_SIZE).boxed();
        let stream = self
            .stages
            .into_iter()
            .fold(source, |upstream, stage| stage.wrap(upstream))
            .inspect_err(|e| logger::log_error(&format!("Response stream aborted: {e}")));

        StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::range::{open_window, ByteWindow};
    use flate2::read::GzDecoder;
    use std::io::Read;

    async fn source(data: &[u8], window: ByteWindow) -> (tempfile::TempDir, Take<File>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, data).unwrap();
        let reader = open_window(&path, window).await.unwrap();
        (dir, reader)
    }

    #[tokio::test]
    async fn test_plain_pipeline() {
        let (_dir, reader) = source(b"0123456789", ByteWindow { start: 2, len: 5 }).await;
        let body = StreamPipeline::new(reader).into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"23456");
    }

    #[tokio::test]
    async fn test_compressed_pipeline() {
        let data = b"abcabcabcabcabcabcabcabcabcabc".repeat(1000);
        let len = data.len() as u64;
        let (_dir, reader) = source(&data, ByteWindow { start: 0, len }).await;

        let pipeline = StreamPipeline::new(reader).then(Stage::Compress {
            encoding: Encoding::Gzip,
            level: 6,
        });

        let bytes = pipeline.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.len() < data.len());
        let mut decoded = Vec::new();
        GzDecoder::new(&bytes[..]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[tokio::test]
    async fn test_fixed_bodies() {
        assert!(empty().collect().await.unwrap().to_bytes().is_empty());
        assert_eq!(
            &full("boom").collect().await.unwrap().to_bytes()[..],
            b"boom"
        );
    }
}
