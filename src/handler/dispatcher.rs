//! Request dispatch module
//!
//! Entry point for HTTP request processing. Every method is served like GET.
//! Exactly one response is produced per request: a directory page, a 304, a
//! file stream, or a 500 carrying the error text.

use super::listing::{self, ListingRenderer};
use super::resolver::{PathResolver, Resolved};
use crate::config::Config;
use crate::error::{Result, ServeError};
use crate::http::cache::{self, CacheDecision, CachePolicy, CacheValidators, Conditional};
use crate::http::compression;
use crate::http::range;
use crate::http::{self as proto, mime, parse_range_header, ResponseBody, Stage, StreamPipeline};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, ACCEPT_RANGES, CONTENT_ENCODING,
    CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, IF_MODIFIED_SINCE, IF_NONE_MATCH, RANGE, SERVER,
};
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// Header values the negotiation steps consume
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub range_header: Option<&'a str>,
    pub accept_encoding: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        let header =
            move |name: HeaderName| req.headers().get(name).and_then(|v| v.to_str().ok());
        Self {
            path: req.uri().path(),
            if_none_match: header(IF_NONE_MATCH),
            if_modified_since: header(IF_MODIFIED_SINCE),
            range_header: header(RANGE),
            accept_encoding: header(ACCEPT_ENCODING),
        }
    }

    const fn conditional(&self) -> Conditional<'a> {
        Conditional {
            if_none_match: self.if_none_match,
            if_modified_since: self.if_modified_since,
        }
    }
}

/// Immutable per-server request handler
pub struct Dispatcher {
    resolver: PathResolver,
    renderer: ListingRenderer,
    cache: CachePolicy,
    compression_level: u32,
    rejected_paths: Vec<String>,
    server_name: Option<HeaderValue>,
    access_log: bool,
    access_log_format: String,
}

impl Dispatcher {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            resolver: PathResolver::new(&config.server.root),
            renderer: ListingRenderer::new()?,
            cache: CachePolicy {
                max_age: config.http.cache_max_age,
            },
            compression_level: config.http.compression_level,
            rejected_paths: config.http.rejected_paths.clone(),
            server_name: HeaderValue::from_str(&config.http.server_name).ok(),
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
        })
    }

    /// Produce the response for one request; failures become a 500
    pub async fn dispatch<B>(&self, req: &Request<B>) -> Response<ResponseBody> {
        let ctx = RequestContext::from_request(req);
        let mut resp = match self.serve(&ctx).await {
            Ok(resp) => resp,
            Err(e) => {
                logger::log_warning(&format!("{} -> {e}", ctx.path));
                proto::build_500_response(&e.to_string())
            }
        };
        if let Some(name) = &self.server_name {
            resp.headers_mut().insert(SERVER, name.clone());
        }
        resp
    }

    async fn serve(&self, ctx: &RequestContext<'_>) -> Result<Response<ResponseBody>> {
        if self.rejected_paths.iter().any(|p| p == ctx.path) {
            return Err(ServeError::Rejected(ctx.path.to_string()));
        }

        let resolved = self.resolver.resolve(ctx.path).await?;
        if resolved.stat.is_dir {
            self.serve_directory(&resolved).await
        } else {
            self.serve_file(ctx, &resolved).await
        }
    }

    /// Listing page; no caching headers and no compression
    async fn serve_directory(&self, resolved: &Resolved) -> Result<Response<ResponseBody>> {
        let files = listing::read_entries(&resolved.fs_path, &resolved.request_path).await?;
        let html = self.renderer.render(&resolved.request_path, &files)?;
        Ok(proto::build_html_response(html))
    }

    /// Revalidate, then stream the requested window through the negotiated stages
    async fn serve_file(
        &self,
        ctx: &RequestContext<'_>,
        resolved: &Resolved,
    ) -> Result<Response<ResponseBody>> {
        let stat = &resolved.stat;
        let validators = CacheValidators::new(stat.size, stat.changed);

        let mut headers = HeaderMap::new();
        self.cache.apply(&mut headers, &validators, SystemTime::now());
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));

        if cache::negotiate(ctx.conditional(), &validators) == CacheDecision::NotModified {
            return Ok(proto::build_304_response(headers));
        }

        if let Ok(ct) = HeaderValue::from_str(&mime::get_content_type(&resolved.fs_path)) {
            headers.insert(CONTENT_TYPE, ct);
        }

        let spec = parse_range_header(ctx.range_header);
        let window = spec.window(stat.size);
        let status = if spec.partial {
            if let Some(cr) = window.content_range(stat.size) {
                if let Ok(value) = HeaderValue::from_str(&cr) {
                    headers.insert(CONTENT_RANGE, value);
                }
            }
            StatusCode::PARTIAL_CONTENT
        } else {
            StatusCode::OK
        };

        let source = range::open_window(&resolved.fs_path, window)
            .await
            .map_err(|e| ServeError::filesystem("open", &resolved.fs_path, e))?;
        let mut pipeline = StreamPipeline::new(source);

        match compression::negotiate(ctx.accept_encoding) {
            Some(encoding) => {
                headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding.as_str()));
                pipeline = pipeline.then(Stage::Compress {
                    encoding,
                    level: self.compression_level,
                });
            }
            None => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(window.len));
            }
        }

        let mut resp = Response::new(pipeline.into_body());
        *resp.status_mut() = status;
        *resp.headers_mut() = headers;
        Ok(resp)
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    dispatcher: Arc<Dispatcher>,
    peer_addr: SocketAddr,
) -> std::result::Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    // The body is never read
    let (parts, _) = req.into_parts();
    let req = Request::from_parts(parts, ());
    let resp = dispatcher.dispatch(&req).await;

    if dispatcher.access_log {
        let mut entry = AccessLogEntry::from_request(peer_addr.ip(), &req);
        entry.status = resp.status().as_u16();
        entry.body_bytes = resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        entry.elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &dispatcher.access_log_format);
    }

    Ok(resp)
}
