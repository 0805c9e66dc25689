//! HTTP response building module
//!
//! Builders for the fixed-shape responses. File responses are assembled by the
//! dispatcher because their headers depend on the negotiation results.

use super::body::{self, ResponseBody};
use hyper::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};

/// Build 304 Not Modified response carrying the validator headers
pub fn build_304_response(headers: HeaderMap) -> Response<ResponseBody> {
    let mut resp = Response::new(body::empty());
    *resp.status_mut() = StatusCode::NOT_MODIFIED;
    *resp.headers_mut() = headers;
    resp
}

/// Build 500 response whose body is the error text
pub fn build_500_response(message: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, message.len())
        .body(body::full(message.to_owned()))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            let mut resp = Response::new(body::full(message.to_owned()));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}

/// Build generic HTML response
pub fn build_html_response(content: String) -> Response<ResponseBody> {
    let content_length = content.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .body(body::full(content))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(body::empty())
        })
}

/// Log response build error
pub fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::header::ETAG;

    #[tokio::test]
    async fn test_304_is_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(ETAG, "10".parse().unwrap());
        let resp = build_304_response(headers);
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(resp.headers()[ETAG], "10");
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_500_carries_message() {
        let resp = build_500_response("stat '/x': not found");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "20");
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"stat '/x': not found");
    }

    #[test]
    fn test_html_headers() {
        let resp = build_html_response("<p>hi</p>".to_string());
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "9");
    }
}
