//! Access log line rendering
//!
//! `combined` and `common` follow the usual web server layouts; `json` emits
//! the entry as one object per line.

use chrono::{DateTime, Local};
use hyper::header::{HeaderName, REFERER, USER_AGENT};
use hyper::Request;
use serde::Serialize;
use std::net::IpAddr;

/// Formats accepted by `logging.access_log_format`
pub const ACCESS_LOG_FORMATS: [&str; 3] = ["combined", "common", "json"];

/// One served request, captured after its response head is built
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    pub client: IpAddr,
    pub time: DateTime<Local>,
    pub method: String,
    /// Path plus `?query` when present
    pub target: String,
    pub version: String,
    pub status: u16,
    /// `None` for compressed streams, which carry no length
    pub body_bytes: Option<u64>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub elapsed_us: u64,
}

impl AccessLogEntry {
    /// Capture the request side; status and size are filled in by the caller
    pub fn from_request<B>(client: IpAddr, req: &Request<B>) -> Self {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        let version = format!("{:?}", req.version());
        Self {
            client,
            time: Local::now(),
            method: req.method().to_string(),
            target: req
                .uri()
                .path_and_query()
                .map_or_else(|| "/".to_string(), ToString::to_string),
            version: version.trim_start_matches("HTTP/").to_string(),
            status: 0,
            body_bytes: None,
            referer: header(REFERER),
            user_agent: header(USER_AGENT),
            elapsed_us: 0,
        }
    }

    /// Render in `format`; anything unrecognized renders as `combined`
    pub fn format(&self, format: &str) -> String {
        match format {
            "json" => serde_json::to_string(self)
                .unwrap_or_else(|e| format!("{{\"log_error\":\"{e}\"}}")),
            "common" => self.common_line(),
            _ => format!(
                "{} \"{}\" \"{}\"",
                self.common_line(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
        }
    }

    fn common_line(&self) -> String {
        let bytes = self
            .body_bytes
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {bytes}",
            self.client,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.target,
            self.version,
            self.status,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AccessLogEntry {
        let req = Request::builder()
            .uri("/docs/readme.txt?v=2")
            .header("referer", "https://example.com")
            .header("user-agent", "curl/8.0")
            .body(())
            .unwrap();
        let mut entry = AccessLogEntry::from_request("192.168.1.1".parse().unwrap(), &req);
        entry.status = 206;
        entry.body_bytes = Some(5);
        entry
    }

    #[test]
    fn test_from_request() {
        let entry = sample();
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.target, "/docs/readme.txt?v=2");
        assert_eq!(entry.version, "1.1");
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn test_combined_line() {
        let line = sample().format("combined");
        assert!(line.starts_with("192.168.1.1 - - ["));
        assert!(line.contains("\"GET /docs/readme.txt?v=2 HTTP/1.1\" 206 5"));
        assert!(line.ends_with("\"https://example.com\" \"curl/8.0\""));
    }

    #[test]
    fn test_common_line_without_length() {
        let mut entry = sample();
        entry.body_bytes = None;
        let line = entry.format("common");
        assert!(line.ends_with("206 -"));
        assert!(!line.contains("curl"));
    }

    #[test]
    fn test_json_line() {
        let value: serde_json::Value = serde_json::from_str(&sample().format("json")).unwrap();
        assert_eq!(value["client"], "192.168.1.1");
        assert_eq!(value["status"], 206);
        assert_eq!(value["body_bytes"], 5);
        assert_eq!(value["target"], "/docs/readme.txt?v=2");
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let entry = sample();
        assert_eq!(entry.format("xml"), entry.format("combined"));
    }
}
