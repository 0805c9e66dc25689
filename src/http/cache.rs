//! HTTP revalidation module
//!
//! Validators are derived from file metadata and compared by exact string
//! equality. There is no time ordering: an `If-Modified-Since` that is newer
//! than the file still forces a full transfer if the strings differ.

use chrono::{DateTime, Utc};
use hyper::header::{HeaderMap, HeaderValue, CACHE_CONTROL, ETAG, EXPIRES, LAST_MODIFIED};
use std::time::{Duration, SystemTime};

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an HTTP date
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format(HTTP_DATE_FORMAT)
        .to_string()
}

/// Validators computed fresh for each request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheValidators {
    /// Decimal file size
    pub etag: String,
    pub last_modified: String,
}

impl CacheValidators {
    pub fn new(size: u64, changed: SystemTime) -> Self {
        Self {
            etag: size.to_string(),
            last_modified: http_date(changed),
        }
    }
}

/// Validator headers sent by the client
#[derive(Debug, Default, Clone, Copy)]
pub struct Conditional<'a> {
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
}

/// Outcome of revalidation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    /// Send the body
    Transfer,
    /// Answer 304 with an empty body
    NotModified,
}

/// Decide between a full transfer and a 304.
///
/// A validator that is present but differs forces a transfer; only when every
/// present validator matches is the response short-circuited.
pub fn negotiate(cond: Conditional<'_>, validators: &CacheValidators) -> CacheDecision {
    if cond
        .if_none_match
        .is_some_and(|tag| tag != validators.etag)
    {
        return CacheDecision::Transfer;
    }

    if cond
        .if_modified_since
        .is_some_and(|since| since != validators.last_modified)
    {
        return CacheDecision::Transfer;
    }

    if cond.if_none_match.is_some() || cond.if_modified_since.is_some() {
        CacheDecision::NotModified
    } else {
        CacheDecision::Transfer
    }
}

/// Freshness and validator headers, set on every file response
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub max_age: u64,
}

impl CachePolicy {
    pub fn to_header_value(self) -> String {
        format!("private, max-age={}", self.max_age)
    }

    /// Write `cache-control`, `expires`, `etag`, and `last-modified`
    pub fn apply(self, headers: &mut HeaderMap, validators: &CacheValidators, now: SystemTime) {
        let expires = now + Duration::from_secs(self.max_age);
        let pairs = [
            (CACHE_CONTROL, self.to_header_value()),
            (EXPIRES, http_date(expires)),
            (ETAG, validators.etag.clone()),
            (LAST_MODIFIED, validators.last_modified.clone()),
        ];
        for (name, value) in pairs {
            // All values are ASCII built above
            if let Ok(value) = HeaderValue::from_str(&value) {
                headers.insert(name, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validators() -> CacheValidators {
        // 1994-11-06 08:49:37 UTC
        CacheValidators::new(10, SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777))
    }

    #[test]
    fn test_http_date_format() {
        let v = validators();
        assert_eq!(v.etag, "10");
        assert_eq!(v.last_modified, "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_no_validators_transfers() {
        assert_eq!(
            negotiate(Conditional::default(), &validators()),
            CacheDecision::Transfer
        );
    }

    #[test]
    fn test_matching_etag_short_circuits() {
        let cond = Conditional {
            if_none_match: Some("10"),
            if_modified_since: None,
        };
        assert_eq!(negotiate(cond, &validators()), CacheDecision::NotModified);
    }

    #[test]
    fn test_mismatched_etag_transfers() {
        let cond = Conditional {
            if_none_match: Some("11"),
            if_modified_since: Some("Sun, 06 Nov 1994 08:49:37 GMT"),
        };
        assert_eq!(negotiate(cond, &validators()), CacheDecision::Transfer);
    }

    #[test]
    fn test_modified_since_is_string_equality() {
        let exact = Conditional {
            if_none_match: None,
            if_modified_since: Some("Sun, 06 Nov 1994 08:49:37 GMT"),
        };
        assert_eq!(negotiate(exact, &validators()), CacheDecision::NotModified);

        // Later date, but not the same string
        let later = Conditional {
            if_none_match: None,
            if_modified_since: Some("Mon, 07 Nov 1994 08:49:37 GMT"),
        };
        assert_eq!(negotiate(later, &validators()), CacheDecision::Transfer);
    }

    #[test]
    fn test_both_match() {
        let cond = Conditional {
            if_none_match: Some("10"),
            if_modified_since: Some("Sun, 06 Nov 1994 08:49:37 GMT"),
        };
        assert_eq!(negotiate(cond, &validators()), CacheDecision::NotModified);
    }

    #[test]
    fn test_apply_headers() {
        let mut headers = HeaderMap::new();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        CachePolicy { max_age: 10 }.apply(&mut headers, &validators(), now);
        assert_eq!(headers[CACHE_CONTROL], "private, max-age=10");
        assert_eq!(headers[EXPIRES], "Sun, 06 Nov 1994 08:49:47 GMT");
        assert_eq!(headers[ETAG], "10");
        assert_eq!(headers[LAST_MODIFIED], "Sun, 06 Nov 1994 08:49:37 GMT");
    }
}
