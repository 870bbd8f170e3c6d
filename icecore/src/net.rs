use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// A simple structure to represent an HTTP request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    /// Upper bound for the whole exchange. Clients that cannot honour a
    /// per-request value fall back to their own configured timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A fully buffered HTTP response.
///
/// Credential endpoints answer with a few hundred bytes of JSON, so the body
/// is read completely before it is handed back.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates an HTTP response with an empty body and the given status code.
    /// This is useful for creating mock or placeholder responses.
    pub fn empty(status_code: u16) -> Self {
        Self {
            status_code,
            body: Vec::new(),
        }
    }

    pub fn json(status_code: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }

    /// Lossy view of at most `max_bytes` of the body, for log lines.
    pub fn body_preview(&self, max_bytes: usize) -> String {
        let end = self.body.len().min(max_bytes);
        let mut preview = String::from_utf8_lossy(&self.body[..end]).into_owned();
        if end < self.body.len() {
            preview.push_str(&format!("... ({} bytes total)", self.body.len()));
        }
        preview
    }
}

/// Trait for executing HTTP requests in a runtime-agnostic way
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Executes a given HTTP request and returns the response.
    ///
    /// Any status code is a successful exchange at this level; only transport
    /// failures are returned as errors.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_request_builder() {
        let req = HttpRequest::get("https://relay.umbra.app/turn-credentials")
            .with_header("Accept", "application/json")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(req.method, "GET");
        assert_eq!(req.url, "https://relay.umbra.app/turn-credentials");
        assert_eq!(
            req.headers.get("Accept").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(req.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_response_status_helpers() {
        assert!(HttpResponse::empty(200).is_ok());
        assert!(!HttpResponse::empty(204).is_ok());
        assert_eq!(HttpResponse::json(500, "oops").body_preview(256), "oops");
    }

    #[test]
    fn test_body_preview_is_bounded() {
        let resp = HttpResponse::json(502, vec![b'x'; 10 * 1024 * 1024]);
        let preview = resp.body_preview(256);
        assert!(preview.starts_with(&"x".repeat(256)));
        assert!(preview.ends_with("... (10485760 bytes total)"));
        assert!(preview.len() < 300);
    }
}
