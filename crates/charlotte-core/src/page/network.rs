//! Bounded per-tab network request ring buffer (§4.8), mirroring [`super::console`]'s design.

use std::collections::VecDeque;

use serde::Serialize;

/// Maximum number of requests retained per tab; oldest entries are evicted on overflow.
pub const NETWORK_BUFFER_MAX: usize = 1000;

/// Coarse request/response lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Sent, awaiting a response or failure.
    Pending,
    /// Completed with an HTTP status.
    Completed,
    /// Failed before a response arrived (DNS, TLS, abort, etc.).
    Failed,
}

/// A single captured network request.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkRequest {
    /// CDP request id, used to correlate the eventual response/failure.
    pub request_id: String,
    /// Request URL.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// HTTP response status code, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Response MIME type, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Failure reason text, if `status == failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Page-relative timestamp in milliseconds, at request start.
    pub timestamp: f64,
}

/// A bounded ring buffer of network requests for one tab.
#[derive(Debug, Default)]
pub struct NetworkBuffer {
    requests: VecDeque<NetworkRequest>,
}

impl NetworkBuffer {
    /// Construct an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new request, evicting the oldest entry if the buffer is at capacity.
    pub fn push(&mut self, request: NetworkRequest) {
        if self.requests.len() >= NETWORK_BUFFER_MAX {
            self.requests.pop_front();
        }
        self.requests.push_back(request);
    }

    /// Update the entry matching `request_id` in place (response received or request failed).
    /// A request id with no matching entry (evicted, or arrived before capture began) is a no-op.
    pub fn update(
        &mut self,
        request_id: &str,
        status: RequestStatus,
        status_code: Option<u16>,
        mime_type: Option<String>,
        error: Option<String>,
    ) {
        if let Some(entry) = self.requests.iter_mut().find(|r| r.request_id == request_id) {
            entry.status = status;
            entry.status_code = status_code;
            entry.mime_type = mime_type;
            entry.error = error;
        }
    }

    /// All buffered requests, oldest first, optionally filtered to a URL substring.
    #[must_use]
    pub fn requests(&self, url_contains: Option<&str>) -> Vec<&NetworkRequest> {
        self.requests
            .iter()
            .filter(|r| url_contains.is_none_or(|needle| r.url.contains(needle)))
            .collect()
    }

    /// Number of buffered requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// `true` if no requests are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Clear all buffered requests.
    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(id: &str, url: &str) -> NetworkRequest {
        NetworkRequest {
            request_id: id.into(),
            url: url.into(),
            method: "GET".into(),
            status: RequestStatus::Pending,
            status_code: None,
            mime_type: None,
            error: None,
            timestamp: 0.0,
        }
    }

    #[test]
    fn evicts_oldest_over_cap() {
        let mut buf = NetworkBuffer::new();
        for i in 0..NETWORK_BUFFER_MAX + 3 {
            buf.push(req(&format!("r{i}"), "https://example.com"));
        }
        assert_eq!(buf.len(), NETWORK_BUFFER_MAX);
        assert_eq!(buf.requests(None).first().unwrap().request_id, "r3");
    }

    #[test]
    fn update_patches_matching_request() {
        let mut buf = NetworkBuffer::new();
        buf.push(req("r1", "https://example.com/a"));
        buf.update("r1", RequestStatus::Completed, Some(200), Some("text/html".into()), None);
        let found = buf.requests(None).into_iter().find(|r| r.request_id == "r1").unwrap();
        assert_eq!(found.status, RequestStatus::Completed);
        assert_eq!(found.status_code, Some(200));
    }

    #[test]
    fn url_filter_matches_substring() {
        let mut buf = NetworkBuffer::new();
        buf.push(req("r1", "https://example.com/api/users"));
        buf.push(req("r2", "https://example.com/static/app.js"));
        assert_eq!(buf.requests(Some("/api/")).len(), 1);
    }
}
