//! Response classification.

/// Summary of a collector response, as reported by an HTTP client.
#[derive(Debug, Clone)]
pub struct WireResponse {
    /// HTTP status code.
    pub status: u16,
    /// Values of the collector's per-item error header, if any.
    pub error_headers: Vec<String>,
    /// Response body text, read only for failures under verbose diagnostics.
    pub error_body: Option<String>,
}

impl WireResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            error_headers: Vec::new(),
            error_body: None,
        }
    }

    /// Success per the wire contract: any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
