//! Synchronous HTTP client abstraction.

use crate::core::{WireBody, WireResponse};

/// One outbound collector request.
pub struct WireRequest<'a> {
    /// Destination endpoint URI.
    pub endpoint: &'a str,
    /// Header name/value pairs to send.
    pub headers: Vec<(&'static str, String)>,
    /// Wire-ready body.
    pub body: WireBody<'a>,
    /// Whether a failure response's body text should be read.
    pub want_error_body: bool,
}

/// Synchronous HTTP client abstraction.
///
/// The transport orchestrator is generic over this trait so tests can drive
/// it with a mock and alternate clients can be substituted without touching
/// delivery semantics.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest::blocking`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// Error type for request execution.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issues exactly one POST and classifies the response.
    ///
    /// Implementations must not retry. `error_headers` and `error_body` are
    /// extracted only for non-success statuses; the body additionally
    /// requires `want_error_body`.
    fn post(&self, request: WireRequest<'_>) -> Result<WireResponse, Self::Error>;
}

#[cfg(feature = "reqwest")]
mod reqwest_client {
    use std::io::{self, Read};

    use thiserror::Error;

    use super::{HttpClient, WireRequest};
    use crate::core::WireResponse;
    use crate::data::headers::HEADER_INGEST_ERRORS;

    /// Production client backed by `reqwest::blocking`.
    ///
    /// Connection pooling and keep-alive are delegated entirely to the
    /// wrapped client; the transport holds exactly one handle for its
    /// lifetime.
    pub struct ReqwestClient {
        client: reqwest::blocking::Client,
    }

    /// Errors from the reqwest-backed client.
    #[derive(Debug, Error)]
    pub enum ReqwestClientError {
        #[error("failed to read request body: {0}")]
        Body(#[source] io::Error),

        #[error("http request failed: {0}")]
        Http(#[source] reqwest::Error),
    }

    impl ReqwestClient {
        /// Creates a client with reqwest's default settings.
        pub fn new() -> Result<Self, reqwest::Error> {
            Ok(Self {
                client: reqwest::blocking::Client::builder().build()?,
            })
        }

        /// Wraps a preconfigured client (timeouts, TLS, proxies).
        pub fn with_client(client: reqwest::blocking::Client) -> Self {
            Self { client }
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = ReqwestClientError;

        fn post(&self, request: WireRequest<'_>) -> Result<WireResponse, Self::Error> {
            let mut body = Vec::with_capacity(request.body.len() as usize);
            let mut reader = request.body;
            reader
                .read_to_end(&mut body)
                .map_err(ReqwestClientError::Body)?;

            let mut builder = self.client.post(request.endpoint).body(body);
            for (name, value) in &request.headers {
                builder = builder.header(*name, value.as_str());
            }
            let response = builder.send().map_err(ReqwestClientError::Http)?;

            let status = response.status().as_u16();
            let failed = !response.status().is_success();
            let error_headers = if failed {
                response
                    .headers()
                    .get_all(HEADER_INGEST_ERRORS)
                    .iter()
                    .filter_map(|value| value.to_str().ok().map(str::to_owned))
                    .collect()
            } else {
                Vec::new()
            };
            let error_body = if failed && request.want_error_body {
                response.text().ok()
            } else {
                None
            };

            Ok(WireResponse {
                status,
                error_headers,
                error_body,
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_client::{ReqwestClient, ReqwestClientError};
