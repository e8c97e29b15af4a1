//! Transport contract and the HTTP orchestrator.

use std::any::Any;
use std::io::{Seek, SeekFrom};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};

use crate::core::{BodyError, Compression, WireBody, build_wire_body};
use crate::data::headers::{
    CONTENT_TYPE, HEADER_API_KEY, HEADER_SDK_VERSION, HEADER_SKIP_RESPONSE_BODY, SDK_VERSION,
    USER_AGENT,
};
use crate::data::{PayloadSentArgs, SendRequest, TransportProtocol};
use crate::error::TransportError;

use super::callbacks::{CallbackRegistration, CallbackRegistry, PayloadSentCallback};
use super::http::{HttpClient, WireRequest};
use super::suppress::suppress_self_tracking;

/// Abstract delivery capability held by the upstream exporter pipeline.
///
/// An `Ok(false)` result signals the pipeline to apply its own retry/drop
/// policy; `Err` is reserved for configuration mistakes that must be fixed,
/// never retried.
pub trait Transport: Send + Sync {
    /// Attempts one delivery of the batch.
    ///
    /// Never fails for runtime delivery problems: network faults and server
    /// rejections are logged and reported as `Ok(false)`. `Ok(true)` means
    /// the endpoint acknowledged success. The only error is an unsupported
    /// compression mode, surfaced immediately as a configuration mistake.
    ///
    /// The stream position of `request` is restored to its entry value
    /// before this returns, on every path.
    fn send(&self, request: &mut SendRequest<'_>) -> Result<bool, TransportError>;

    /// Registers a subscriber invoked after every successful send.
    ///
    /// Dropping the returned registration stops future invocations of that
    /// subscriber without affecting others.
    fn on_payload_sent(&self, callback: Arc<PayloadSentCallback>) -> CallbackRegistration;

    /// Stable human-readable identifier (protocol + endpoint) for
    /// diagnostics.
    fn description(&self) -> String;
}

/// Synchronous HTTP POST transport for pre-serialized telemetry batches.
///
/// One instance holds one client handle and, for compressing modes, one
/// shared scratch buffer that lives as long as the instance. Keep one
/// in-flight send per instance when compressing: concurrent sends serialize
/// on the buffer checkout and gain nothing.
pub struct HttpTransport<C: HttpClient> {
    client: C,
    endpoint: String,
    instrumentation_key: SecretString,
    compression: Compression,
    verbose_diagnostics: bool,
    scratch: Mutex<Vec<u8>>,
    callbacks: CallbackRegistry,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a transport bound to `client`, delivering to `endpoint` and
    /// authenticating with `instrumentation_key`.
    ///
    /// Compression defaults to [`Compression::Deflate`] and verbose
    /// diagnostics to off.
    ///
    /// # Errors
    ///
    /// Fails fast when the key or the endpoint is empty.
    pub fn new(
        client: C,
        endpoint: impl Into<String>,
        instrumentation_key: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(TransportError::EmptyEndpoint);
        }
        let key = instrumentation_key.into();
        if key.is_empty() {
            return Err(TransportError::EmptyInstrumentationKey);
        }
        Ok(Self {
            client,
            endpoint,
            instrumentation_key: SecretString::from(key),
            compression: Compression::default(),
            verbose_diagnostics: false,
            scratch: Mutex::new(Vec::new()),
            callbacks: CallbackRegistry::new(),
        })
    }

    /// Sets the body compression mode.
    #[must_use]
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Enables verbose diagnostics: failure response bodies are read and
    /// logged, and the no-response-body hint header is not sent.
    #[must_use]
    pub fn verbose_diagnostics(mut self, verbose: bool) -> Self {
        self.verbose_diagnostics = verbose;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn deliver(
        &self,
        request: &mut SendRequest<'_>,
        batch_start: u64,
    ) -> Result<bool, TransportError> {
        let body = match build_wire_body(self.compression, &mut *request.stream, &self.scratch) {
            Ok(body) => body,
            Err(BodyError::Unsupported(mode)) => {
                return Err(TransportError::UnsupportedCompression(mode));
            }
            Err(BodyError::Io(e)) => {
                tracing::warn!(
                    error = %e,
                    transport = %self.description(),
                    "failed to build telemetry request body"
                );
                return Ok(false);
            }
        };

        let headers = self.headers(&body);
        let wire = WireRequest {
            endpoint: &self.endpoint,
            headers,
            body,
            want_error_body: self.verbose_diagnostics,
        };

        match self.client.post(wire) {
            Ok(response) if response.is_success() => {
                tracing::debug!(
                    item_type = %request.item_type,
                    items = request.item_count,
                    transport = %self.description(),
                    "telemetry batch sent"
                );
                self.notify_payload_sent(request, batch_start);
                Ok(true)
            }
            Ok(response) => {
                tracing::warn!(
                    status = response.status,
                    errors = ?response.error_headers,
                    body = response.error_body.as_deref(),
                    transport = %self.description(),
                    "collector rejected telemetry batch"
                );
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    transport = %self.description(),
                    "telemetry delivery failed"
                );
                Ok(false)
            }
        }
    }

    fn headers(&self, body: &WireBody<'_>) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Content-Type", CONTENT_TYPE.to_owned()),
            ("User-Agent", USER_AGENT.to_owned()),
            (HEADER_SDK_VERSION, SDK_VERSION.to_owned()),
            (
                HEADER_API_KEY,
                self.instrumentation_key.expose_secret().to_owned(),
            ),
        ];
        if let Some(encoding) = body.content_encoding() {
            headers.push(("Content-Encoding", encoding.to_owned()));
        }
        if !self.verbose_diagnostics {
            headers.push((HEADER_SKIP_RESPONSE_BODY, "true".to_owned()));
        }
        headers
    }

    /// Invokes every registered subscriber with the batch rewound to its
    /// start, isolating panics per subscriber, then restores the position
    /// the stream held before notification.
    fn notify_payload_sent(&self, request: &mut SendRequest<'_>, batch_start: u64) {
        let subscribers = self.callbacks.snapshot();
        if subscribers.is_empty() {
            return;
        }

        let resume_pos = match request.stream.stream_position() {
            Ok(pos) => pos,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read batch position before notification");
                return;
            }
        };

        for subscriber in subscribers {
            if let Err(e) = request.stream.seek(SeekFrom::Start(batch_start)) {
                tracing::warn!(error = %e, "failed to rewind batch for notification");
                break;
            }
            let mut args = PayloadSentArgs {
                format: request.format,
                stream: &mut *request.stream,
                protocol: TransportProtocol::HttpJsonPost,
                endpoint: &self.endpoint,
            };
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| subscriber(&mut args))) {
                tracing::error!(
                    panic = panic_message(payload.as_ref()),
                    transport = %self.description(),
                    "payload-sent subscriber panicked"
                );
            }
        }

        if let Err(e) = request.stream.seek(SeekFrom::Start(resume_pos)) {
            tracing::warn!(error = %e, "failed to restore batch position after notification");
        }
    }
}

impl<C: HttpClient> Transport for HttpTransport<C> {
    fn send(&self, request: &mut SendRequest<'_>) -> Result<bool, TransportError> {
        let entry_pos = match request.stream.stream_position() {
            Ok(pos) => pos,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read batch stream position");
                return Ok(false);
            }
        };

        let guard = suppress_self_tracking();
        let outcome = self.deliver(request, entry_pos);
        drop(guard);

        if let Err(e) = request.stream.seek(SeekFrom::Start(entry_pos)) {
            tracing::warn!(error = %e, "failed to restore batch stream position");
        }
        outcome
    }

    fn on_payload_sent(&self, callback: Arc<PayloadSentCallback>) -> CallbackRegistration {
        self.callbacks.register(callback)
    }

    fn description(&self) -> String {
        format!("{} @ {}", TransportProtocol::HttpJsonPost, self.endpoint)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
