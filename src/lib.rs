//! Synchronous HTTP delivery transport for telemetry export pipelines.
//!
//! Takes one pre-serialized batch of telemetry items and ships it to a remote
//! ingestion endpoint over a single blocking HTTP POST. Delivery failures
//! never escape as errors: they degrade to a `false` result plus a structured
//! `tracing` event, leaving retry, backoff and data-loss policy to the
//! upstream exporter.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable request and notification shapes, wire constants
//! - [`core`] - Pure transformations: body compression, response classification
//! - [`effects`] - I/O with trait abstraction: the transport and its HTTP client seam
//!
//! # Key Features
//!
//! - **Never-Throw Delivery**: network faults and server rejections return
//!   `Ok(false)`; only configuration mistakes surface as errors
//! - **Buffer Reuse**: compressing modes share one lazily-allocated scratch
//!   buffer per transport instance, truncated between sends
//! - **Failure-Isolated Callbacks**: payload-sent subscribers run after each
//!   successful send; a panicking subscriber is logged and skipped
//! - **Loop Prevention**: a scoped guard marks the transport's own HTTP call
//!   as excluded from the pipeline's own collection

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use crate::core::{Compression, WireBody, WireResponse};
pub use crate::data::{
    BatchStream, PayloadSentArgs, SendRequest, SerializationFormat, TransportProtocol,
};
pub use crate::effects::{
    CallbackRegistration, CallbackRegistry, HttpClient, HttpTransport, PayloadSentCallback,
    SuppressionGuard, Transport, WireRequest, is_self_tracking_suppressed, suppress_self_tracking,
};
#[cfg(feature = "reqwest")]
pub use crate::effects::{ReqwestClient, ReqwestClientError};
pub use crate::error::TransportError;
