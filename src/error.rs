//! Error types for tracewire.

use thiserror::Error;

use crate::core::Compression;

/// Configuration errors surfaced by transport construction and body building.
///
/// Runtime delivery failures are never represented here: they degrade to a
/// `false` send result plus a structured event, leaving retry and data-loss
/// decisions to the upstream pipeline.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("instrumentation key must not be empty")]
    EmptyInstrumentationKey,

    #[error("endpoint address must not be empty")]
    EmptyEndpoint,

    #[error("unsupported compression mode: {0}")]
    UnsupportedCompression(Compression),
}
