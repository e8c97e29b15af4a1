use std::fmt;

use super::request::{BatchStream, SerializationFormat};

/// Protocol tag identifying a concrete transport implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportProtocol {
    /// One synchronous HTTP POST carrying a JSON item stream.
    HttpJsonPost,
}

impl TransportProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportProtocol::HttpJsonPost => "http-json-post",
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments passed to payload-sent subscribers after a successful send.
///
/// The stream is the transmitted batch, rewound to its start position; its
/// position is restored after each subscriber runs, regardless of the
/// subscriber's outcome.
pub struct PayloadSentArgs<'a> {
    /// Serialization format of the transmitted batch.
    pub format: SerializationFormat,
    /// The transmitted batch, rewound to its start position.
    pub stream: &'a mut dyn BatchStream,
    /// Concrete transport that performed the delivery.
    pub protocol: TransportProtocol,
    /// Destination endpoint the batch was delivered to.
    pub endpoint: &'a str,
}
