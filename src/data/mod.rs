//! Immutable request and notification shapes plus wire-level constants.

mod args;
pub mod headers;
mod request;

pub use args::{PayloadSentArgs, TransportProtocol};
pub use request::{BatchStream, SendRequest, SerializationFormat};
