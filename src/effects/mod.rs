//! I/O operations with trait abstraction.

mod callbacks;
mod http;
mod suppress;
mod transport;

pub use callbacks::{CallbackRegistration, CallbackRegistry, PayloadSentCallback};
pub use http::{HttpClient, WireRequest};
#[cfg(feature = "reqwest")]
pub use http::{ReqwestClient, ReqwestClientError};
pub use suppress::{SuppressionGuard, is_self_tracking_suppressed, suppress_self_tracking};
pub use transport::{HttpTransport, Transport};
