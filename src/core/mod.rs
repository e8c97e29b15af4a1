//! Pure transformations: body compression and response classification.

mod body;
mod response;

pub use body::{Compression, WireBody};
pub(crate) use body::{BodyError, build_wire_body};
pub use response::WireResponse;
