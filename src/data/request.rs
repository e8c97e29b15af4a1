use std::fmt;
use std::io::{Read, Seek};

/// Seekable byte stream holding one serialized batch.
///
/// The transport borrows the stream for the duration of one send call; it is
/// never owned or closed here. Seeking is used only to save and restore the
/// batch position around delivery and notification.
pub trait BatchStream: Read + Seek {}

impl<S: Read + Seek> BatchStream for S {}

/// Serialization format tag of a batch body.
///
/// The byte format itself is opaque to the transport; the tag exists for
/// bookkeeping and subscriber notification only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerializationFormat {
    /// Newline-delimited JSON items.
    #[default]
    JsonStream,
}

impl SerializationFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SerializationFormat::JsonStream => "json-stream",
        }
    }
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One delivery request: a positioned batch stream plus its metadata.
pub struct SendRequest<'a> {
    /// Batch bytes, positioned at the start of the batch.
    pub stream: &'a mut dyn BatchStream,
    /// Serialization format of the batch.
    pub format: SerializationFormat,
    /// Item-type label, used for diagnostics only.
    pub item_type: String,
    /// Number of items serialized into the batch.
    pub item_count: usize,
}

impl<'a> SendRequest<'a> {
    pub fn new(
        stream: &'a mut dyn BatchStream,
        format: SerializationFormat,
        item_type: impl Into<String>,
        item_count: usize,
    ) -> Self {
        Self {
            stream,
            format,
            item_type: item_type.into(),
            item_count,
        }
    }
}
