//! Wire body construction.
//!
//! Converts a positioned batch stream into the body placed on the wire for a
//! given compression mode. Compressing modes share one scratch buffer per
//! transport instance, checked out through a mutex: lock is acquire, drop is
//! return, one owner at a time.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::{Mutex, MutexGuard, PoisonError};

use flate2::write::DeflateEncoder;
#[cfg(feature = "gzip")]
use flate2::write::GzEncoder;

use crate::data::BatchStream;

/// Capacity reserved on the scratch buffer's first checkout.
const SCRATCH_INITIAL_CAPACITY: usize = 16 * 1024;

/// Compression applied to the batch body before transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Ship the batch bytes unmodified.
    None,
    /// Raw DEFLATE at best ratio, tagged `Content-Encoding: deflate`.
    #[default]
    Deflate,
    /// Gzip framing, tagged `Content-Encoding: gzip`.
    ///
    /// Requires the `gzip` cargo feature; without it the mode is a
    /// configuration error at body-build time, never silently ignored.
    Gzip,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => f.write_str("none"),
            Compression::Deflate => f.write_str("deflate"),
            Compression::Gzip => f.write_str("gzip"),
        }
    }
}

/// Failure modes of body construction.
///
/// `Unsupported` is a configuration error and surfaces to the caller of
/// `send`; `Io` is a per-call fault and degrades to a `false` send result.
#[derive(Debug)]
pub(crate) enum BodyError {
    Unsupported(Compression),
    Io(io::Error),
}

impl From<io::Error> for BodyError {
    fn from(e: io::Error) -> Self {
        BodyError::Io(e)
    }
}

/// Wire-ready request body.
///
/// `Raw` borrows the caller's stream from its current position to its end
/// and never closes it. `Compressed` holds the checked-out scratch buffer,
/// rewound to its start; the checkout is returned when the body is dropped.
pub enum WireBody<'a> {
    Raw {
        stream: &'a mut dyn BatchStream,
        remaining: u64,
    },
    Compressed {
        scratch: MutexGuard<'a, Vec<u8>>,
        pos: usize,
        encoding: &'static str,
    },
}

impl WireBody<'_> {
    /// Exact number of body bytes left to place on the wire.
    pub fn len(&self) -> u64 {
        match self {
            WireBody::Raw { remaining, .. } => *remaining,
            WireBody::Compressed { scratch, pos, .. } => (scratch.len() - pos) as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `Content-Encoding` to advertise for this body, if any.
    pub fn content_encoding(&self) -> Option<&'static str> {
        match self {
            WireBody::Raw { .. } => None,
            WireBody::Compressed { encoding, .. } => Some(encoding),
        }
    }
}

impl Read for WireBody<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        match self {
            WireBody::Raw { stream, remaining } => {
                let n = stream.read(out)?;
                *remaining = remaining.saturating_sub(n as u64);
                Ok(n)
            }
            WireBody::Compressed { scratch, pos, .. } => {
                let n = (&scratch[*pos..]).read(out)?;
                *pos += n;
                Ok(n)
            }
        }
    }
}

/// Builds the wire body for `compression` from `stream`'s current position.
///
/// Compressing modes check out `scratch`, truncate it in place (capacity is
/// kept across calls) and consume the source stream to its end. The raw mode
/// leaves the stream untouched at its current position.
pub(crate) fn build_wire_body<'a>(
    compression: Compression,
    stream: &'a mut dyn BatchStream,
    scratch: &'a Mutex<Vec<u8>>,
) -> Result<WireBody<'a>, BodyError> {
    match compression {
        Compression::None => {
            let start = stream.stream_position()?;
            let end = stream.seek(SeekFrom::End(0))?;
            stream.seek(SeekFrom::Start(start))?;
            Ok(WireBody::Raw {
                stream,
                remaining: end.saturating_sub(start),
            })
        }
        Compression::Deflate => {
            let mut scratch = checkout(scratch);
            let mut encoder = DeflateEncoder::new(&mut *scratch, flate2::Compression::best());
            io::copy(stream, &mut encoder)?;
            encoder.finish()?;
            Ok(WireBody::Compressed {
                scratch,
                pos: 0,
                encoding: "deflate",
            })
        }
        #[cfg(feature = "gzip")]
        Compression::Gzip => {
            let mut scratch = checkout(scratch);
            let mut encoder = GzEncoder::new(&mut *scratch, flate2::Compression::best());
            io::copy(stream, &mut encoder)?;
            encoder.finish()?;
            Ok(WireBody::Compressed {
                scratch,
                pos: 0,
                encoding: "gzip",
            })
        }
        #[cfg(not(feature = "gzip"))]
        Compression::Gzip => Err(BodyError::Unsupported(compression)),
    }
}

/// Checks out the shared scratch buffer: truncated between calls, capacity
/// reserved lazily on first use.
fn checkout(scratch: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    let mut buf = scratch.lock().unwrap_or_else(PoisonError::into_inner);
    buf.clear();
    if buf.capacity() == 0 {
        buf.reserve(SCRATCH_INITIAL_CAPACITY);
    }
    buf
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use flate2::read::DeflateDecoder;
    #[cfg(feature = "gzip")]
    use flate2::read::GzDecoder;

    use super::*;

    fn collect(body: &mut WireBody<'_>) -> Vec<u8> {
        let mut out = Vec::new();
        body.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn raw_body_preserves_payload_bytes() {
        let payload = b"{\"a\":1}\n".to_vec();
        let mut stream = Cursor::new(payload.clone());
        let scratch = Mutex::new(Vec::new());

        let mut body = build_wire_body(Compression::None, &mut stream, &scratch).unwrap();
        assert_eq!(body.len(), payload.len() as u64);
        assert_eq!(body.content_encoding(), None);
        assert_eq!(collect(&mut body), payload);
    }

    #[test]
    fn raw_body_starts_at_current_position() {
        let mut stream = Cursor::new(b"skip:tail".to_vec());
        stream.set_position(5);
        let scratch = Mutex::new(Vec::new());

        let mut body = build_wire_body(Compression::None, &mut stream, &scratch).unwrap();
        assert_eq!(body.len(), 4);
        assert_eq!(collect(&mut body), b"tail");
        assert_eq!(body.len(), 0);
        assert!(body.is_empty());
    }

    #[test]
    fn deflate_round_trip() {
        let payload = b"telemetry batch with some repetition repetition repetition".to_vec();
        let mut stream = Cursor::new(payload.clone());
        let scratch = Mutex::new(Vec::new());

        let mut body = build_wire_body(Compression::Deflate, &mut stream, &scratch).unwrap();
        assert_eq!(body.content_encoding(), Some("deflate"));
        let wire = collect(&mut body);
        drop(body);

        let mut inflated = Vec::new();
        DeflateDecoder::new(wire.as_slice())
            .read_to_end(&mut inflated)
            .unwrap();
        assert_eq!(inflated, payload);
    }

    #[test]
    fn deflate_shrinks_repeated_bytes() {
        let payload = vec![b'x'; 10];
        let mut stream = Cursor::new(payload.clone());
        let scratch = Mutex::new(Vec::new());

        let mut body = build_wire_body(Compression::Deflate, &mut stream, &scratch).unwrap();
        let wire = collect(&mut body);
        drop(body);
        assert!(wire.len() < 10, "wire body was {} bytes", wire.len());

        let mut inflated = Vec::new();
        DeflateDecoder::new(wire.as_slice())
            .read_to_end(&mut inflated)
            .unwrap();
        assert_eq!(inflated, payload);
    }

    #[test]
    fn deflate_consumes_source_to_end() {
        let mut stream = Cursor::new(b"payload".to_vec());
        let scratch = Mutex::new(Vec::new());

        let body = build_wire_body(Compression::Deflate, &mut stream, &scratch).unwrap();
        drop(body);
        assert_eq!(stream.position(), 7);
    }

    #[test]
    fn deflate_of_empty_input_inflates_to_empty() {
        let mut stream = Cursor::new(Vec::new());
        let scratch = Mutex::new(Vec::new());

        let mut body = build_wire_body(Compression::Deflate, &mut stream, &scratch).unwrap();
        let wire = collect(&mut body);
        drop(body);

        let mut inflated = Vec::new();
        DeflateDecoder::new(wire.as_slice())
            .read_to_end(&mut inflated)
            .unwrap();
        assert!(inflated.is_empty());
    }

    #[test]
    fn scratch_buffer_is_truncated_not_reallocated() {
        let scratch = Mutex::new(Vec::new());

        let mut big = Cursor::new(vec![b'a'; 64 * 1024]);
        let body = build_wire_body(Compression::Deflate, &mut big, &scratch).unwrap();
        drop(body);
        let capacity_after_big = scratch.lock().unwrap().capacity();
        assert!(capacity_after_big >= SCRATCH_INITIAL_CAPACITY);

        let payload = b"small".to_vec();
        let mut small = Cursor::new(payload.clone());
        let mut body = build_wire_body(Compression::Deflate, &mut small, &scratch).unwrap();
        let wire = collect(&mut body);
        drop(body);
        assert_eq!(scratch.lock().unwrap().capacity(), capacity_after_big);

        let mut inflated = Vec::new();
        DeflateDecoder::new(wire.as_slice())
            .read_to_end(&mut inflated)
            .unwrap();
        assert_eq!(inflated, payload);
    }

    #[cfg(not(feature = "gzip"))]
    #[test]
    fn gzip_without_feature_is_unsupported() {
        let mut stream = Cursor::new(b"payload".to_vec());
        let scratch = Mutex::new(Vec::new());

        let result = build_wire_body(Compression::Gzip, &mut stream, &scratch);
        assert!(matches!(result, Err(BodyError::Unsupported(Compression::Gzip))));
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn gzip_round_trip() {
        let payload = b"gzip framed telemetry batch".to_vec();
        let mut stream = Cursor::new(payload.clone());
        let scratch = Mutex::new(Vec::new());

        let mut body = build_wire_body(Compression::Gzip, &mut stream, &scratch).unwrap();
        assert_eq!(body.content_encoding(), Some("gzip"));
        let wire = collect(&mut body);
        drop(body);

        let mut inflated = Vec::new();
        GzDecoder::new(wire.as_slice())
            .read_to_end(&mut inflated)
            .unwrap();
        assert_eq!(inflated, payload);
    }

    #[test]
    fn compression_display_names() {
        assert_eq!(Compression::None.to_string(), "none");
        assert_eq!(Compression::Deflate.to_string(), "deflate");
        assert_eq!(Compression::Gzip.to_string(), "gzip");
    }
}
