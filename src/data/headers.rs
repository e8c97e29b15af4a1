//! Wire-level header names and fixed values.

/// Content type of every batch body.
pub const CONTENT_TYPE: &str = "application/x-json-stream; charset=utf-8";

/// Header carrying the instrumentation key. Treated as a secret.
pub const HEADER_API_KEY: &str = "x-apikey";

/// Header tagging the sending SDK build.
pub const HEADER_SDK_VERSION: &str = "sdk-version";

/// Hint asking the collector to omit the response body on errors.
///
/// Sent only when verbose diagnostics are disabled; the body would be
/// dropped unread, so skipping it saves the collector the transfer.
pub const HEADER_SKIP_RESPONSE_BODY: &str = "x-no-response-body";

/// Collector header listing per-item ingestion errors on a rejection.
pub const HEADER_INGEST_ERRORS: &str = "x-ingest-errors";

/// `sdk-version` value: platform/runtime/version tag.
pub const SDK_VERSION: &str = concat!("rs:tracewire-", env!("CARGO_PKG_VERSION"));

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("tracewire/", env!("CARGO_PKG_VERSION"));
