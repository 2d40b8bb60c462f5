//! Tracing/logging setup shared by binaries and tests.

/// Initialize process-wide tracing with the format named by `AGDB_LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var("AGDB_LOG_FORMAT")
        .ok()
        .and_then(|v| tracing::LogFormat::parse(&v))
        .unwrap_or_default();
    tracing::init(format);
}

/// Tracing configuration (filters, output format).
pub mod tracing;
