//! Shared helpers for test binaries across the workspace.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(missing_debug_implementations, clippy::explicit_iter_loop, clippy::use_self)]

use parking_lot::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize a `tracing_subscriber` for test output, once per process.
///
/// Tests that want to see `debug!`/`warn!` output from `rds_catalog` (e.g.
/// while debugging a flaky concurrency test) can call this at the top of the
/// test body; it is a no-op on subsequent calls.
pub fn maybe_start_logging() {
    TRACING_INIT.call_once(|| {
        tracing_log::LogTracer::init().ok();
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A [`tempfile::NamedTempFile`] that is guaranteed to not exist on disk yet
/// (only its path is reserved), for exercising on-disk SQLite lifecycles
/// without colliding with a parallel test run.
pub fn unused_tempfile_path() -> std::path::PathBuf {
    let file = tempfile::NamedTempFile::new().expect("create tempfile");
    let path = file.path().to_path_buf();
    file.close().expect("close tempfile");
    path
}
