//! A facade crate so the rest of the workspace depends on one place for
//! tracing macros, instead of pinning `tracing` separately in every `Cargo.toml`.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(missing_debug_implementations, clippy::explicit_iter_loop, clippy::use_self)]

pub use tracing;
pub use tracing::{debug, error, info, trace, warn};
