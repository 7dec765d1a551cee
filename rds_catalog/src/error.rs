//! Error taxonomy for the RDS subsystem.
//!
//! Mirrors the table in the specification: SQL failures propagate as-is,
//! an empty query is not an error (callers see `Ok(None)` from
//! [`crate::coordinator::RdsCoordinator::prepare`]), and an id-only atom
//! reaching the canonicalizer is a programmer error that aborts the build.

use snafu::Snafu;

/// Errors produced by the RDS subsystem.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// The backing store rejected a statement. The fingerprint being
    /// assembled at the time, if any, must be discarded by the caller; a
    /// retry with `rebuild_expired = true` purges any partial state left
    /// behind by Phase 1 of an aborted build.
    #[snafu(display("sql backing store rejected a statement: {source}"))]
    Sql { source: rusqlite::Error },

    /// Checking out a pooled connection failed.
    #[snafu(display("could not check out a pooled connection: {source}"))]
    Pool { source: r2d2::Error },

    /// A conjunction with no renderable atom was passed to the
    /// canonicalizer. Callers must not call `canonicalize` on an empty
    /// conjunction (the specification forbids it); this variant exists so
    /// the error path is total rather than panicking.
    #[snafu(display("conjunction has no renderable atom"))]
    EmptyConjunction,

    /// An id-only ([`crate::model::TagAtom::ById`]) atom reached the
    /// canonicalizer. Implementations must resolve `tag_id` to a tag name
    /// before canonicalization; this is the one error in this enum that
    /// indicates a bug in the caller rather than a runtime condition.
    #[snafu(display(
        "id-only tag atom reached the canonicalizer; resolve tag_id to a name first"
    ))]
    InvalidAtom,
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
