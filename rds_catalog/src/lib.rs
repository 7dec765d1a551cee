//! Resilient Data Set cache: translates a parsed tag-query tree into
//! durable, queryable sets of matching objects.
//!
//! A tag query compiles down to a [`model::Disjunction`] of
//! [`model::Conjunction`]s. [`coordinator::RdsCoordinator`] resolves one
//! into a [`fingerprint::Fingerprint`] — materializing any conjunct that
//! isn't already cached via [`builder::RdsBuilder`], and reusing the ones
//! that are via [`catalog::CatalogStore`]. [`reader::RdsReader`] reads the
//! resulting rows back out.
//!
//! All SQL calls in this crate are blocking; nothing here suspends on an
//! async runtime.

#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

pub mod builder;
pub mod canonical;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod fingerprint;
pub mod model;
pub mod reader;
pub mod sql_fragment;

pub use error::{Error, Result};

pub use builder::RdsBuilder;
pub use canonical::canonicalize;
pub use catalog::{CatalogEntry, CatalogStore};
pub use config::RdsCatalogConfig;
pub use coordinator::RdsCoordinator;
pub use executor::{SqlExecutor, SqlValue, SqliteExecutor};
pub use fingerprint::{Fingerprint, RdsId};
pub use model::{AtomWithRelated, Conjunction, Disjunction, FileHandle, Op, TagAtom};
pub use reader::RdsReader;
