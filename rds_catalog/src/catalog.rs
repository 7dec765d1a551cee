//! `CatalogStore`: persistence for the `RDS_catalog` table.
//!
//! §4.4 of the specification. `fetch_id` ignores the `expired` column on
//! its `SELECT` — eviction is entirely driven by the caller passing
//! `rebuild_expired = true`, exactly as the source does.

use crate::executor::{placeholders, SqlExecutor, SqlValue};
use crate::fingerprint::{Fingerprint, RdsId};
use crate::Result;
use observability_deps::tracing::debug;
use std::sync::Arc;

/// One row of `RDS_catalog`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// The row's id.
    pub rds_id: RdsId,
    /// The canonical subquery this entry indexes.
    pub subquery: String,
    /// Whether the entry has been marked stale by
    /// [`invalidate`](crate::coordinator::RdsCoordinator::invalidate).
    pub expired: bool,
}

/// Catalog persistence, built over a [`SqlExecutor`].
#[derive(Debug, Clone)]
pub struct CatalogStore {
    executor: Arc<dyn SqlExecutor>,
}

impl CatalogStore {
    /// Wrap an executor.
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self { executor }
    }

    /// Look up the id for `subquery`, or `0` if there is none.
    ///
    /// If `rebuild_expired` is set, any existing catalog row (and its `RDS`
    /// rows) for this subquery is purged first, unconditionally — the two
    /// deletes no-op when there is nothing to delete. This is what makes
    /// `prepare(..., rebuild_expired = true)` rebuild from ground truth
    /// regardless of whether the entry was actually marked `expired`.
    pub fn fetch_id(&self, subquery: &str, rebuild_expired: bool) -> Result<RdsId> {
        if rebuild_expired {
            self.executor.exec(
                "DELETE FROM RDS WHERE rds_id IN (SELECT rds_id FROM RDS_catalog WHERE subquery = ?)",
                &[SqlValue::text(subquery)],
            )?;
            self.executor.exec(
                "DELETE FROM RDS_catalog WHERE subquery = ?",
                &[SqlValue::text(subquery)],
            )?;
        }

        let rows = self.executor.query(
            "SELECT rds_id FROM RDS_catalog WHERE subquery = ?",
            &[SqlValue::text(subquery)],
        )?;

        Ok(rows
            .first()
            .map(|row| row[0].as_integer())
            .unwrap_or(0))
    }

    /// Look up the full catalog row for `subquery`, if one exists.
    pub fn entry(&self, subquery: &str) -> Result<Option<CatalogEntry>> {
        let rows = self.executor.query(
            "SELECT rds_id, subquery, expired FROM RDS_catalog WHERE subquery = ?",
            &[SqlValue::text(subquery)],
        )?;

        Ok(rows.first().map(|row| CatalogEntry {
            rds_id: row[0].as_integer(),
            subquery: row[1].as_text().to_string(),
            expired: row[2].as_integer() != 0,
        }))
    }

    /// Insert a new catalog row for `subquery`, returning its id.
    pub fn register(&self, subquery: &str) -> Result<RdsId> {
        let id = self.executor.insert_returning_id(
            "INSERT INTO RDS_catalog (subquery) VALUES (?)",
            &[SqlValue::text(subquery)],
        )?;
        debug!(subquery, rds_id = id, "registered new RDS catalog entry");
        Ok(id)
    }

    /// Mark every entry named by `fingerprint` as expired. Physical deletion
    /// happens later, when a caller requests a rebuild for a matching
    /// subquery.
    pub fn mark_expired(&self, fingerprint: &Fingerprint) -> Result<()> {
        if fingerprint.is_empty() {
            return Ok(());
        }
        let sql = format!(
            "UPDATE RDS_catalog SET expired = 1 WHERE rds_id IN ({})",
            placeholders(fingerprint.ids().len())
        );
        let params: Vec<SqlValue> = fingerprint.ids().iter().map(|id| SqlValue::int(*id)).collect();
        self.executor.exec(&sql, &params)?;
        Ok(())
    }

    /// Delete catalog entries (and their rows) whose subquery contains
    /// `substring`.
    ///
    /// Reserved for structural, tag-level invalidation. Per the
    /// specification's design notes (§9), this is dead code on the live
    /// invalidation path — `invalidate` + lazy rebuild is what actually
    /// runs — kept here as the optional facility the source guards behind
    /// `#if 0`. It is coarse: it will expire unrelated entries whose
    /// subqueries merely happen to contain the substring.
    pub fn evict_by_subquery_like(&self, substring: &str) -> Result<()> {
        let pattern = format!("%{substring}%");
        let ids = self.executor.query(
            "SELECT rds_id FROM RDS_catalog WHERE subquery LIKE ?",
            &[SqlValue::text(pattern.clone())],
        )?;
        self.executor.exec(
            "DELETE FROM RDS WHERE rds_id IN (SELECT rds_id FROM RDS_catalog WHERE subquery LIKE ?)",
            &[SqlValue::text(pattern.clone())],
        )?;
        self.executor.exec(
            "DELETE FROM RDS_catalog WHERE subquery LIKE ?",
            &[SqlValue::text(pattern)],
        )?;
        debug!(evicted = ids.len(), "evicted catalog entries by tag substring");
        Ok(())
    }
}
