//! Reading back a materialized RDS, and invalidating one by tag (§4.7 of
//! the specification).

use crate::{
    executor::{placeholders, SqlExecutor, SqlValue},
    fingerprint::{Fingerprint, RdsId},
    model::FileHandle,
    Result,
};
use std::sync::Arc;

/// Reads the file handles answering a materialized fingerprint.
#[derive(Debug, Clone)]
pub struct RdsReader {
    executor: Arc<dyn SqlExecutor>,
}

impl RdsReader {
    /// Wrap an executor.
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self { executor }
    }

    /// Every `(inode, objectname)` pair across all the conjuncts named by
    /// `fingerprint`, deduplicated by `(inode, objectname)` — the union the
    /// disjunction's matching conjuncts describe together.
    ///
    /// The specification returns a `multimap<objectname -> list<FileHandle>>`
    /// so a caller can look up handles by name without re-scanning. An owned
    /// `Vec<FileHandle>` carries the same information (grouping by name is a
    /// cheap fold a caller can do if it needs the map shape) and keeps this
    /// type out of the pointer-graph-replacement business the rest of this
    /// crate already went through for [`crate::model::Conjunction`].
    pub fn load(&self, fingerprint: &Fingerprint) -> Result<Vec<FileHandle>> {
        if fingerprint.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT DISTINCT inode, objectname FROM RDS WHERE rds_id IN ({})",
            placeholders(fingerprint.ids().len())
        );
        let params: Vec<SqlValue> = fingerprint.ids().iter().map(|id| SqlValue::int(*id)).collect();
        let rows = self.executor.query(&sql, &params)?;

        Ok(rows
            .into_iter()
            .map(|row| FileHandle {
                inode: row[0].as_integer(),
                name: row[1].as_text().to_string(),
            })
            .collect())
    }

    /// Resolve `objectname` against the conjuncts named by `fingerprint`,
    /// returning its inode, or `0` if there is no match.
    ///
    /// When `inode` is `Some`, the match must also carry that inode — this
    /// is the fast path used when the caller already believes it knows
    /// which file it's looking for and only wants reassurance RDS agrees.
    pub fn contains(
        &self,
        fingerprint: &Fingerprint,
        objectname: &str,
        inode: Option<i64>,
    ) -> Result<RdsId> {
        if fingerprint.is_empty() {
            return Ok(0);
        }

        let in_clause = placeholders(fingerprint.ids().len());
        let mut params = vec![SqlValue::text(objectname)];
        let sql = if let Some(inode) = inode {
            params.push(SqlValue::int(inode));
            params.extend(fingerprint.ids().iter().map(|id| SqlValue::int(*id)));
            format!(
                "SELECT inode FROM RDS WHERE objectname = ? AND inode = ? AND rds_id IN ({in_clause}) LIMIT 1"
            )
        } else {
            params.extend(fingerprint.ids().iter().map(|id| SqlValue::int(*id)));
            format!(
                "SELECT inode FROM RDS WHERE objectname = ? AND rds_id IN ({in_clause}) LIMIT 1"
            )
        };

        let rows = self.executor.query(&sql, &params)?;
        Ok(rows.first().map(|row| row[0].as_integer()).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::SqliteExecutor;

    fn seeded() -> Arc<dyn SqlExecutor> {
        let executor = SqliteExecutor::new_in_memory().unwrap();
        executor
            .exec(
                "INSERT INTO RDS_catalog (subquery) VALUES ('red/'), ('big/')",
                &[],
            )
            .unwrap();
        executor
            .exec(
                "INSERT INTO RDS (rds_id, inode, objectname) VALUES \
                 (1, 1, 'alpha'), (1, 2, 'beta'), (2, 2, 'beta'), (2, 3, 'gamma')",
                &[],
            )
            .unwrap();
        Arc::new(executor)
    }

    #[test]
    fn load_unions_and_deduplicates_across_conjuncts() {
        let reader = RdsReader::new(seeded());
        let mut handles = reader.load(&Fingerprint::from_ids(vec![1, 2])).unwrap();
        handles.sort_by(|a, b| a.inode.cmp(&b.inode));
        assert_eq!(
            handles,
            vec![
                FileHandle { inode: 1, name: "alpha".to_string() },
                FileHandle { inode: 2, name: "beta".to_string() },
                FileHandle { inode: 3, name: "gamma".to_string() },
            ]
        );
    }

    #[test]
    fn load_of_empty_fingerprint_is_empty() {
        let reader = RdsReader::new(seeded());
        assert_eq!(reader.load(&Fingerprint::default()).unwrap(), Vec::new());
    }

    #[test]
    fn contains_reflects_materialized_rows() {
        let reader = RdsReader::new(seeded());
        let fp = Fingerprint::from_ids(vec![1]);
        assert_eq!(reader.contains(&fp, "alpha", None).unwrap(), 1);
        assert_eq!(reader.contains(&fp, "gamma", None).unwrap(), 0);
    }

    #[test]
    fn contains_with_known_inode_requires_a_match() {
        let reader = RdsReader::new(seeded());
        let fp = Fingerprint::from_ids(vec![1]);
        assert_eq!(reader.contains(&fp, "alpha", Some(1)).unwrap(), 1);
        assert_eq!(reader.contains(&fp, "alpha", Some(99)).unwrap(), 0);
    }
}
