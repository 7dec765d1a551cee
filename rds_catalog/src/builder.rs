//! `RdsBuilder`: the four-phase materialization of one [`Conjunction`] into
//! rows of `RDS` (§4.5 of the specification).

use crate::{
    catalog::CatalogStore,
    executor::{SqlExecutor, SqlValue},
    fingerprint::RdsId,
    model::Conjunction,
    sql_fragment::render_alternatives,
    Result,
};
use observability_deps::tracing::debug;
use std::sync::Arc;

/// Materializes one conjunction into `RDS` rows.
#[derive(Debug, Clone)]
pub struct RdsBuilder {
    executor: Arc<dyn SqlExecutor>,
    catalog: CatalogStore,
}

impl RdsBuilder {
    /// Build over the given executor.
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        let catalog = CatalogStore::new(Arc::clone(&executor));
        Self { executor, catalog }
    }

    /// Run phases 1-4 and return the new `rds_id`.
    pub fn build(&self, conjunction: &Conjunction, subquery: &str) -> Result<RdsId> {
        // Phase 1 — register.
        let rds_id = self.catalog.register(subquery)?;

        // Phase 2 — seed.
        let head = match conjunction.head() {
            Some(head) => head,
            None => return Ok(rds_id),
        };
        let seed = render_alternatives(head);
        let seed_sql = format!(
            "INSERT INTO RDS \
             SELECT {rds_id}, objects.inode, objects.objectname \
             FROM objects \
             JOIN tagging ON tagging.inode = objects.inode \
             JOIN tags    ON tags.tag_id   = tagging.tag_id \
             WHERE ({sql})",
            sql = seed.sql,
        );
        self.executor.exec(&seed_sql, &seed.params)?;

        // Phase 3 — intersect with the remaining ANDs.
        for node in &conjunction.chain[1..] {
            let fragment = render_alternatives(node);
            let sql = format!(
                "DELETE FROM RDS \
                 WHERE rds_id = ? \
                   AND inode NOT IN ( \
                     SELECT objects.inode FROM objects \
                       JOIN tagging ON tagging.inode = objects.inode \
                       JOIN tags    ON tags.tag_id   = tagging.tag_id \
                      WHERE ({sql}) \
                   )",
                sql = fragment.sql,
            );
            let mut params = vec![SqlValue::int(rds_id)];
            params.extend(fragment.params);
            self.executor.exec(&sql, &params)?;
        }

        // Phase 4 — subtract negations. For every main-chain atom, walk its
        // own negated chain; each negated atom is removed independently, in
        // its own statement, just as phase 3's intersections are.
        for negated_at_position in &conjunction.negated {
            for negated in negated_at_position {
                let fragment = render_alternatives(negated);
                let sql = format!(
                    "DELETE FROM RDS \
                     WHERE rds_id = ? \
                       AND inode IN ( \
                         SELECT objects.inode FROM objects \
                           JOIN tagging ON tagging.inode = objects.inode \
                           JOIN tags    ON tags.tag_id   = tagging.tag_id \
                          WHERE ({sql}) \
                       )",
                    sql = fragment.sql,
                );
                let mut params = vec![SqlValue::int(rds_id)];
                params.extend(fragment.params);
                self.executor.exec(&sql, &params)?;
            }
        }

        debug!(rds_id, subquery, "materialized RDS");
        Ok(rds_id)
    }
}
