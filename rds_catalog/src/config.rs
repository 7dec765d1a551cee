//! Configuration for connecting to the backing store.
//!
//! The RDS core does not parse CLI arguments itself — argument parsing is
//! the dispatcher/entrypoint's job, out of scope here — but it exposes a
//! `clap`-derivable struct in the same shape as the teacher's DSN config
//! blocks, so an embedding binary can fold it into its own `clap::Parser`.

use clap::Parser;

/// How to reach the `RDS_catalog` / `RDS` tables.
#[derive(Debug, Clone, Parser)]
pub struct RdsCatalogConfig {
    /// Path to the SQLite database file backing the RDS catalog. Use
    /// `:memory:` for an ephemeral, process-local catalog (mainly useful in
    /// tests).
    #[clap(long = "rds-db-path", env = "RDS_DB_PATH", default_value = ":memory:")]
    pub db_path: String,

    /// Maximum number of pooled connections to the backing store.
    ///
    /// Ignored (forced to 1) when `db_path` is `:memory:`, since SQLite's
    /// in-memory mode is per-connection and a pool larger than one would
    /// silently fan out to independent, empty databases.
    #[clap(long = "rds-pool-size", env = "RDS_POOL_SIZE", default_value_t = 4)]
    pub pool_size: u32,
}

impl Default for RdsCatalogConfig {
    fn default() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            pool_size: 4,
        }
    }
}
