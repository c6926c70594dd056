//! Migration orchestrator - walks the catalog and rewrites locations.
//!
//! Tables are processed one at a time in the order the metastore lists them.
//! For each table (and, when enabled, each of its partitions) the current
//! location is resolved, rewritten, and written back only if the rewrite
//! matched. Any unexpected metastore error aborts the run.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, PartitionKey};
use crate::config::MigrationConfig;
use crate::error::Result;
use crate::location::rewrite_location;
use crate::metastore::MetastoreClient;

/// Catalog entity whose location was rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Table { table: String },
    Partition { table: String, partition: PartitionKey },
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Table { table } => write!(f, "table {}", table),
            Entity::Partition { table, partition } => {
                write!(f, "table {} partition {}", table, partition)
            }
        }
    }
}

/// A location rewrite, applied or planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationChange {
    pub entity: Entity,
    pub old_location: String,
    pub new_location: String,
    /// False on dry runs.
    pub applied: bool,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// No ALTER commands were issued.
    pub dry_run: bool,

    /// Tables examined.
    pub tables_total: usize,

    /// Tables whose location was rewritten.
    pub tables_altered: usize,

    /// Tables that would be rewritten; only non-zero on a dry run.
    pub tables_planned: usize,

    /// Tables left as they were.
    pub tables_unchanged: usize,

    /// Partitions examined.
    pub partitions_total: usize,

    /// Partitions whose location was rewritten.
    pub partitions_altered: usize,

    /// Partitions that would be rewritten; only non-zero on a dry run.
    pub partitions_planned: usize,

    /// Partitions left as they were.
    pub partitions_skipped: usize,

    /// Every rewrite, in the order it happened.
    pub changes: Vec<LocationChange>,
}

impl MigrationResult {
    fn new(run_id: String, started_at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            run_id,
            started_at,
            completed_at: started_at,
            duration_seconds: 0.0,
            dry_run,
            tables_total: 0,
            tables_altered: 0,
            tables_planned: 0,
            tables_unchanged: 0,
            partitions_total: 0,
            partitions_altered: 0,
            partitions_planned: 0,
            partitions_skipped: 0,
            changes: Vec::new(),
        }
    }

    /// Serialize the result as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of a metastore health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// `SHOW TABLES` round trip in milliseconds.
    pub latency_ms: u64,
    /// Number of tables visible to the session.
    pub tables: usize,
}

/// Migration orchestrator.
pub struct Orchestrator<C> {
    catalog: Catalog<C>,
    config: MigrationConfig,
}

impl<C: MetastoreClient> Orchestrator<C> {
    /// Create an orchestrator over an open metastore session.
    pub fn new(client: C, config: MigrationConfig) -> Self {
        Self {
            catalog: Catalog::new(client),
            config,
        }
    }

    /// The underlying metastore client.
    pub fn client(&self) -> &C {
        self.catalog.client()
    }

    /// Consume the orchestrator and return the metastore client.
    pub fn into_client(self) -> C {
        self.catalog.into_client()
    }

    /// Check that the session can list tables.
    pub fn health_check(&mut self) -> Result<HealthCheckResult> {
        let start = Instant::now();
        let tables = self.catalog.list_tables()?;
        Ok(HealthCheckResult {
            latency_ms: start.elapsed().as_millis() as u64,
            tables: tables.len(),
        })
    }

    /// Run the migration.
    pub fn run(&mut self) -> Result<MigrationResult> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut result = MigrationResult::new(run_id, started_at, self.config.dry_run);

        info!(
            "Starting location migration run {} (storage account: {}, partitions: {})",
            result.run_id, self.config.storage_account, self.config.migrate_partitions
        );
        if self.config.dry_run {
            warn!("Dry run: locations will be resolved but not altered");
        }

        let tables = self.catalog.list_tables()?;
        info!("Found {} tables", tables.len());

        for wanted in &self.config.tables {
            if !tables.contains(wanted) {
                warn!("table {} was requested but does not exist", wanted);
            }
        }

        for table in &tables {
            if !self.config.includes_table(table) {
                debug!("table {} not selected, skipping", table);
                continue;
            }

            self.migrate_table(table, &mut result)?;

            if self.config.migrate_partitions {
                self.migrate_partitions(table, &mut result)?;
            }
        }

        let completed_at = Utc::now();
        result.completed_at = completed_at;
        result.duration_seconds = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        info!(
            "Migration run {} finished: {} of {} tables altered ({} planned), {} of {} partitions altered ({} planned)",
            result.run_id,
            result.tables_altered,
            result.tables_total,
            result.tables_planned,
            result.partitions_altered,
            result.partitions_total,
            result.partitions_planned
        );

        Ok(result)
    }

    fn migrate_table(&mut self, table: &str, result: &mut MigrationResult) -> Result<()> {
        result.tables_total += 1;
        let location = self.catalog.table_location(table)?;

        let Some(new_location) = rewrite_location(&location, &self.config.storage_account) else {
            info!("table {} is located at {}", table, location);
            result.tables_unchanged += 1;
            return Ok(());
        };

        info!(
            "table {} is located at {}. Location will be altered to {}",
            table, location, new_location
        );

        let applied = !self.config.dry_run;
        if applied {
            self.catalog.set_table_location(table, &new_location)?;
            info!("successfully altered table {}'s location", table);
            result.tables_altered += 1;
        } else {
            result.tables_planned += 1;
        }

        result.changes.push(LocationChange {
            entity: Entity::Table {
                table: table.to_string(),
            },
            old_location: location,
            new_location,
            applied,
        });
        Ok(())
    }

    fn migrate_partitions(&mut self, table: &str, result: &mut MigrationResult) -> Result<()> {
        let partitions = self.catalog.list_partitions(table)?;
        if !partitions.is_empty() {
            debug!("table {} has {} partitions", table, partitions.len());
        }

        for partition in partitions {
            result.partitions_total += 1;
            let location = self.catalog.partition_location(table, &partition)?;

            let Some(new_location) = rewrite_location(&location, &self.config.storage_account)
            else {
                debug!(
                    "table {} partition {} is located at {}, skipping",
                    table, partition, location
                );
                result.partitions_skipped += 1;
                continue;
            };

            info!(
                "table {} partition {} is located at {}. Location will be altered to {}",
                table, partition, location, new_location
            );

            let applied = !self.config.dry_run;
            if applied {
                self.catalog
                    .set_partition_location(table, &partition, &new_location)?;
                info!(
                    "successfully altered table {} partition {}'s location",
                    table, partition
                );
                result.partitions_altered += 1;
            } else {
                result.partitions_planned += 1;
            }

            result.changes.push(LocationChange {
                entity: Entity::Partition {
                    table: table.to_string(),
                    partition,
                },
                old_location: location,
                new_location,
                applied,
            });
        }
        Ok(())
    }
}
