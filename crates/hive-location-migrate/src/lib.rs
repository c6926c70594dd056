//! # hive-location-migrate
//!
//! Move Hive metastore tables from S3 archive buckets to Azure Blob containers
//! without touching the data.
//!
//! Only catalog metadata changes: every table (and optionally every
//! partition) whose location lives in an `s3a://archive-<id>-profile` or
//! `s3a://archive-<id>-profile-apm` bucket is re-pointed at the container of
//! the same name in an Azure storage account, via `ALTER TABLE ... SET
//! LOCATION`. Locations that do not match are left alone, so a run can be
//! repeated safely.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hive_location_migrate::{metastore, Config, Orchestrator};
//!
//! fn main() -> hive_location_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let client = metastore::connect(&config.metastore)?;
//!     let mut orchestrator = Orchestrator::new(client, config.migration);
//!     let result = orchestrator.run()?;
//!     println!("Altered {} tables", result.tables_altered);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod location;
pub mod metastore;
pub mod orchestrator;

// Re-exports for convenient access
pub use catalog::{Catalog, PartitionKey};
pub use config::{AuthMode, Config, MetastoreConfig, MigrationConfig};
pub use error::{MigrateError, Result};
pub use location::rewrite_location;
pub use metastore::{InMemoryMetastore, MetastoreClient, Row, RowCursor};
pub use orchestrator::{Entity, HealthCheckResult, LocationChange, MigrationResult, Orchestrator};
