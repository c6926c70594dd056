//! Catalog operations: enumerate tables and partitions, read and set locations.
//!
//! [`Catalog`] wraps a [`MetastoreClient`] and turns the raw command/row
//! protocol into typed operations. Errors are wrapped with the table (and
//! partition) they concern so a failed run points at the entity that broke it.

pub mod commands;
mod partition;

pub use partition::PartitionKey;

use tracing::debug;

use crate::error::{MigrateError, Result};
use crate::metastore::{column, query_all, MetastoreClient};

/// Field name prefix of the `DESCRIBE FORMATTED` row carrying the location.
const LOCATION_FIELD: &str = "Location";

/// Typed access to the metastore catalog over a single session.
pub struct Catalog<C> {
    client: C,
}

impl<C: MetastoreClient> Catalog<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Consume the catalog and return the underlying client.
    pub fn into_client(self) -> C {
        self.client
    }

    /// List every table, in the order the metastore returns them.
    pub fn list_tables(&mut self) -> Result<Vec<String>> {
        let command = commands::SHOW_TABLES;
        let rows = query_all(&mut self.client, command)
            .map_err(|e| MigrateError::entity("tables", "list", e))?;

        rows.iter()
            .map(|row| column(row, 0, command).map(str::to_string))
            .collect()
    }

    /// List the partitions of `table`.
    ///
    /// Unpartitioned tables yield an empty list rather than an error. Only a
    /// rejected `SHOW PARTITIONS` counts as unpartitioned; failures while
    /// reading its rows are fatal.
    pub fn list_partitions(&mut self, table: &str) -> Result<Vec<PartitionKey>> {
        let command = commands::show_partitions(table);
        let wrap = |e| MigrateError::entity(format!("table {}", table), "list partitions of", e);

        let mut cursor = match self.client.execute(&command) {
            Ok(cursor) => cursor,
            Err(e) if e.is_not_partitioned() => {
                debug!("table {} is not partitioned", table);
                return Ok(Vec::new());
            }
            Err(e) => return Err(wrap(e)),
        };

        let mut partitions = Vec::new();
        while let Some(row) = cursor.next_row().map_err(wrap)? {
            partitions.push(PartitionKey::from(column(&row, 0, &command).map_err(wrap)?));
        }
        Ok(partitions)
    }

    /// Current location of `table`, or an empty string if none is reported.
    pub fn table_location(&mut self, table: &str) -> Result<String> {
        let command = commands::describe_table(table);
        self.scan_location(&command)
            .map_err(|e| MigrateError::entity(format!("table {}", table), "describe", e))
    }

    /// Current location of `partition` of `table`, or an empty string if none is reported.
    pub fn partition_location(&mut self, table: &str, partition: &PartitionKey) -> Result<String> {
        let command = commands::describe_partition(table, partition);
        self.scan_location(&command).map_err(|e| {
            MigrateError::entity(
                format!("table {} partition {}", table, partition),
                "describe",
                e,
            )
        })
    }

    /// Point `table` at `location`. Only catalog metadata changes.
    pub fn set_table_location(&mut self, table: &str, location: &str) -> Result<()> {
        let command = commands::alter_table_location(table, location);
        query_all(&mut self.client, &command).map_err(|e| {
            MigrateError::entity(format!("table {}", table), "alter location of", e)
        })?;
        Ok(())
    }

    /// Point `partition` of `table` at `location`.
    pub fn set_partition_location(
        &mut self,
        table: &str,
        partition: &PartitionKey,
        location: &str,
    ) -> Result<()> {
        let command = commands::alter_partition_location(table, partition, location);
        query_all(&mut self.client, &command).map_err(|e| {
            MigrateError::entity(
                format!("table {} partition {}", table, partition),
                "alter location of",
                e,
            )
        })?;
        Ok(())
    }

    /// Run a `DESCRIBE FORMATTED` command and return the value of the first
    /// `Location` row.
    fn scan_location(&mut self, command: &str) -> Result<String> {
        let mut cursor = self.client.execute(command)?;
        while let Some(row) = cursor.next_row()? {
            if column(&row, 0, command)?.starts_with(LOCATION_FIELD) {
                return Ok(column(&row, 1, command)?.to_string());
            }
        }
        Ok(String::new())
    }
}
