//! HiveQL command builders.
//!
//! Table names, partition specs and locations are substituted verbatim.

use super::PartitionKey;

pub const SHOW_TABLES: &str = "SHOW TABLES";

pub fn show_partitions(table: &str) -> String {
    format!("SHOW PARTITIONS {}", table)
}

pub fn describe_table(table: &str) -> String {
    format!("DESCRIBE FORMATTED {}", table)
}

pub fn describe_partition(table: &str, partition: &PartitionKey) -> String {
    format!("DESCRIBE FORMATTED {} PARTITION({})", table, partition.to_spec())
}

pub fn alter_table_location(table: &str, location: &str) -> String {
    format!("ALTER TABLE {} SET LOCATION '{}'", table, location)
}

pub fn alter_partition_location(table: &str, partition: &PartitionKey, location: &str) -> String {
    format!(
        "ALTER TABLE {} PARTITION({}) SET LOCATION '{}'",
        table,
        partition.to_spec(),
        location
    )
}
