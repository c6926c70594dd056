//! In-process metastore that answers the commands the migration issues.
//!
//! Tables keep the order they were added in, which is the order `SHOW TABLES`
//! returns them. `DESCRIBE FORMATTED` output is laid out the way HiveServer2
//! renders it: three columns, padded field names, one `Location:` row.
//! Failures can be scripted per command, either when the command executes or
//! when its first row is fetched.

use std::cell::Cell;
use std::collections::HashMap;

use tracing::debug;

use super::{MetastoreClient, Row, RowCursor};
use crate::error::{MigrateError, Result};

/// Field name column width used by HiveServer2's formatted describe output.
const FIELD_WIDTH: usize = 20;

#[derive(Debug, Clone)]
struct MemTable {
    name: String,
    location: Option<String>,
    /// `None` for unpartitioned tables.
    partitions: Option<Vec<MemPartition>>,
}

#[derive(Debug, Clone)]
struct MemPartition {
    key: String,
    location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailAt {
    Execute,
    Fetch,
}

/// Scripted metastore held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryMetastore {
    tables: Vec<MemTable>,
    failures: HashMap<String, (FailAt, String)>,
    commands: Vec<String>,
    open_cursors: Cell<usize>,
}

impl InMemoryMetastore {
    /// Create an empty metastore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unpartitioned table stored at `location`.
    pub fn with_table(mut self, name: impl Into<String>, location: impl Into<String>) -> Self {
        self.tables.push(MemTable {
            name: name.into(),
            location: Some(location.into()),
            partitions: None,
        });
        self
    }

    /// Add a partitioned table. Partition keys use the `col=val/col=val` form.
    pub fn with_partitioned_table<K, L>(
        mut self,
        name: impl Into<String>,
        location: impl Into<String>,
        partitions: impl IntoIterator<Item = (K, L)>,
    ) -> Self
    where
        K: Into<String>,
        L: Into<String>,
    {
        let partitions = partitions
            .into_iter()
            .map(|(key, location)| MemPartition {
                key: key.into(),
                location: location.into(),
            })
            .collect();
        self.tables.push(MemTable {
            name: name.into(),
            location: Some(location.into()),
            partitions: Some(partitions),
        });
        self
    }

    /// Add a view: it is listed by `SHOW TABLES` but has no storage location.
    pub fn with_view(mut self, name: impl Into<String>) -> Self {
        self.tables.push(MemTable {
            name: name.into(),
            location: None,
            partitions: None,
        });
        self
    }

    /// Make `command` fail when executed.
    pub fn fail_on(mut self, command: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures
            .insert(command.into(), (FailAt::Execute, message.into()));
        self
    }

    /// Make `command` execute but fail when its rows are fetched.
    pub fn fail_fetch_on(mut self, command: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures
            .insert(command.into(), (FailAt::Fetch, message.into()));
        self
    }

    /// Every command executed so far, in order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Executed `ALTER TABLE` commands, in order.
    pub fn alter_commands(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter(|c| c.starts_with("ALTER TABLE "))
            .map(String::as_str)
            .collect()
    }

    /// Number of cursors not yet dropped.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.get()
    }

    /// Current location of `table`.
    pub fn table_location(&self, table: &str) -> Option<&str> {
        self.find(table).and_then(|t| t.location.as_deref())
    }

    /// Current location of partition `key` of `table`.
    pub fn partition_location(&self, table: &str, key: &str) -> Option<&str> {
        self.find(table)?
            .partitions
            .as_ref()?
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.location.as_str())
    }

    fn find(&self, table: &str) -> Option<&MemTable> {
        self.tables.iter().find(|t| t.name == table)
    }

    fn find_mut(&mut self, table: &str) -> Result<&mut MemTable> {
        self.tables
            .iter_mut()
            .find(|t| t.name == table)
            .ok_or_else(|| table_not_found(table))
    }

    fn dispatch(&mut self, command: &str) -> Result<Vec<Row>> {
        if command == "SHOW TABLES" {
            return Ok(self.tables.iter().map(|t| vec![t.name.clone()]).collect());
        }

        if let Some(table) = command.strip_prefix("SHOW PARTITIONS ") {
            let t = self.find(table).ok_or_else(|| table_not_found(table))?;
            return match &t.partitions {
                Some(parts) => Ok(parts.iter().map(|p| vec![p.key.clone()]).collect()),
                None => Err(semantic_error(format!(
                    "[Error 10241]: Table {} is not a partitioned table",
                    table
                ))),
            };
        }

        if let Some(rest) = command.strip_prefix("DESCRIBE FORMATTED ") {
            return match split_partition_spec(rest) {
                Some((table, spec)) => {
                    let key = spec_to_key(spec);
                    let location = self
                        .partition_location(table, &key)
                        .ok_or_else(|| partition_not_found(table, spec))?
                        .to_string();
                    Ok(describe_rows(Some(&location), Some(&key)))
                }
                None => {
                    let t = self.find(rest).ok_or_else(|| table_not_found(rest))?;
                    Ok(describe_rows(t.location.as_deref(), None))
                }
            };
        }

        if let Some(rest) = command.strip_prefix("ALTER TABLE ") {
            let (target, location) = split_set_location(rest)
                .ok_or_else(|| parse_error(command))?;
            match split_partition_spec(target) {
                Some((table, spec)) => {
                    let key = spec_to_key(spec);
                    let t = self.find_mut(table)?;
                    let partition = t
                        .partitions
                        .as_mut()
                        .and_then(|parts| parts.iter_mut().find(|p| p.key == key))
                        .ok_or_else(|| partition_not_found(table, spec))?;
                    partition.location = location.to_string();
                }
                None => {
                    self.find_mut(target)?.location = Some(location.to_string());
                }
            }
            return Ok(Vec::new());
        }

        Err(parse_error(command))
    }
}

impl MetastoreClient for InMemoryMetastore {
    fn execute(&mut self, command: &str) -> Result<Box<dyn RowCursor + '_>> {
        debug!("in-memory metastore: {}", command);
        self.commands.push(command.to_string());

        let mut fetch_error = None;
        let rows = match self.failures.get(command).cloned() {
            Some((FailAt::Execute, message)) => return Err(MigrateError::query(command, message)),
            Some((FailAt::Fetch, message)) => {
                fetch_error = Some(message);
                Vec::new()
            }
            None => self.dispatch(command).map_err(|e| match e {
                MigrateError::Query { message, .. } => MigrateError::query(command, message),
                other => other,
            })?,
        };

        self.open_cursors.set(self.open_cursors.get() + 1);
        Ok(Box::new(MemoryCursor {
            command: command.to_string(),
            rows: rows.into_iter(),
            fetch_error,
            open: &self.open_cursors,
        }))
    }
}

struct MemoryCursor<'a> {
    command: String,
    rows: std::vec::IntoIter<Row>,
    fetch_error: Option<String>,
    open: &'a Cell<usize>,
}

impl RowCursor for MemoryCursor<'_> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        if let Some(message) = &self.fetch_error {
            return Err(MigrateError::query(self.command.clone(), message.clone()));
        }
        Ok(self.rows.next())
    }
}

impl Drop for MemoryCursor<'_> {
    fn drop(&mut self) {
        self.open.set(self.open.get() - 1);
    }
}

/// Split `table PARTITION(spec)` into its parts.
fn split_partition_spec(target: &str) -> Option<(&str, &str)> {
    let (table, rest) = target.split_once(" PARTITION(")?;
    let spec = rest.strip_suffix(')')?;
    Some((table, spec))
}

/// Split `target SET LOCATION 'uri'` into its parts.
fn split_set_location(rest: &str) -> Option<(&str, &str)> {
    let (target, quoted) = rest.rsplit_once(" SET LOCATION ")?;
    let location = quoted.strip_prefix('\'')?.strip_suffix('\'')?;
    Some((target, location))
}

/// `a=1, b=2` back to the `a=1/b=2` form `SHOW PARTITIONS` reports.
fn spec_to_key(spec: &str) -> String {
    spec.split(", ").collect::<Vec<_>>().join("/")
}

fn field(name: &str, value: &str, comment: &str) -> Row {
    vec![
        format!("{:<width$}", name, width = FIELD_WIDTH),
        value.to_string(),
        comment.to_string(),
    ]
}

fn describe_rows(location: Option<&str>, partition: Option<&str>) -> Vec<Row> {
    let mut rows = vec![
        field("# col_name", "data_type", "comment"),
        field("", "", ""),
        field("message", "string", ""),
        field("", "", ""),
    ];
    match partition {
        Some(key) => {
            rows.push(field("# Detailed Partition Information", "", ""));
            rows.push(field("Partition Value:", &format!("[{}]", key), ""));
        }
        None => rows.push(field("# Detailed Table Information", "", "")),
    }
    rows.push(field("Database:", "default", ""));
    match location {
        Some(location) => {
            rows.push(field("Location:", location, ""));
            rows.push(field("Table Type:", "EXTERNAL_TABLE", ""));
        }
        None => rows.push(field("Table Type:", "VIRTUAL_VIEW", "")),
    }
    rows.push(field("", "", ""));
    rows.push(field("# Storage Information", "", ""));
    rows.push(field("SerDe Library:", "org.apache.hadoop.hive.ql.io.orc.OrcSerde", ""));
    rows
}

fn semantic_error(detail: String) -> MigrateError {
    MigrateError::query(
        "",
        format!(
            "Error while compiling statement: FAILED: SemanticException {}",
            detail
        ),
    )
}

fn table_not_found(table: &str) -> MigrateError {
    semantic_error(format!("[Error 10001]: Table not found {}", table))
}

fn partition_not_found(table: &str, spec: &str) -> MigrateError {
    semantic_error(format!(
        "[Error 10006]: Partition not found {{{}}} in table {}",
        spec, table
    ))
}

fn parse_error(command: &str) -> MigrateError {
    MigrateError::query(
        command,
        "Error while compiling statement: FAILED: ParseException cannot recognize input",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metastore::query_all;

    fn metastore() -> InMemoryMetastore {
        InMemoryMetastore::new()
            .with_table("events", "s3a://archive-abc-profile/events")
            .with_partitioned_table(
                "logs",
                "s3a://archive-abc-profile-apm/logs",
                [
                    ("dt=2024-01-01/hour=00", "s3a://archive-abc-profile-apm/logs/dt=2024-01-01/hour=00"),
                    ("dt=2024-01-01/hour=01", "s3a://archive-abc-profile-apm/logs/dt=2024-01-01/hour=01"),
                ],
            )
    }

    #[test]
    fn test_show_tables_in_insertion_order() {
        let mut ms = metastore();
        let rows = query_all(&mut ms, "SHOW TABLES").unwrap();
        assert_eq!(rows, vec![vec!["events".to_string()], vec!["logs".to_string()]]);
        assert_eq!(ms.open_cursors(), 0);
    }

    #[test]
    fn test_show_partitions_of_unpartitioned_table_fails() {
        let mut ms = metastore();
        let err = query_all(&mut ms, "SHOW PARTITIONS events").unwrap_err();
        assert!(err.is_not_partitioned());
        match err {
            MigrateError::Query { command, .. } => assert_eq!(command, "SHOW PARTITIONS events"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_describe_formatted_has_padded_location_row() {
        let mut ms = metastore();
        let rows = query_all(&mut ms, "DESCRIBE FORMATTED events").unwrap();
        let location = rows.iter().find(|r| r[0].starts_with("Location")).unwrap();
        assert_eq!(location[0], "Location:           ");
        assert_eq!(location[1], "s3a://archive-abc-profile/events");
        assert!(rows.iter().all(|r| r.len() == 3));
    }

    #[test]
    fn test_alter_partition_location() {
        let mut ms = metastore();
        query_all(
            &mut ms,
            "ALTER TABLE logs PARTITION(dt=2024-01-01, hour=01) SET LOCATION 'wasbs://c@a.blob.core.windows.net/x'",
        )
        .unwrap();
        assert_eq!(
            ms.partition_location("logs", "dt=2024-01-01/hour=01"),
            Some("wasbs://c@a.blob.core.windows.net/x")
        );
        assert_eq!(
            ms.partition_location("logs", "dt=2024-01-01/hour=00"),
            Some("s3a://archive-abc-profile-apm/logs/dt=2024-01-01/hour=00")
        );
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let mut ms = metastore();
        assert!(query_all(&mut ms, "DROP TABLE events").is_err());
        assert_eq!(ms.table_location("events"), Some("s3a://archive-abc-profile/events"));
    }

    #[test]
    fn test_scripted_fetch_failure_releases_cursor() {
        let mut ms = metastore().fail_fetch_on("SHOW TABLES", "connection reset");
        let err = query_all(&mut ms, "SHOW TABLES").unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(ms.open_cursors(), 0);
    }
}
