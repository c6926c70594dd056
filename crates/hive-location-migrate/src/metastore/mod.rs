//! Metastore client abstraction.
//!
//! The migration only needs two capabilities from HiveServer2: submit a command
//! string and walk the rows it produced. [`MetastoreClient`] models the open
//! session and [`RowCursor`] the result of one command.
//!
//! A cursor mutably borrows its client, so only one command can be in flight
//! per session, and it is released when dropped on every exit path, including
//! early returns through `?`.
//!
//! Implementations:
//!
//! - [`memory::InMemoryMetastore`]: scripted catalog held in process
//! - `odbc::OdbcMetastore`: HiveServer2 through a Hive ODBC driver (feature `odbc`)

pub mod memory;
#[cfg(feature = "odbc")]
pub mod odbc;

pub use memory::InMemoryMetastore;
#[cfg(feature = "odbc")]
pub use odbc::OdbcMetastore;

use crate::config::MetastoreConfig;
use crate::error::{MigrateError, Result};

/// One result row, each column rendered as text. NULL columns are empty strings.
pub type Row = Vec<String>;

/// Rows produced by a single executed command.
pub trait RowCursor {
    /// Fetch the next row, or `None` once the result set is exhausted.
    fn next_row(&mut self) -> Result<Option<Row>>;
}

/// An open, authenticated session to the metastore.
pub trait MetastoreClient {
    /// Execute `command` and return a cursor over its rows.
    ///
    /// DDL commands yield an empty cursor. Rejected or malformed commands
    /// fail with [`MigrateError::Query`].
    fn execute(&mut self, command: &str) -> Result<Box<dyn RowCursor + '_>>;
}

impl<C: MetastoreClient + ?Sized> MetastoreClient for &mut C {
    fn execute(&mut self, command: &str) -> Result<Box<dyn RowCursor + '_>> {
        (**self).execute(command)
    }
}

impl<C: MetastoreClient + ?Sized> MetastoreClient for Box<C> {
    fn execute(&mut self, command: &str) -> Result<Box<dyn RowCursor + '_>> {
        (**self).execute(command)
    }
}

/// Cursor for commands that return no result set.
pub struct EmptyCursor;

impl RowCursor for EmptyCursor {
    fn next_row(&mut self) -> Result<Option<Row>> {
        Ok(None)
    }
}

/// Open a session to the metastore described by `config`.
#[cfg(feature = "odbc")]
pub fn connect(config: &MetastoreConfig) -> Result<Box<dyn MetastoreClient>> {
    Ok(Box::new(OdbcMetastore::connect(config)?))
}

/// Open a session to the metastore described by `config`.
///
/// Without the `odbc` feature there is no network client compiled in.
#[cfg(not(feature = "odbc"))]
pub fn connect(config: &MetastoreConfig) -> Result<Box<dyn MetastoreClient>> {
    Err(MigrateError::Connection(format!(
        "cannot connect to {}:{}: built without ODBC support. \
         Rebuild with `--features odbc` and install a Hive ODBC driver.",
        config.host, config.port
    )))
}

/// Execute `command` and collect every row.
pub fn query_all<C: MetastoreClient + ?Sized>(client: &mut C, command: &str) -> Result<Vec<Row>> {
    let mut cursor = client.execute(command)?;
    let mut rows = Vec::new();
    while let Some(row) = cursor.next_row()? {
        rows.push(row);
    }
    Ok(rows)
}

/// Return column `idx` of `row`, failing with a Query error if the row is too short.
pub(crate) fn column<'r>(row: &'r Row, idx: usize, command: &str) -> Result<&'r str> {
    row.get(idx).map(String::as_str).ok_or_else(|| {
        MigrateError::query(
            command,
            format!("expected at least {} column(s), got {}", idx + 1, row.len()),
        )
    })
}

/// Build a text row from `num_cols` raw cells. NULL cells become empty strings
/// and invalid UTF-8 is replaced rather than rejected.
#[cfg_attr(not(feature = "odbc"), allow(dead_code))]
pub(crate) fn text_row<'a>(num_cols: usize, cell: impl Fn(usize) -> Option<&'a [u8]>) -> Row {
    (0..num_cols)
        .map(|idx| {
            cell(idx)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_row_null_cells_are_empty() {
        let cells: [Option<&[u8]>; 3] = [
            Some(&b"Location:"[..]),
            None,
            Some(&b"s3a://archive-abc-profile/t"[..]),
        ];
        let row = text_row(3, |idx| cells[idx]);
        assert_eq!(row, ["Location:", "", "s3a://archive-abc-profile/t"]);
    }

    #[test]
    fn test_text_row_replaces_invalid_utf8() {
        let cells: [Option<&[u8]>; 1] = [Some(&b"dt=\xff"[..])];
        assert_eq!(text_row(1, |idx| cells[idx]), ["dt=\u{fffd}"]);
    }

    #[test]
    fn test_text_row_reads_only_num_cols() {
        let cells: [Option<&[u8]>; 2] = [Some(&b"events"[..]), Some(&b"ignored"[..])];
        assert_eq!(text_row(1, |idx| cells[idx]), ["events"]);
        assert!(text_row(0, |idx| cells[idx]).is_empty());
    }

    #[test]
    fn test_query_all_collects_rows() {
        let mut ms = InMemoryMetastore::new().with_table("events", "s3a://archive-abc-profile/events");
        let rows = query_all(&mut ms, "SHOW TABLES").unwrap();
        assert_eq!(rows, [vec!["events".to_string()]]);
        assert_eq!(ms.open_cursors(), 0);
    }

    #[test]
    fn test_column_out_of_range_is_query_error() {
        let row: Row = vec!["only".to_string()];
        assert_eq!(column(&row, 0, "SHOW TABLES").unwrap(), "only");
        assert!(matches!(
            column(&row, 1, "SHOW TABLES"),
            Err(MigrateError::Query { .. })
        ));
    }
}
