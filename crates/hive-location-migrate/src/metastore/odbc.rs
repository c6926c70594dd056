//! ODBC-based HiveServer2 client.
//!
//! **Requirements:**
//! - The `odbc` feature must be enabled
//! - unixODBC (Linux/macOS) and a Hive ODBC driver must be installed, e.g. the
//!   Cloudera ODBC Driver for Apache Hive. The driver name is configurable.
//!
//! One [`OdbcMetastore`] holds one connection for the lifetime of the run.
//! Every command gets its own statement handle, closed when the returned
//! cursor is dropped.

use std::collections::VecDeque;

use odbc_api::buffers::TextRowSet;
use odbc_api::{BlockCursor, Connection, ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use once_cell::sync::OnceCell;
use tracing::{debug, info};

use super::{text_row, EmptyCursor, MetastoreClient, Row, RowCursor};
use crate::config::MetastoreConfig;
use crate::error::{MigrateError, Result};

/// Rows fetched per round trip.
const BATCH_SIZE: usize = 1000;

/// Upper bound for a single text column. Locations are well below this.
const MAX_STR_LEN: usize = 8192;

static ODBC_ENV: OnceCell<Environment> = OnceCell::new();

fn environment() -> Result<&'static Environment> {
    ODBC_ENV.get_or_try_init(Environment::new).map_err(|e| {
        MigrateError::Connection(format!(
            "Failed to create ODBC environment: {}. \
             Make sure unixODBC and a Hive ODBC driver are installed.",
            e
        ))
    })
}

/// HiveServer2 session over ODBC.
pub struct OdbcMetastore {
    conn: Connection<'static>,
}

impl OdbcMetastore {
    /// Connect to the HiveServer2 instance described by `config`.
    pub fn connect(config: &MetastoreConfig) -> Result<Self> {
        let env = environment()?;
        let connection_string = config.connection_string();

        debug!(
            "ODBC connection string (credentials hidden): Driver={{{}}};Host={};Port={};Auth={};...",
            config.driver, config.host, config.port, config.auth
        );

        let conn = env
            .connect_with_connection_string(&connection_string, ConnectionOptions::default())
            .map_err(|e| {
                MigrateError::Connection(format!(
                    "Failed to connect to Hive at {}:{} via ODBC ({}): {}",
                    config.host, config.port, config.auth, e
                ))
            })?;

        info!(
            "Connected to Hive via ODBC ({}): {}:{} as {}",
            config.auth, config.host, config.port, config.username
        );

        Ok(Self { conn })
    }
}

impl MetastoreClient for OdbcMetastore {
    fn execute(&mut self, command: &str) -> Result<Box<dyn RowCursor + '_>> {
        debug!("Executing: {}", command);

        let cursor = self
            .conn
            .execute(command, ())
            .map_err(|e| MigrateError::query(command, e.to_string()))?;

        let Some(mut cursor) = cursor else {
            return Ok(Box::new(EmptyCursor));
        };

        let num_cols = cursor.num_result_cols().map_err(|e| {
            MigrateError::query(command, format!("Failed to get column count: {}", e))
        })? as usize;

        let buffers = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_STR_LEN))
            .map_err(|e| {
                MigrateError::query(command, format!("Failed to create row buffer: {}", e))
            })?;

        let block = cursor
            .bind_buffer(buffers)
            .map_err(|e| MigrateError::query(command, format!("Failed to bind buffer: {}", e)))?;

        Ok(Box::new(OdbcCursor {
            command: command.to_string(),
            block: Some(block),
            pending: VecDeque::new(),
            num_cols,
        }))
    }
}

/// Buffered cursor over one statement; rows are copied out a batch at a time.
struct OdbcCursor<C: Cursor> {
    command: String,
    /// `None` once the result set is exhausted.
    block: Option<BlockCursor<C, TextRowSet>>,
    pending: VecDeque<Row>,
    num_cols: usize,
}

impl<C: Cursor> RowCursor for OdbcCursor<C> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        loop {
            if let Some(row) = self.pending.pop_front() {
                return Ok(Some(row));
            }

            let Some(block) = self.block.as_mut() else {
                return Ok(None);
            };

            let fetched = match block.fetch().map_err(|e| {
                MigrateError::query(&self.command, format!("Failed to fetch rows: {}", e))
            })? {
                Some(batch) => {
                    for row_idx in 0..batch.num_rows() {
                        let row = text_row(self.num_cols, |col_idx| batch.at(col_idx, row_idx));
                        self.pending.push_back(row);
                    }
                    true
                }
                None => false,
            };

            if !fetched {
                self.block = None;
            }
        }
    }
}
