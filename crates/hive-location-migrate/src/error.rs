//! Error types for the location migration library.

use thiserror::Error;

/// Error text HiveServer2 returns for `SHOW PARTITIONS` on an unpartitioned table.
const NOT_PARTITIONED: &str = "is not a partitioned table";

/// Exit code for configuration errors (bad flags, invalid YAML, failed validation).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code when the metastore session cannot be established.
pub const EXIT_CONNECTION_ERROR: u8 = 2;
/// Exit code when a metastore command fails mid-run.
pub const EXIT_QUERY_ERROR: u8 = 3;
/// Exit code when the run report cannot be serialized.
pub const EXIT_OUTPUT_ERROR: u8 = 4;
/// Exit code for file system errors (missing config file, etc.)
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to establish the metastore session
    #[error("Connection error: {0}")]
    Connection(String),

    /// A metastore command was rejected or its rows could not be fetched
    #[error("Query failed: {message}\n  Command: {command}")]
    Query { command: String, message: String },

    /// A query error attributed to the table or partition it concerned
    #[error("Failed to {action} {entity}")]
    Entity {
        entity: String,
        action: String,
        #[source]
        source: Box<MigrateError>,
    },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Query error for the given command.
    pub fn query(command: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Query {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Wrap an error with the entity it was raised for.
    pub fn entity(entity: impl Into<String>, action: impl Into<String>, source: MigrateError) -> Self {
        MigrateError::Entity {
            entity: entity.into(),
            action: action.into(),
            source: Box::new(source),
        }
    }

    /// True when the metastore refused `SHOW PARTITIONS` because the table has none.
    pub fn is_not_partitioned(&self) -> bool {
        match self {
            MigrateError::Query { message, .. } => message.contains(NOT_PARTITIONED),
            MigrateError::Entity { source, .. } => source.is_not_partitioned(),
            _ => false,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Yaml(_) => EXIT_CONFIG_ERROR,
            MigrateError::Connection(_) => EXIT_CONNECTION_ERROR,
            MigrateError::Query { .. } | MigrateError::Entity { .. } => EXIT_QUERY_ERROR,
            MigrateError::Json(_) => EXIT_OUTPUT_ERROR,
            MigrateError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_partitioned_detected_on_query_error() {
        let err = MigrateError::query(
            "SHOW PARTITIONS logs",
            "Error while compiling statement: FAILED: SemanticException Table logs is not a partitioned table",
        );
        assert!(err.is_not_partitioned());
    }

    #[test]
    fn test_not_partitioned_detected_through_entity_wrapper() {
        let inner = MigrateError::query("SHOW PARTITIONS logs", "Table logs is not a partitioned table");
        let err = MigrateError::entity("table logs", "list partitions of", inner);
        assert!(err.is_not_partitioned());
    }

    #[test]
    fn test_other_query_errors_are_not_whitelisted() {
        let err = MigrateError::query("SHOW PARTITIONS logs", "Table not found logs");
        assert!(!err.is_not_partitioned());
        assert!(!MigrateError::Connection("is not a partitioned table".into()).is_not_partitioned());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(MigrateError::Config("x".into()).exit_code(), EXIT_CONFIG_ERROR);
        assert_eq!(MigrateError::Connection("x".into()).exit_code(), EXIT_CONNECTION_ERROR);
        assert_eq!(MigrateError::query("SHOW TABLES", "x").exit_code(), EXIT_QUERY_ERROR);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(MigrateError::from(io).exit_code(), EXIT_IO_ERROR);
    }

    #[test]
    fn test_format_detailed_includes_cause() {
        let inner = MigrateError::query("DESCRIBE FORMATTED logs", "Table not found logs");
        let err = MigrateError::entity("table logs", "describe", inner);
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: Failed to describe table logs"));
        assert!(detailed.contains("Caused by:"));
        assert!(detailed.contains("Table not found logs"));
        assert!(detailed.contains("DESCRIBE FORMATTED logs"));
    }
}
