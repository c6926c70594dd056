//! Configuration type definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HiveServer2 connection settings.
    #[serde(default)]
    pub metastore: MetastoreConfig,

    /// Migration behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// How the session authenticates against HiveServer2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthMode {
    /// SASL with a user name and no password.
    #[default]
    None,
    /// Raw Thrift transport without SASL.
    NoSasl,
    /// User name and password checked against LDAP.
    Ldap,
    /// Kerberos; a ticket must already be in the credential cache.
    Kerberos,
}

impl AuthMode {
    /// Name as accepted on the command line and in YAML.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::None => "NONE",
            AuthMode::NoSasl => "NOSASL",
            AuthMode::Ldap => "LDAP",
            AuthMode::Kerberos => "KERBEROS",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(AuthMode::None),
            "NOSASL" => Ok(AuthMode::NoSasl),
            "LDAP" => Ok(AuthMode::Ldap),
            "KERBEROS" => Ok(AuthMode::Kerberos),
            other => Err(format!(
                "unknown auth mode '{}', expected one of NONE, NOSASL, LDAP, KERBEROS",
                other
            )),
        }
    }
}

/// HiveServer2 connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetastoreConfig {
    /// HiveServer2 host (default: "archival-hive-server").
    #[serde(default = "default_host")]
    pub host: String,

    /// HiveServer2 port (default: 10000).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username (default: "root").
    #[serde(default = "default_username")]
    pub username: String,

    /// Password, only used with LDAP authentication.
    #[serde(default, skip_serializing)]
    pub password: String,

    /// Authentication mode (default: NONE).
    #[serde(default)]
    pub auth: AuthMode,

    /// Name of the installed Hive ODBC driver.
    #[serde(default = "default_driver")]
    pub driver: String,
}

impl Default for MetastoreConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_username(),
            password: String::new(),
            auth: AuthMode::default(),
            driver: default_driver(),
        }
    }
}

/// Migration behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Azure storage account that hosts the destination containers
    /// (default: "apmmanagerstorage").
    #[serde(default = "default_storage_account")]
    pub storage_account: String,

    /// Also migrate the locations of every partition (default: false).
    #[serde(default)]
    pub migrate_partitions: bool,

    /// Resolve and rewrite locations but issue no ALTER commands (default: false).
    #[serde(default)]
    pub dry_run: bool,

    /// Only migrate these tables. Empty means every table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            storage_account: default_storage_account(),
            migrate_partitions: false,
            dry_run: false,
            tables: Vec::new(),
        }
    }
}

impl MigrationConfig {
    /// True when `table` passes the table allow-list.
    pub fn includes_table(&self, table: &str) -> bool {
        self.tables.is_empty() || self.tables.iter().any(|t| t == table)
    }
}

fn default_host() -> String {
    "archival-hive-server".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_username() -> String {
    "root".to_string()
}

fn default_driver() -> String {
    "Cloudera ODBC Driver for Apache Hive".to_string()
}

fn default_storage_account() -> String {
    "apmmanagerstorage".to_string()
}
