//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::load_unvalidated(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file without validating it.
    ///
    /// For callers that apply overrides first and call [`Config::validate`]
    /// on the merged result.
    pub fn load_unvalidated<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config = Self::parse_yaml(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string without validating it.
    pub fn parse_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl MetastoreConfig {
    /// Build an ODBC connection string for the Hive driver.
    pub fn connection_string(&self) -> String {
        let base = format!(
            "Driver={{{}}};Host={};Port={};HiveServerType=2;",
            self.driver, self.host, self.port
        );

        let auth = match self.auth {
            AuthMode::None => format!("AuthMech=2;UID={};", self.username),
            AuthMode::NoSasl => "AuthMech=0;ThriftTransport=0;".to_string(),
            AuthMode::Ldap => format!("AuthMech=3;UID={};PWD={};", self.username, self.password),
            AuthMode::Kerberos => format!(
                "AuthMech=1;KrbHostFQDN={};KrbServiceName=hive;",
                self.host
            ),
        };

        base + &auth
    }
}
