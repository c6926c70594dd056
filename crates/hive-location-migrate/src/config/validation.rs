//! Configuration validation.

use super::{AuthMode, Config};
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let metastore = &config.metastore;
    if metastore.host.is_empty() {
        return Err(MigrateError::Config("metastore.host is required".into()));
    }
    if metastore.port == 0 {
        return Err(MigrateError::Config("metastore.port must be non-zero".into()));
    }
    if metastore.driver.is_empty() {
        return Err(MigrateError::Config("metastore.driver is required".into()));
    }
    if metastore.auth != AuthMode::NoSasl && metastore.username.is_empty() {
        return Err(MigrateError::Config(format!(
            "metastore.username is required for {} authentication",
            metastore.auth
        )));
    }
    if metastore.auth == AuthMode::Ldap && metastore.password.is_empty() {
        return Err(MigrateError::Config(
            "metastore.password is required for LDAP authentication".into(),
        ));
    }

    validate_storage_account(&config.migration.storage_account)?;

    if config.migration.tables.iter().any(|t| t.trim().is_empty()) {
        return Err(MigrateError::Config(
            "migration.tables must not contain empty names".into(),
        ));
    }

    Ok(())
}

/// Azure storage account names are 3-24 lowercase letters and digits.
fn validate_storage_account(account: &str) -> Result<()> {
    let valid_len = (3..=24).contains(&account.len());
    let valid_chars = account
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !valid_len || !valid_chars {
        return Err(MigrateError::Config(format!(
            "migration.storage_account '{}' is not a valid Azure storage account name \
             (3-24 lowercase letters and digits)",
            account
        )));
    }
    Ok(())
}
