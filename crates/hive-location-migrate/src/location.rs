//! Rewriting of S3 archive bucket locations to Azure Blob container locations.
//!
//! Archive buckets are named `archive-<suffix>-<kind>` where `<kind>` is either
//! `profile` or `profile-apm`. A location such as
//!
//! ```text
//! s3a://archive-4eqym6ej-profile/apmmgr-profile/log-4eqym6ej/...
//! ```
//!
//! is rewritten, for storage account `apmmanagerstorage`, to
//!
//! ```text
//! wasbs://archive-4eqym6ej-profile@apmmanagerstorage.blob.core.windows.net/apmmgr-profile/log-4eqym6ej/...
//! ```
//!
//! The bucket name becomes the container name unchanged and the path after the
//! bucket is carried over byte for byte. Anything that does not start with an
//! archive bucket (already migrated `wasbs://` paths, HDFS paths, other buckets)
//! is left alone, which makes re-running a migration safe.

use once_cell::sync::Lazy;
use regex::Regex;

const SOURCE_SCHEME: &str = "s3a://";

/// Archive bucket prefix, including the trailing slash.
///
/// `profile-apm` is listed first so the alternation never stops at `profile`
/// and leaves `-apm` dangling outside the container name.
static SOURCE_BUCKET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^s3a://archive-[^-]+-(profile-apm|profile)/").unwrap());

/// Return the archive bucket prefix of `location` (e.g. `s3a://archive-x-profile/`).
pub fn source_bucket(location: &str) -> Option<&str> {
    SOURCE_BUCKET_RE.find(location).map(|m| m.as_str())
}

/// Build the `wasbs://` prefix that replaces `bucket` for the given storage account.
fn destination_prefix(bucket: &str, storage_account: &str) -> String {
    let container = bucket
        .trim_end_matches('/')
        .trim_start_matches(SOURCE_SCHEME);
    format!(
        "wasbs://{}@{}.blob.core.windows.net/",
        container, storage_account
    )
}

/// Rewrite `location` to its Azure Blob equivalent.
///
/// Returns `None` when the location does not live in an archive bucket; the
/// caller leaves such entities untouched.
pub fn rewrite_location(location: &str, storage_account: &str) -> Option<String> {
    let bucket = source_bucket(location)?;
    let prefix = destination_prefix(bucket, storage_account);
    Some(location.replacen(bucket, &prefix, 1))
}
