//! hive-location-migrate CLI - move Hive table locations from S3 to Azure Blob storage.

use clap::{Parser, Subcommand};
use hive_location_migrate::{metastore, AuthMode, Config, MigrateError, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "hive-location-migrate")]
#[command(about = "Migrate Hive metastore locations from S3 buckets to Azure Blob containers")]
#[command(version)]
#[command(
    after_help = "Connecting to HiveServer2 requires a build with `--features odbc` and an installed Hive ODBC driver. Default builds can only show help and validate configuration."
)]
struct Cli {
    /// Path to an optional YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HiveServer2 host [default: archival-hive-server]
    #[arg(long)]
    host: Option<String>,

    /// HiveServer2 port [default: 10000]
    #[arg(long)]
    port: Option<u16>,

    /// Username to connect with [default: root]
    #[arg(long)]
    username: Option<String>,

    /// Password, used with LDAP authentication
    #[arg(long)]
    password: Option<String>,

    /// Authentication mode: NONE, NOSASL, LDAP or KERBEROS [default: NONE]
    #[arg(long)]
    auth: Option<AuthMode>,

    /// Name of the installed Hive ODBC driver
    #[arg(long)]
    driver: Option<String>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite table locations that point at S3 archive buckets
    #[command(
        after_help = "Requires a build with `--features odbc` and an installed Hive ODBC driver."
    )]
    Run {
        /// Azure storage account holding the destination containers [default: apmmanagerstorage]
        #[arg(long)]
        storage_account: Option<String>,

        /// Also migrate partition locations
        #[arg(long)]
        partitions: bool,

        /// Dry run: show planned changes without altering any location
        #[arg(long)]
        dry_run: bool,

        /// Only migrate this table (repeatable)
        #[arg(long = "table", value_name = "TABLE")]
        tables: Vec<String>,
    },

    /// Test the metastore connection
    HealthCheck,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = match &cli.config {
        Some(path) => {
            // Validated below, once the flags have been applied
            let config = Config::load_unvalidated(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    // Flags override the file
    if let Some(host) = cli.host {
        config.metastore.host = host;
    }
    if let Some(port) = cli.port {
        config.metastore.port = port;
    }
    if let Some(username) = cli.username {
        config.metastore.username = username;
    }
    if let Some(password) = cli.password {
        config.metastore.password = password;
    }
    if let Some(auth) = cli.auth {
        config.metastore.auth = auth;
    }
    if let Some(driver) = cli.driver {
        config.metastore.driver = driver;
    }

    match cli.command {
        Commands::Run {
            storage_account,
            partitions,
            dry_run,
            tables,
        } => {
            if let Some(account) = storage_account {
                config.migration.storage_account = account;
            }
            if partitions {
                config.migration.migrate_partitions = true;
            }
            if dry_run {
                config.migration.dry_run = true;
            }
            if !tables.is_empty() {
                config.migration.tables = tables;
            }
            config.validate()?;

            let client = metastore::connect(&config.metastore)?;
            let mut orchestrator = Orchestrator::new(client, config.migration);
            let result = orchestrator.run()?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                let status_msg = if result.dry_run {
                    "Dry run completed!"
                } else {
                    "Migration completed!"
                };
                println!("\n{}", status_msg);
                println!("  Run ID: {}", result.run_id);
                println!("  Duration: {:.2}s", result.duration_seconds);
                println!(
                    "  Tables: {} altered, {} planned, {} unchanged ({} total)",
                    result.tables_altered,
                    result.tables_planned,
                    result.tables_unchanged,
                    result.tables_total
                );
                if result.partitions_total > 0 {
                    println!(
                        "  Partitions: {} altered, {} planned, {} skipped ({} total)",
                        result.partitions_altered,
                        result.partitions_planned,
                        result.partitions_skipped,
                        result.partitions_total
                    );
                }
                for change in &result.changes {
                    let marker = if change.applied { "altered" } else { "planned" };
                    println!(
                        "  [{}] {}: {} -> {}",
                        marker, change.entity, change.old_location, change.new_location
                    );
                }
            }
        }

        Commands::HealthCheck => {
            config.validate()?;

            let client = metastore::connect(&config.metastore)?;
            let mut orchestrator = Orchestrator::new(client, config.migration);
            let result = orchestrator.health_check()?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Metastore ({}:{}): OK ({}ms)",
                    config.metastore.host, config.metastore.port, result.latency_ms
                );
                println!("  Tables visible: {}", result.tables);
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
