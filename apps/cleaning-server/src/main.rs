use anyhow::{Context, Result};
use api_ingress::{ApiIngress, ServeOptions};
use clap::{Parser, Subcommand};
use cleaning_ops::CleaningOpsModule;
use modkit::{DbOptions, ModuleEntry, RegistryBuilder, RunOptions, ShutdownOptions};
use modkit_db::{ConnectOpts, DbHandle};
use runtime::{AppConfig, CliArgs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Cleaning Ops Server - bus cleaning operations API
#[derive(Parser)]
#[command(name = "cleaning-server")]
#[command(about = "Cleaning Ops Server - bus cleaning operations API")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_layered(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);
    share_uploads_dir(&mut config);

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let base_dir = cli
        .config
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let logging_config = config
        .logging
        .clone()
        .unwrap_or_else(runtime::default_logging_config);
    runtime::init_logging_from_config(&logging_config, &base_dir);
    tracing::info!("Cleaning Ops Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

/// The host serves `/uploads` from the directory cleaning_ops writes to,
/// unless the host section names its own.
fn share_uploads_dir(config: &mut AppConfig) {
    let Some(dir) = config
        .modules
        .get("cleaning_ops")
        .and_then(|m| m.pointer("/storage/uploads_dir"))
        .cloned()
    else {
        return;
    };
    let ingress = config
        .modules
        .entry("api_ingress".to_string())
        .or_insert_with(|| serde_json::json!({}));
    if let Some(obj) = ingress.as_object_mut() {
        obj.entry("uploads_dir").or_insert(dir);
    }
}

async fn connect_db(config: &AppConfig) -> Result<Arc<DbHandle>> {
    let db_config = config
        .database
        .as_ref()
        .context("Database URL not configured (set database.url or DATABASE_URL)")?;

    let opts = ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        ssl_mode: db_config.ssl_mode,
        ..Default::default()
    };
    let db = DbHandle::connect(db_config.url.trim(), opts)
        .await
        .with_context(|| format!("connect {}", modkit_db::redact_credentials_in_dsn(Some(&db_config.url))))?;
    tracing::info!(backend = ?db.engine(), dsn = %db.redacted_dsn(), "Connected to database");
    Ok(Arc::new(db))
}

async fn run_server(config: AppConfig) -> Result<()> {
    let db = connect_db(&config).await?;

    let ingress = Arc::new(ApiIngress::new(ServeOptions::from(&config.server)));
    let ops = Arc::new(CleaningOpsModule::default());
    let registry = RegistryBuilder::default()
        .register(
            ModuleEntry::new("api_ingress", ingress.clone())
                .with_rest_host(ingress.clone())
                .with_stateful(ingress),
        )
        .register(
            ModuleEntry::new("cleaning_ops", ops.clone())
                .with_db(ops.clone())
                .with_rest(ops),
        )
        .build()?;

    modkit::run(RunOptions {
        registry,
        modules_cfg: Arc::new(config.modules.clone()),
        db: DbOptions::Existing(db),
        shutdown: ShutdownOptions::Signals,
    })
    .await
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    if config.database.is_none() {
        tracing::warn!("No database configured; `run` needs database.url or DATABASE_URL");
    }
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
