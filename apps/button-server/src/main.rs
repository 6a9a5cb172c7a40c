use anyhow::{anyhow, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use axum::Router;
use button::{infra::json_users::JsonUserDirectory, Button, ButtonConfig};
use clap::{Parser, Subcommand};
use db::{ConnectOpts, DbHandle};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const BUTTON_MODULE: &str = "button";
const INGRESS_MODULE: &str = "api_ingress";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps in-memory DSNs as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if dsn.contains(":memory:") || dsn.contains("mode=memory") {
        return Ok(dsn.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// The Button Server - a shared button that expires unless people keep pressing it
#[derive(Parser)]
#[command(name = "button-server")]
#[command(about = "The Button Server - a shared button that expires unless people keep pressing it")]
#[command(version = "0.1.0")]
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

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

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
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!(home_dir = %config.server.home_dir, "Button Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

/// Validate the database URL and return the DSN to connect with.
fn resolve_dsn(cfg: &DatabaseConfig, base_dir: &Path) -> Result<String> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    DbHandle::detect(raw)?;

    if raw.starts_with("sqlite:") && !raw.starts_with("sqlite::memory:") {
        absolutize_sqlite_dsn(raw, base_dir)
    } else {
        Url::parse(raw).with_context(|| {
            format!("Invalid database DSN '{}'", db::redact_dsn(raw))
        })?;
        Ok(raw.to_string())
    }
}

/// Resolve `server.host` (IP literal or hostname) and `server.port` to the first bind address.
fn bind_addr(config: &AppConfig) -> Result<SocketAddr> {
    let host = config.server.host.as_str();
    let port = config.server.port;
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("Invalid bind address '{host}:{port}'"))?
        .next()
        .ok_or_else(|| anyhow!("Bind address '{host}:{port}' resolved to nothing"))
}

async fn run_server(config: AppConfig) -> Result<()> {
    let base_dir = PathBuf::from(&config.server.home_dir);
    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("Database URL not configured"))?;
    let dsn = resolve_dsn(&db_config, &base_dir)?;

    let button_cfg: ButtonConfig = config.module_config(BUTTON_MODULE)?;
    let ingress_cfg: ApiIngressConfig = config.module_config(INGRESS_MODULE)?;
    let addr = bind_addr(&config)?;

    let connect_opts = ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(ms as u64)),
        create_sqlite_dirs: true,
        ..Default::default()
    };

    tracing::info!("Connecting to database: {}", db::redact_dsn(&dsn));
    let db = Arc::new(
        DbHandle::connect(&dsn, connect_opts)
            .await
            .context("Failed to connect to the database")?,
    );
    tracing::info!(dsn = %db.redacted_dsn(), "Connected DB backend: {:?}", db.engine());

    tracing::info!("Initializing modules...");
    let button = Button::new();
    button
        .init(&button_cfg, db.clone())
        .await
        .context("Failed to initialize the button module")?;
    if button.service().is_some_and(|svc| svc.is_expired()) {
        tracing::warn!(
            expiry = button_cfg.expiry_deadline_ms,
            "The button is already expired; every press will be refused"
        );
    }

    let ingress = ApiIngress::new(ingress_cfg);
    let router = ingress.build_router(button.register_rest(Router::new())?);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = runtime::shutdown::wait_for_shutdown().await {
                tracing::error!(error = %e, "Signal handler failed, shutting down");
            }
            cancel.cancel();
        });
    }

    let served = serve_with_drain_limit(
        ingress.serve(router, addr, cancel.clone()),
        &cancel,
        config.server.timeout_sec,
    )
    .await;
    db.close().await;
    tracing::info!("Button Server stopped");
    served
}

/// Stop waiting for in-flight requests `drain_secs` after cancellation (0 = no limit).
async fn serve_with_drain_limit(
    serve: impl std::future::Future<Output = Result<()>>,
    cancel: &CancellationToken,
    drain_secs: u64,
) -> Result<()> {
    let drain_deadline = async {
        cancel.cancelled().await;
        if drain_secs == 0 {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(Duration::from_secs(drain_secs)).await;
    };

    tokio::select! {
        served = serve => served,
        _ = drain_deadline => {
            tracing::warn!(drain_secs, "Shutdown drain limit reached, dropping open connections");
            Ok(())
        }
    }
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let base_dir = PathBuf::from(&config.server.home_dir);
    if let Some(db_config) = &config.database {
        resolve_dsn(db_config, &base_dir)?;
    }
    bind_addr(&config)?;
    config.module_config::<ApiIngressConfig>(INGRESS_MODULE)?;
    let button_cfg: ButtonConfig = config.module_config(BUTTON_MODULE)?;
    let users = JsonUserDirectory::from_file(&button_cfg.users_file)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed ({} users)", users.len());
    println!("{}", config.to_yaml()?);

    Ok(())
}
