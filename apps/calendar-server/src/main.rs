use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use calendar::config::CalendarConfig;
use calendar::{CalendarModule, StorageBackend};
use modkit::HttpLayerOptions;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MODULE_NAME: &str = "calendar";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
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

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create database dir {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Calendar Server - calendar events and user accounts over HTTP
#[derive(Parser)]
#[command(name = "calendar-server")]
#[command(about = "Calendar Server - calendar events and user accounts over HTTP")]
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

    /// Keep all data in memory and ignore the database section
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
    /// Apply database migrations and exit
    Migrate,
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

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Calendar Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
        Commands::Migrate => migrate(config).await,
    }
}

/// Detect DB backend from URL scheme (sqlite/postgres/mysql).
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if raw.eq_ignore_ascii_case("sqlite::memory:") {
        return Ok("sqlite");
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        "mysql" | "mariadb" => Ok("mysql"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

fn listen_addr(config: &AppConfig) -> Result<SocketAddr> {
    let raw = format!("{}:{}", config.server.host, config.server.port);
    raw.to_socket_addrs()
        .with_context(|| format!("invalid listen address '{raw}'"))?
        .next()
        .ok_or_else(|| anyhow!("listen address '{raw}' resolved to nothing"))
}

fn calendar_config(config: &AppConfig) -> Result<CalendarConfig> {
    let module_cfg: CalendarConfig = config.module_config(MODULE_NAME)?;
    module_cfg
        .validate()
        .with_context(|| format!("invalid config for module '{MODULE_NAME}'"))?;
    Ok(module_cfg)
}

fn http_options(config: &AppConfig) -> HttpLayerOptions {
    let mut opts = HttpLayerOptions::default();
    if config.server.timeout_sec > 0 {
        opts.timeout = Duration::from_secs(config.server.timeout_sec);
    }
    opts
}

async fn connect_database(db_config: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    let backend = detect_from_dsn(db_config)?;

    let mut dsn = db_config.url.trim().to_owned();
    if backend == "sqlite" {
        dsn = absolutize_sqlite_dsn(&dsn, base_dir, true)?;
    }

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.max_connections(db_config.max_conns.unwrap_or(10))
        .acquire_timeout(Duration::from_millis(
            db_config.acquire_timeout_ms.unwrap_or(5000),
        ))
        .sqlx_logging(false);
    if dsn == "sqlite::memory:" {
        // Every pooled connection would otherwise see its own empty database.
        opts.max_connections(1).min_connections(1);
    }

    tracing::info!(backend, "Connecting to database");
    let conn = Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to {backend} database"))?;
    tracing::info!("Connected DB backend: {:?}", conn.get_database_backend());
    Ok(conn)
}

async fn storage_for(config: &AppConfig, args: &CliArgs) -> Result<StorageBackend> {
    if args.mock {
        tracing::info!("--mock given, keeping data in memory");
        return Ok(StorageBackend::InMemory);
    }

    match &config.database {
        Some(db_config) => {
            let conn = connect_database(db_config, Path::new(&config.server.home_dir)).await?;
            CalendarModule::migrate(&conn).await?;
            Ok(StorageBackend::Database(conn))
        }
        None => {
            tracing::warn!("No database configuration found, keeping data in memory");
            Ok(StorageBackend::InMemory)
        }
    }
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let addr = listen_addr(&config)?;
    let module_cfg = calendar_config(&config)?;

    tracing::info!("Initializing modules...");
    let storage = storage_for(&config, &args).await?;
    let module = CalendarModule::new(&module_cfg, storage);

    let router = axum::Router::new().route(
        "/health",
        axum::routing::get(modkit::http::health::health_check),
    );
    let router = module.register_rest(router);
    let app = modkit::apply_standard_layers(router, &http_options(&config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(modkit::shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Calendar Server stopped");
    Ok(())
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    listen_addr(&config)?;
    calendar_config(&config)?;
    if !args.mock {
        if let Some(db_config) = &config.database {
            detect_from_dsn(db_config)?;
        }
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn migrate(config: AppConfig) -> Result<()> {
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("No database configured; nothing to migrate"))?;

    let conn = connect_database(db_config, Path::new(&config.server.home_dir)).await?;
    CalendarModule::migrate(&conn).await?;
    println!("Migrations applied");
    Ok(())
}
