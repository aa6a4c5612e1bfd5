use anyhow::{anyhow, Context, Result};
use axum::{http::HeaderName, routing::get, Router};
use clap::{Parser, Subcommand};
use db::{ConnectOpts, DbHandle};
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use cities::api::rest::register_routes;
use cities::config::CitiesConfig;
use cities::domain::service::Service;
use cities::infra::storage::ensure_schema;

/// Rewrite a SQLite DSN so its file path is absolute, resolving relative paths
/// against `base_dir`. In-memory DSNs pass through as `sqlite::memory:`.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// or sqlite: (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    if path_str.is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    let mut p = PathBuf::from(path_str);
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)?;
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

/// Validate the DSN scheme before trying to connect.
fn detect_backend(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if raw.eq_ignore_ascii_case("sqlite::memory:") {
        return Ok("sqlite");
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;
    match url.scheme() {
        "sqlite" => Ok("sqlite"),
        "mysql" | "mariadb" => Ok("mysql"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// CityHub Server - REST service over a city registry
#[derive(Parser)]
#[command(name = "cityhub-server")]
#[command(about = "CityHub Server - REST service over a city registry")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use a throwaway in-memory SQLite database
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

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, config.home_dir());
    tracing::info!("CityHub Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

async fn connect_db(config: &AppConfig) -> Result<Arc<DbHandle>> {
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("No database configured (set `database.url` or pass --mock)"))?;
    let backend = detect_backend(db_config)?;

    let mut dsn = db_config.url.trim().to_string();
    if backend == "sqlite" {
        dsn = absolutize_sqlite_dsn(&dsn, config.home_dir(), true)?;
    }

    let opts = ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
        ..Default::default()
    };

    tracing::info!(backend, "Connecting to database");
    let db = DbHandle::connect(&dsn, opts)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected DB backend: {:?}", db.engine());

    Ok(Arc::new(db))
}

const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

fn load_cities_config(config: &AppConfig) -> Result<CitiesConfig> {
    config.module_config("cities")
}

fn build_app(config: &AppConfig, cities_config: &CitiesConfig, service: Arc<Service>) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    // Outermost to innermost: set id -> propagate id -> trace -> timeout -> CORS -> body limit
    let mut app = register_routes(Router::new(), service, cities_config)
        .route("/health", get(health_check))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive());

    if config.server.timeout_sec > 0 {
        app = app.layer(TimeoutLayer::new(Duration::from_secs(
            config.server.timeout_sec,
        )));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
}

async fn health_check() -> &'static str {
    "ok"
}

async fn run_server(config: AppConfig) -> Result<()> {
    let cities_config = load_cities_config(&config)?;
    let db = connect_db(&config).await?;
    ensure_schema(&db)
        .await
        .context("Failed to create database schema")?;

    let service = Arc::new(Service::new(db.clone()));
    let app = build_app(&config, &cities_config, service);

    let addr = (config.server.host.as_str(), config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| {
        format!(
            "Failed to bind {}:{}",
            config.server.host, config.server.port
        )
    })?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Shutting down, closing database pool");
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db_config) = &config.database {
        let backend = detect_backend(db_config)?;
        tracing::info!(backend, "Database URL is valid");
    }
    let cities_config = load_cities_config(&config)?;
    tracing::info!(max_page_size = cities_config.max_page_size, "Cities module config is valid");

    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
