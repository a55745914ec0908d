//! exam-lookup - Exam results lookup service
//!
//! Loads the configured cohort files, then serves queries and dataset
//! updates over HTTP until interrupted.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use exam_common::auth::secret_digest;
use exam_common::config::{resolve_config_file, TomlConfig, ENV_CONFIG};
use exam_lookup::api::health::BUILD_INFO;
use exam_lookup::{build_router, AppState, LookupError, LookupService};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments (override environment and config file)
#[derive(Parser, Debug)]
#[command(name = "exam-lookup")]
#[command(about = "Exam results lookup service", long_about = None)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "EXAM_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the cohort files
    #[arg(short, long, env = "EXAM_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "EXAM_PORT")]
    port: Option<u16>,

    /// Secret required for dataset updates
    #[arg(long, env = "EXAM_UPDATE_SECRET", hide_env_values = true)]
    update_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins; otherwise the configured level applies once config is read
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let build = BUILD_INFO;
    info!(
        "Starting exam-lookup v{} [{}] built {} ({})",
        build.version, build.revision, build.built_on, build.profile
    );

    let args = Args::parse();

    let (config_path, explicit) = match resolve_config_file(args.config.as_deref(), ENV_CONFIG) {
        Some((path, explicit)) => (Some(path), explicit),
        None => (None, false),
    };
    let mut config = TomlConfig::load(config_path.as_deref(), explicit)
        .context("Failed to load configuration")?;

    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(secret) = args.update_secret {
        config.update_secret = Some(secret);
    }
    config.validate().context("Invalid configuration")?;

    if !from_env {
        let level = EnvFilter::try_new(&config.logging.level).unwrap_or_else(|e| {
            warn!("Invalid log level '{}': {}", config.logging.level, e);
            EnvFilter::new("info")
        });
        if let Err(e) = filter_handle.reload(level) {
            warn!("Failed to apply configured log level: {}", e);
        }
    }

    info!("Data folder: {}", config.data_dir.display());
    if let Some(secret) = config.update_secret.as_deref().filter(|s| !s.is_empty()) {
        info!("Dataset updates enabled (secret digest {}...)", &secret_digest(secret)[..8]);
    }

    let service = match LookupService::load(&config) {
        Ok(service) => service,
        Err(LookupError::NoCohorts) => {
            error!("No cohort file could be loaded from {}", config.data_dir.display());
            anyhow::bail!("nothing to serve");
        }
        Err(e) => return Err(e).context("Failed to load cohorts"),
    };

    let app = build_router(AppState::new(service));

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("exam-lookup listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("exam-lookup stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
