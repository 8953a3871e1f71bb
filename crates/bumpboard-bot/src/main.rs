//! bumpboard-bot - bump leaderboard bot binary.
//!
//! Reads chat events as line-delimited JSON on stdin, counts recognized bump
//! confirmations, schedules follow-up reminders and posts leaderboards.
//!
//! # Configuration
//!
//! - `BUMPBOARD_CONFIG` - Optional path to a `.toml`, `.json` or `.yaml` file
//! - `BUMPBOARD_TRUSTED_BOT_ID`, `BUMPBOARD_CONFIRMATION_PHRASE` - Required
//! - `DATABASE_URL` - PostgreSQL connection string
//! - `BUMPBOARD_LOG_FORMAT=json` - JSON logs on stderr
//!
//! Environment variables override values from the config file.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bumpboard_core::notify::create_notifier;
use bumpboard_core::{
    error_channel, BumpClassifier, BumpCoordinator, BumpRuntime, BumpboardConfig,
    CoordinatorConfig, RuntimeConfig,
};
use bumpboard_stores::StoreFactory;

mod feed;

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(Level::INFO.into())
        .add_directive("bumpboard_core=debug".parse()?)
        .add_directive("bumpboard_stores=debug".parse()?)
        .add_directive("bumpboard_bot=debug".parse()?);

    // stdout may carry notices, so logs go to stderr
    let json = std::env::var("BUMPBOARD_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(filter)
        .init();
    Ok(())
}

fn load_config() -> Result<BumpboardConfig> {
    let config = match std::env::var("BUMPBOARD_CONFIG") {
        Ok(path) => {
            let mut config = BumpboardConfig::from_file(&path)
                .with_context(|| format!("failed to load config file {}", path))?;
            config.apply_env()?;
            config
        }
        Err(_) => BumpboardConfig::from_env()?,
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing()?;

    let config = load_config()?;
    info!(
        provider = %config.store.provider,
        table = %config.store.schema.table,
        reminder_profile = %config.reminders.profile,
        reminder_delay_secs = config.reminders.delay().as_secs(),
        "Starting bumpboard-bot"
    );

    let (reporter, reports) = error_channel();
    let store = StoreFactory::create(&config.store, Some(reporter)).await?;

    // Stores retry table creation on the first bump if this fails
    match store.ensure_schema().await {
        Ok(()) => info!("Leaderboard table initialized"),
        Err(e) => warn!(
            code = e.code().as_str(),
            error = %e,
            "Leaderboard table initialization failed; continuing"
        ),
    }

    let notifier = create_notifier(&config.notifier)?;

    let mut runtime = BumpRuntime::new(
        RuntimeConfig::from_store_config(&config.store),
        store.clone(),
        notifier.clone(),
        Some(reports),
    )
    .await?;
    runtime.start().await?;

    let coordinator = Arc::new(BumpCoordinator::new(
        BumpClassifier::from_config(&config.classifier),
        store,
        runtime.reminders(),
        notifier,
        CoordinatorConfig::from(&config),
    ));

    tokio::select! {
        result = feed::run(coordinator, tokio::io::stdin()) => {
            let accepted = result.context("failed to read event feed")?;
            info!(accepted, "Event feed closed, stopping...");
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping...");
        }
    }

    let discarded = runtime.shutdown().await?;
    info!(discarded_reminders = discarded, "bumpboard-bot stopped cleanly");
    Ok(())
}
