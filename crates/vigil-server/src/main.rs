use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use vigil_config::VigilConfig;
use vigil_db::retry::RetryConfig;
use vigil_db::service::VigilService;
use vigil_jobs::{Dispatcher, Orchestrator};
use vigil_server::{AppState, create_app};

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("vigil error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = VigilConfig::load_with_dotenv().context("failed to load configuration")?;
    init_tracing(cli.quiet, cli.verbose, &config.general.log_level)?;

    match cli.command {
        Commands::Serve(args) => {
            if let Some(bind) = args.bind {
                config.server.bind = bind;
            }
            if let Some(database) = args.database {
                config.database.path = database;
            }
            config.validate().context("invalid configuration")?;
            serve(config).await
        }
        Commands::Migrate(args) => {
            if let Some(database) = args.database {
                config.database.path = database;
            }
            config.validate().context("invalid configuration")?;
            VigilService::new_local(&config.database.path)
                .await
                .with_context(|| format!("failed to migrate {}", config.database.path))?;
            tracing::info!(path = %config.database.path, "database migrated");
            Ok(())
        }
    }
}

async fn serve(config: VigilConfig) -> anyhow::Result<()> {
    if config.database.is_in_memory() {
        tracing::warn!("using an in-memory database; all state is lost on exit");
    }

    let service = Arc::new(
        VigilService::new_local(&config.database.path)
            .await
            .with_context(|| format!("failed to open database {}", config.database.path))?
            .with_list_limit(config.jobs.list_limit),
    );

    let retry = RetryConfig::new(
        config.jobs.compensation_attempts,
        Duration::from_millis(config.jobs.compensation_delay_ms),
    );
    let engine = vigil_jobs::engine::from_config(&config.engine);
    let dispatcher = Dispatcher::new(Arc::clone(&service), engine).with_retry(retry);
    let state = AppState::new(Orchestrator::new(service, dispatcher));

    let addr = config.server.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "vigil listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("vigil stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn init_tracing(quiet: bool, verbose: bool, configured: &str) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        configured
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("VIGIL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
