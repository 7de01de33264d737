use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use emporium::{EmporiumBuilder, TokenConfig};
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Command line interface for the emporium server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database connection string
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://emporium.db?mode=rwc",
        global = true
    )]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "EMPORIUM_LISTEN", default_value = "0.0.0.0:5000")]
        listen: SocketAddr,

        /// Secret used to sign login tokens, at least 32 bytes.
        /// A random one is generated when unset.
        #[arg(long, env = "EMPORIUM_JWT_SECRET", hide_env_values = true)]
        jwt_secret: Option<String>,

        /// Where failed login attempts are recorded
        #[arg(long, value_enum, default_value_t = ThrottleStore::Memory)]
        throttle_store: ThrottleStore,
    },
    /// Run database migrations
    Migrate,
    /// Print version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThrottleStore {
    Memory,
    Sqlite,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            jwt_secret,
            throttle_store,
        } => serve(&cli.database_url, listen, jwt_secret, throttle_store).await,
        Commands::Migrate => {
            tracing::info!("Running migrations...");
            let emporium = EmporiumBuilder::new()
                .with_sqlite(&cli.database_url)
                .await?
                .build()
                .await?;
            emporium.migrate().await.context("Migration failed")?;
            tracing::info!("Migrations complete");
            Ok(())
        }
        Commands::Version => {
            println!("emporium v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn serve(
    database_url: &str,
    listen: SocketAddr,
    jwt_secret: Option<String>,
    throttle_store: ThrottleStore,
) -> anyhow::Result<()> {
    let mut builder = EmporiumBuilder::new()
        .with_sqlite(database_url)
        .await
        .with_context(|| format!("Failed to open {database_url}"))?
        .apply_migrations(true);

    if let Some(secret) = jwt_secret {
        let tokens = TokenConfig::new(secret).context("Invalid token secret")?;
        builder = builder.with_token_config(tokens);
    }
    if let ThrottleStore::Sqlite = throttle_store {
        builder = builder.with_sqlite_login_attempts();
    }

    let emporium = Arc::new(builder.build().await?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let cleanup = emporium.start_cleanup_task(shutdown_rx);

    let app = emporium_axum::create_router(emporium);
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {listen}"))?;

    tracing::info!(%listen, "Server starting");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    let _ = cleanup.await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
