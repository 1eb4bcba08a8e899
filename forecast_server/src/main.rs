use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use forecast_server::{AppConfig, AppState, router};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(version, about = "Stock sentiment forecaster")]
struct Cli {
    /// Path to the TOML config file (defaults apply when omitted)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Listen address, overriding `server.bind`
        #[arg(long)]
        bind: Option<String>,
    },
    /// Forecast one symbol and print the result as JSON
    Predict {
        symbol: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forecast_server=info,price_forecaster=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let state = AppState::from_config(&config).context("initialising clients")?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.server.bind.clone());
            let app = router(state, &config.server.static_dir);
            let listener = TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            info!(%addr, static_dir = %config.server.static_dir.display(), "listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("server error")?;
        }
        Command::Predict { symbol } => {
            let forecast = state.service.forecast(&symbol).await?;
            println!("{}", serde_json::to_string_pretty(&forecast)?);
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
