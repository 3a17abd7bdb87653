use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use voltchat_api::{build_router, AppState};
use voltchat_config::{load as load_config, AppConfig};
use voltchat_runtime::{telemetry, BackendServices};

#[derive(Parser)]
#[command(name = "voltchat-server")]
#[command(about = "Voltarian Networking chat backend (serves by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Print the effective configuration as JSON and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::CheckConfig => check_config(),
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Voltarian Networking backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let address = format!("{}:{}", config.http.address, config.http.port);
    let state = AppState::new(config, services.authenticator, services.chats, services.push);
    let app = build_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(voltchat_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

fn check_config() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    println!("{}", render_config(&config)?);
    Ok(())
}

/// The VAPID private key is never serialised.
fn render_config(config: &AppConfig) -> anyhow::Result<String> {
    serde_json::to_string_pretty(config).context("failed to serialise configuration")
}
