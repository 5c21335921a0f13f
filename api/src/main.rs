use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;

use api::config::AppConfig;
use api::observability::Observability;
use api::routes;
use api::state::AppState;

#[derive(Parser)]
#[command(name = "helloworld-api")]
#[command(about = "Greeting form server: entry page, validation and response handoff")]
struct Args {
    /// Overrides HELLOWORLD_BIND_ADDR
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Overrides NAME_MAX_LENGTH
    #[arg(long)]
    name_max_length: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    let obs = Observability::init()?;
    let args = Args::parse();

    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(max) = args.name_max_length {
        config.name_max_length = max;
    }

    tracing::info!(
        name_max_length = config.name_max_length,
        session_storage = config.session.enabled,
        idle_ttl_secs = config.session.idle_ttl.as_secs(),
        "configuration loaded"
    );

    let addr = config.bind_addr;
    let state = AppState::new(config, obs.registry);
    let app = routes::build_router(state);

    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
