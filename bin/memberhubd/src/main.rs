//! `memberhubd` — the memberhub profile portal server.
//!
//! Usage:
//!   memberhubd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/memberhub/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod api;
mod config;
mod routes;
mod session;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use memberhub_attio::{AttioClient, AttioConfig, FieldRegistry};

use config::ServerConfig;
use routes::AppState;
use session::JwtState;

/// Memberhub profile portal server.
#[derive(Parser, Debug)]
#[command(name = "memberhubd", about = "Memberhub profile portal server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the configured one).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    server_config.verify()?;

    let registry = FieldRegistry::new(server_config.fields.clone())
        .map_err(|e| anyhow::anyhow!("invalid field schema: {}", e))?;
    if !registry.has_email_field() {
        anyhow::bail!(
            "field schema must include the '{}' field",
            memberhub_attio::EMAIL_SLUG
        );
    }
    info!("Field schema: {} fields", registry.fields().len());

    let attio = AttioClient::new(AttioConfig {
        base_url: server_config.attio.base_url.clone(),
        api_key: server_config.attio.api_key.clone(),
        object_id: server_config.attio.object_id.clone(),
    });

    let jwt_state = Arc::new(JwtState::new(&server_config.auth.jwt_secret));

    let listen = cli
        .listen
        .unwrap_or_else(|| server_config.listen.clone());

    let state = AppState {
        registry: Arc::new(registry),
        attio: Arc::new(attio),
        jwt_state,
        config: Arc::new(server_config),
    };

    let app = routes::build_router(state);

    info!("memberhubd listening on {}", listen);
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
