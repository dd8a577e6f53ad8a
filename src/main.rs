use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::{header, Method};
use axum::Router;
use clap::Parser;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod error;
mod handlers;
mod routes;

use auth::AuthGate;
use config::{AllowedOrigins, Config};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Canonical storage root; every served path must resolve beneath it
    pub root_dir: PathBuf,
    /// Token gate, fixed at startup
    pub auth: AuthGate,
}

#[derive(Parser, Debug)]
#[command(name = "filegate")]
#[command(about = "Minimal HTTP gateway serving a restricted directory tree")]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "FILEGATE_PORT", default_value = "8000")]
    port: u16,

    /// Address to bind to
    #[arg(short, long, env = "FILEGATE_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Storage root to serve files from (created if absent)
    #[arg(long, env = "DATA_PATH", default_value = "/data")]
    data_path: PathBuf,

    /// HS256 signing secret; empty disables authentication
    #[arg(long, env = "JWT_SECRET_KEY", default_value = "", hide_env_values = true)]
    jwt_secret: String,

    /// Allowed CORS origins: "*" or a comma-separated list
    #[arg(long, env = "CORS_ORIGINS", default_value = "*")]
    cors_origins: String,

    /// Enable verbose logging
    #[arg(short, long, env = "FILEGATE_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "filegate=debug,tower_http=debug"
    } else {
        "filegate=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new(cli.jwt_secret, &cli.cors_origins)?;

    // Storage root: create if absent, then pin the canonical form used by the
    // path guard. Failure here is fatal; the process must not serve traffic
    // without a confined root.
    std::fs::create_dir_all(&cli.data_path).map_err(|e| {
        format!(
            "cannot create storage root {}: {e}",
            cli.data_path.display()
        )
    })?;
    let root_dir = cli.data_path.canonicalize().map_err(|e| {
        format!(
            "cannot resolve storage root {}: {e}",
            cli.data_path.display()
        )
    })?;

    info!("Serving files from: {}", root_dir.display());

    let auth = AuthGate::new(config.jwt_secret.as_deref());
    if !auth.enabled() {
        warn!("JWT_SECRET_KEY is empty: authentication is disabled, streaming is open to every client");
    }

    // Only GET crosses origins, and only the headers a client needs to send.
    let cors = match &config.allowed_origins {
        AllowedOrigins::Any => CorsLayer::new().allow_origin(Any),
        AllowedOrigins::List(origins) => {
            CorsLayer::new().allow_origin(AllowOrigin::list(origins.iter().cloned()))
        }
    }
    .allow_methods([Method::GET])
    .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let state = AppState { root_dir, auth };

    // Build router
    let app = Router::new()
        .merge(routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;
    info!("Starting filegate on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
