use dotenvy::dotenv;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{TraceLayer, DefaultMakeSpan, DefaultOnResponse};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use std::sync::Arc;
use anyhow::Context;

mod config;
mod handlers {
    pub mod leads;
}

use config::Config;
use handlers::leads;


async fn health_check() -> &'static str {
    "OK"
}

pub struct AppState {
    config: Config,
    http: reqwest::Client,
}

pub fn build_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_TYPE]);
    let cors = match &state.config.frontend_url {
        Some(origin) => cors.allow_origin(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("FRONTEND_URL is not a valid origin: {}", origin))?,
        ),
        None => cors.allow_origin(Any),
    };

    // Unknown paths get index.html so client-side routes resolve
    let static_dir = &state.config.static_dir;
    let frontend = ServeDir::new(static_dir)
        .fallback(ServeFile::new(static_dir.join("index.html")));

    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/leads", post(leads::submit_lead))
        .fallback_service(frontend)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
        )
        .layer(cors)
        .with_state(state);

    Ok(app)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    match &config.lead_webhook_url {
        Some(_) => info!("Forwarding leads to the configured webhook"),
        None => info!("LEAD_WEBHOOK_URL not set, leads will only be logged"),
    }
    info!("Serving frontend from {}", config.static_dir.display());

    let bind_addr = config.bind_addr;
    let state = Arc::new(AppState {
        config,
        http: reqwest::Client::new(),
    });
    let app = build_router(state)?;

    use tokio::net::TcpListener;

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
