use std::sync::{Arc, Mutex};

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use turnstile::config::AppConfig;
use turnstile::db;
use turnstile::handlers;
use turnstile::models::MuseumInfo;
use turnstile::services::conversation::StateMachine;
use turnstile::services::issuer::TicketIssuer;
use turnstile::services::render::pdf::PdfTicketRenderer;
use turnstile::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let museum = MuseumInfo {
        name: config.museum_name.clone(),
        closed_weekdays: config.closed_weekdays.clone(),
    };
    let issuer = TicketIssuer::new(Arc::new(Mutex::new(conn)), config.pricing);
    tracing::info!(
        issued = issuer.issued_count()?,
        "ticket ledger ready at {}",
        config.database_url
    );
    let machine = StateMachine::new(config.pricing, museum, Arc::new(issuer));
    let renderer = PdfTicketRenderer::new(config.museum_name.clone());

    let origin: HeaderValue = config.cors_origin.parse()?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = Arc::new(AppState {
        config: config.clone(),
        machine,
        renderer: Box::new(renderer),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/chat", post(handlers::chat::chat))
        .route("/generate-ticket", post(handlers::tickets::generate_ticket))
        .route(
            "/tickets/:booking_ref",
            get(handlers::tickets::download_ticket),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
