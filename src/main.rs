use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use studiobook::clock::SystemClock;
use studiobook::config::AppConfig;
use studiobook::db;
use studiobook::handlers;
use studiobook::services::ai::groq::GroqProvider;
use studiobook::services::ai::ollama::OllamaProvider;
use studiobook::services::ai::LlmProvider;
use studiobook::services::submitter::relay::FormRelaySubmitter;
use studiobook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let llm: Box<dyn LlmProvider> = match config.llm_provider.as_str() {
        "groq" => {
            anyhow::ensure!(
                !config.groq_api_key.is_empty(),
                "GROQ_API_KEY must be set when LLM_PROVIDER=groq"
            );
            tracing::info!("using Groq LLM provider (model: {})", config.groq_model);
            Box::new(GroqProvider::new(
                config.groq_api_key.clone(),
                config.groq_model.clone(),
            )?)
        }
        _ => {
            tracing::info!(
                "using Ollama LLM provider (url: {}, model: {})",
                config.ollama_url,
                config.ollama_model
            );
            Box::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
            )?)
        }
    };

    if config.booking_relay_url.is_empty() {
        tracing::warn!("BOOKING_RELAY_URL is not set; confirmed bookings will fail to send");
    }
    let submitter = FormRelaySubmitter::new(config.booking_relay_url.clone())?;

    tracing::info!(
        locations = config.locations.len(),
        krw_per_gbp = config.krw_per_gbp,
        "studio configured"
    );

    let port = config.port;
    let state = Arc::new(AppState::new(
        conn,
        config,
        Arc::new(SystemClock),
        llm,
        Box::new(submitter),
    ));

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
