use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pharmacy_voice::config::AppConfig;
use pharmacy_voice::handlers;
use pharmacy_voice::services::ai::ollama::OllamaProvider;
use pharmacy_voice::services::ai::openai::OpenAiProvider;
use pharmacy_voice::services::ai::AnswerProvider;
use pharmacy_voice::services::records::liberty::LibertyRecords;
use pharmacy_voice::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let ai: Box<dyn AnswerProvider> = match config.llm_provider.as_str() {
        "ollama" => {
            tracing::info!("using Ollama answer provider (url: {})", config.ollama_url);
            Box::new(OllamaProvider::new(
                config.ollama_url.clone(),
                "llama3.2".to_string(),
            ))
        }
        _ => {
            anyhow::ensure!(
                !config.openai_api_key.is_empty(),
                "OPENAI_API_KEY must be set when LLM_PROVIDER=openai"
            );
            tracing::info!("using OpenAI answer provider (model: {})", config.openai_model);
            Box::new(OpenAiProvider::new(
                config.openai_api_key.clone(),
                config.openai_model.clone(),
            ))
        }
    };

    let records = LibertyRecords::new(
        config.records_api_url.clone(),
        config.records_api_key.clone(),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        ai,
        records: Box::new(records),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/voice/incoming", post(handlers::voice::incoming_call))
        .route("/voice/turn", post(handlers::voice::voice_turn))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
