//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{OpenAiCompletionAdapter, SqliteKvStore},
    config::Config,
    error::ApiError,
    web::{api_router, rest::ApiDoc, state::AppState},
};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open Storage & Run Migrations ---
    info!("Opening storage at {}", config.database_url);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let kv_store = Arc::new(SqliteKvStore::new(db_pool));
    info!("Running database migrations...");
    kv_store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize the Completion Adapter ---
    let completion = Arc::new(OpenAiCompletionAdapter::from_credentials(
        &config.completion_api_base,
        &config.gemini_api_key,
    ));
    info!(
        "Completion service at {} (recommendations: {}, details: {}, urls: {}, insights: {})",
        config.completion_api_base,
        config.recommendation_model,
        config.details_model,
        config.url_model,
        config.insights_model
    );

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        completion,
        kv_store,
        config.advisor_models(),
    ));

    // Sweep idle chat sessions in the background.
    let chats = app_state.chats.clone();
    let idle = config.chat_session_idle;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(idle / 4);
        loop {
            ticker.tick().await;
            chats.remove_idle(idle);
        }
    });

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let app = Router::new()
        .merge(api_router(app_state))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
