//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{AnthropicTextAdapter, OpenAiTextAdapter, PgReportStore},
    config::{Config, TextProviderKind},
    error::ApiError,
    web::{
        buildings::load_buildings, get_trends_handler, list_alerts_handler,
        list_buildings_handler, list_reports_handler, rest::ApiDoc, state::AppState,
        submit_report_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use campusflow_core::insight::InsightGenerator;
use campusflow_core::ports::TextGenerator;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
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

    // --- 2. Connect to the Report Store & Run Migrations ---
    info!("Connecting to report store...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgReportStore::new(db_pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Load Static Reference Data ---
    let buildings = load_buildings(&config.buildings_path)?;
    info!(
        "Loaded {} buildings from {}",
        buildings.len(),
        config.buildings_path.display()
    );

    // --- 4. Initialize the Text-Generation Provider ---
    let generator: Arc<dyn TextGenerator> = match config.text_provider {
        TextProviderKind::OpenAi => {
            let api_key = config.openai_api_key.as_ref().ok_or_else(|| {
                ApiError::Internal(
                    "OPENAI_API_KEY is required for the openai provider".to_string(),
                )
            })?;
            let openai_config = OpenAIConfig::new().with_api_key(api_key);
            Arc::new(OpenAiTextAdapter::new(
                Client::with_config(openai_config),
                config.trend_model.clone(),
                config.generation_timeout,
            ))
        }
        TextProviderKind::Anthropic => {
            let api_key = config.anthropic_api_key.as_ref().ok_or_else(|| {
                ApiError::Internal(
                    "ANTHROPIC_API_KEY is required for the anthropic provider".to_string(),
                )
            })?;
            Arc::new(AnthropicTextAdapter::new(
                config.anthropic_api_base.clone(),
                api_key.clone(),
                config.trend_model.clone(),
                config.generation_timeout,
            )?)
        }
    };
    let insight = InsightGenerator::new(generator.clone());

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        generator,
        insight,
        buildings,
        config: config.clone(),
    });

    // Browser clients are served from a different origin; keep CORS open.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    // --- 6. Create the Web Router ---
    let api_router = Router::new()
        .route("/report", post(submit_report_handler))
        .route("/reports", get(list_reports_handler))
        .route("/trends", get(get_trends_handler))
        .route("/buildings", get(list_buildings_handler))
        .route("/alerts", get(list_alerts_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
