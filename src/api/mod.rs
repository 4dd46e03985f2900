//! REST API server module
//!
//! Exposes both report delivery paths over HTTP, plus health, OpenAPI and a
//! server-sent event stream of pipeline progress. Every route lives under
//! `/api/v1`.

use crate::{Config, QuizReporter, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Prefix every API route is mounted under
pub const API_PREFIX: &str = "/api/v1";

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Reports
/// - `GET /api/v1/sessions/:id/report` - Download the HTML report
/// - `POST /api/v1/sessions/:id/email-report` - Email the report in parts
///
/// ## System
/// - `GET /api/v1/health` - Health check
/// - `GET /api/v1/openapi.json` - OpenAPI specification
/// - `GET /api/v1/events` - Server-sent events stream
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(reporter: Arc<QuizReporter>, config: Arc<Config>) -> Router {
    let state = AppState::new(reporter, config.clone());

    let api = Router::new()
        // Reports
        .route("/sessions/:id/report", get(routes::download_report))
        .route("/sessions/:id/email-report", post(routes::email_report))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    let router = Router::new().nest(API_PREFIX, api);

    // SwaggerUi serves the OpenAPI document itself; merge before applying state
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.api.cors_enabled {
        let cors = build_cors_layer(&config.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin; otherwise only the listed
/// origins are allowed. All methods and headers are allowed.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Serves until `shutdown` resolves, then stops accepting connections and
/// lets in-flight requests finish.
///
/// # Example
///
/// ```no_run
/// use quiz_report::{Config, QuizReporter};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let reporter = Arc::new(QuizReporter::new((*config).clone()).await?);
///
/// // Serve until Ctrl+C
/// quiz_report::api::start_api_server(reporter, config, async {
///     tokio::signal::ctrl_c().await.ok();
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server<F>(
    reporter: Arc<QuizReporter>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(reporter, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
