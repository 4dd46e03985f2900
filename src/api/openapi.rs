//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the quiz-report REST API using
//! utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the quiz-report REST API
///
/// The spec can be accessed via:
/// - `/api/v1/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "quiz-report REST API",
        version = "0.1.0",
        description = "Per-session quiz reports, as a downloadable document or as multi-part email",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080/api/v1", description = "Local development server")
    ),
    paths(
        // Reports
        crate::api::routes::download_report,
        crate::api::routes::email_report,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(
        schemas(
            crate::api::routes::EmailReportResponse,
            crate::error::ApiError,
            crate::error::ErrorDetail,
            crate::error::FetchSide,
            crate::types::DeliveryMode,
            crate::types::Stage,
            crate::types::Event,
        )
    ),
    tags(
        (name = "reports", description = "Quiz report generation and delivery"),
        (name = "system", description = "Health, events and API documentation")
    )
)]
pub struct ApiDoc;
