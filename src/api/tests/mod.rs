use super::*;
use crate::Config;
use crate::config::{MailConfig, MailTransportKind};
use crate::test_helpers::{create_test_db, seed_quiz};
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;


/// Reporter over a fresh database, mailing through an HTTP relay at
/// `mail_endpoint` when given
///
/// Seeds session "s1" with 23 correct attempts and "s2" with 12 attempts
/// (two wrong).
async fn create_test_reporter(mail_endpoint: Option<String>) -> (Arc<QuizReporter>, TempDir) {
    create_reporter_with(|mail| {
        if let Some(endpoint) = mail_endpoint {
            mail.transport = MailTransportKind::Http;
            mail.endpoint = endpoint;
        }
    })
    .await
}

/// Reporter mailing over SMTP to a local server on `port`
async fn create_smtp_reporter(port: u16) -> (Arc<QuizReporter>, TempDir) {
    create_reporter_with(|mail| {
        mail.transport = MailTransportKind::Smtp;
        mail.smtp_host = "127.0.0.1".into();
        mail.smtp_port = port;
    })
    .await
}

async fn create_reporter_with(configure: impl FnOnce(&mut MailConfig)) -> (Arc<QuizReporter>, TempDir) {
    let (db, temp_dir) = create_test_db().await;
    seed_quiz(&db, "s1", 23, &[]).await;
    seed_quiz(&db, "s2", 12, &[4, 7]).await;

    let mut config = Config::default();
    config.persistence.database_path = temp_dir.path().join("test.db");
    config.mail.timeout = Duration::from_secs(5);
    configure(&mut config.mail);

    let reporter = QuizReporter::with_database(db, config).unwrap();
    (Arc::new(reporter), temp_dir)
}

fn app(reporter: &Arc<QuizReporter>) -> Router {
    create_router(reporter.clone(), reporter.config().clone())
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (reporter, _temp_dir) = create_test_reporter(None).await;

    let mut config = (**reporter.config()).clone();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let api_handle = tokio::spawn({
        let reporter = reporter.clone();
        async move {
            start_api_server(reporter, config, async {
                stop_rx.await.ok();
            })
            .await
        }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    stop_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), api_handle)
        .await
        .expect("server did not stop after shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_enabled() {
    let (reporter, _temp_dir) = create_test_reporter(None).await;

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app(&reporter).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (reporter, _temp_dir) = create_test_reporter(None).await;
    let mut config = (**reporter.config()).clone();
    config.api.cors_enabled = false;

    let app = create_router(reporter.clone(), Arc::new(config));
    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[test]
fn test_cors_specific_origins() {
    // Only checks that a restricted origin list builds without panicking
    let _layer = build_cors_layer(&["http://localhost:3000".to_string()]);
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let (reporter, _temp_dir) = create_test_reporter(None).await;

    let response = app(&reporter)
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut config = (**reporter.config()).clone();
    config.api.swagger_ui = false;
    let response = create_router(reporter.clone(), Arc::new(config))
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
