//! The REST API served over a real TCP listener

mod common;

use common::*;
use quiz_report::ApiError;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Poll the health endpoint until the spawned server answers
async fn wait_until_serving(client: &reqwest::Client, base: &str) {
    for _ in 0..50 {
        if let Ok(response) = client.get(format!("{base}/api/v1/health")).send().await {
            if response.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("API server at {base} never became ready");
}

#[tokio::test]
async fn test_download_and_email_over_http() {
    let relay = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&relay)
        .await;

    let (db, temp_dir) = create_database().await;
    seed_session(&db, "s1", 23, &[]).await;
    let reporter = create_reporter(db, &temp_dir, &format!("{}/api/v1/send", relay.uri()));
    let base = format!("http://{}", reporter.config().api.bind_address);
    let server = reporter.spawn_api_server();

    let client = reqwest::Client::new();
    wait_until_serving(&client, &base).await;

    let response = client
        .get(format!("{base}/api/v1/sessions/s1/report"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=quiz_report_session_s1.pdf"
    );
    assert_eq!(response.headers()["content-type"], "application/pdf");
    let pdf = response.bytes().await.unwrap();
    assert!(pdf.starts_with(b"%PDF-"));

    let response = client
        .post(format!("{base}/api/v1/sessions/s1/email-report"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Detailed quiz report for session s1 is being sent in parts."
    );
    assert_eq!(body["pages"], 3);
    assert_eq!(body["failed"], 0);
    assert_eq!(body["failed_pages"], serde_json::json!([]));

    server.abort();
}

#[tokio::test]
async fn test_error_bodies_over_http() {
    let (db, temp_dir) = create_database().await;
    let reporter = create_reporter(db, &temp_dir, "http://127.0.0.1:1/api/v1/send");
    let base = format!("http://{}", reporter.config().api.bind_address);
    let server = reporter.spawn_api_server();

    let client = reqwest::Client::new();
    wait_until_serving(&client, &base).await;

    let response = client
        .get(format!("{base}/api/v1/sessions/missing-id/report"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: ApiError = response.json().await.unwrap();
    assert_eq!(body.error.code, "session_not_found");
    assert!(body.error.message.contains("missing-id"));

    let response = client
        .post(format!("{base}/api/v1/sessions/bad%20id!/email-report"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    server.abort();
}
