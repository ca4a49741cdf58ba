// tests/client_retry_test.rs

use lazy_rollcall::client::RobustClient;
use lazy_rollcall::config::AppConfig;
use lazy_rollcall::error::AppError;
use lazy_rollcall::models::CodeGuess;
use lazy_rollcall::rollcall::{AnswerEndpoint, HttpAnswerEndpoint};
use serde_json::Value;
use std::sync::Arc;

fn config_for(server: &mockito::Server, max_retries: u32) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        base_url: server.url(),
        max_retries,
        ..Default::default()
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_retries_transient_server_errors() {
    // --- Arrange ---
    let mut server = mockito::Server::new_async().await;
    let mock_503 = server
        .mock("GET", "/test")
        .with_status(503)
        .with_body("busy")
        .expect(1)
        .create_async()
        .await;
    let mock_200 = server
        .mock("GET", "/test")
        .with_status(200)
        .with_body("Success!")
        .create_async()
        .await;
    let client = RobustClient::new(config_for(&server, 1), Some("s")).unwrap();

    // --- Act ---
    let response = client
        .get(format!("{}/test", server.url()))
        .await
        .expect("重试后应当成功");

    // --- Assert ---
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "Success!");
    mock_503.assert_async().await;
    mock_200.assert_async().await;
}

#[tokio::test]
async fn test_get_maps_unauthorized_to_session_invalid() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/test")
        .with_status(401)
        .create_async()
        .await;
    let client = RobustClient::new(config_for(&server, 0), Some("expired")).unwrap();

    let result = client.get(format!("{}/test", server.url())).await;

    assert!(matches!(result, Err(AppError::SessionInvalid)));
}

#[tokio::test]
async fn test_answer_submission_is_never_retried() {
    // 即使配置了重试，每个签到码也只发出一个 PUT
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/api/rollcalls/7/answer")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let client = Arc::new(RobustClient::new(config_for(&server, 3), Some("s")).unwrap());
    let endpoint = HttpAnswerEndpoint::new(client);

    let response = endpoint
        .submit_number(7, "device", CodeGuess::new(1).unwrap())
        .await
        .unwrap();

    assert_eq!(response, Value::Null);
    mock.assert_async().await;
}
