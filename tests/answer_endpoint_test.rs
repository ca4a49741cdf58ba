// tests/answer_endpoint_test.rs

use lazy_rollcall::client::RobustClient;
use lazy_rollcall::config::AppConfig;
use lazy_rollcall::error::AppError;
use lazy_rollcall::models::{
    AnswerMode, AnswerOutcome, CodeGuess, RadarOutcome, RollCallTask,
};
use lazy_rollcall::rollcall::{
    self, AnswerEndpoint, HttpAnswerEndpoint, RollcallAnswerer, is_accepted,
};
use mockito::Matcher;
use serde_json::json;
use std::sync::{Arc, atomic::AtomicBool};

const DEVICE_ID: &str = "0b6e4f2a-3c1d-4e5f-8a9b-112233445566";

fn endpoint_for(server: &mockito::Server) -> HttpAnswerEndpoint {
    let config = Arc::new(AppConfig {
        base_url: server.url(),
        ..Default::default()
    });
    let client = RobustClient::new(config, Some("test-session")).unwrap();
    HttpAnswerEndpoint::new(Arc::new(client))
}

#[tokio::test]
async fn test_number_answer_wire_format() {
    // --- Arrange ---
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/api/rollcalls/500/answer")
        .match_header("cookie", "session=test-session")
        .match_body(Matcher::PartialJson(json!({
            "deviceId": DEVICE_ID,
            "numberCode": "0042"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok": true}"#)
        .create_async()
        .await;
    let endpoint = endpoint_for(&server);

    // --- Act ---
    let response = endpoint
        .submit_number(500, DEVICE_ID, CodeGuess::new(42).unwrap())
        .await
        .unwrap();

    // --- Assert ---
    assert!(is_accepted(&response));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_number_answer_rejections_are_misses() {
    let mut server = mockito::Server::new_async().await;
    let _bad_request = server
        .mock("PUT", "/api/rollcalls/501/answer")
        .with_status(400)
        .with_body(r#"{"message": "wrong number code"}"#)
        .create_async()
        .await;
    let _empty = server
        .mock("PUT", "/api/rollcalls/502/answer")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let endpoint = endpoint_for(&server);
    let code = CodeGuess::new(1234).unwrap();

    let rejected = endpoint.submit_number(501, DEVICE_ID, code).await.unwrap();
    let empty = endpoint.submit_number(502, DEVICE_ID, code).await.unwrap();

    assert!(!is_accepted(&rejected));
    assert!(!is_accepted(&empty));
}

#[tokio::test]
async fn test_number_answer_with_expired_session() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("PUT", "/api/rollcalls/500/answer")
        .with_status(401)
        .create_async()
        .await;
    let endpoint = endpoint_for(&server);

    let result = endpoint
        .submit_number(500, DEVICE_ID, CodeGuess::new(0).unwrap())
        .await;

    assert!(matches!(result, Err(AppError::SessionInvalid)));
}

#[tokio::test]
async fn test_radar_answer_wire_format_and_success() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/api/rollcalls/600/answer")
        .match_query(Matcher::UrlEncoded("api_version".into(), "1.76".into()))
        .match_body(Matcher::PartialJson(json!({
            "deviceId": DEVICE_ID,
            "latitude": 30.3,
            "longitude": 120.08,
            "accuracy": 64
        })))
        .with_status(200)
        .with_body(r#"{"id": 1, "status_name": "on_call_fine"}"#)
        .create_async()
        .await;
    let endpoint = Arc::new(endpoint_for(&server));
    let config = Arc::new(AppConfig::default());
    let answerer = RollcallAnswerer::new(endpoint, config, Arc::new(AtomicBool::new(false)));
    let task = RollCallTask {
        rollcall_id: 600,
        device_id: DEVICE_ID.to_string(),
        mode: AnswerMode::Radar {
            site: "紫金港".to_string(),
            latitude: 30.3,
            longitude: 120.08,
        },
    };

    let outcome = answerer.answer(&task).await.unwrap();

    assert!(outcome.is_success());
    assert!(rollcall::report_outcome(&task, &outcome).is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_radar_answer_out_of_range_reads_error_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("PUT", "/api/rollcalls/601/answer")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error_code": "radar_out_of_rollcall_scope", "distance": 1523.7}"#)
        .create_async()
        .await;
    let endpoint = endpoint_for(&server);

    let response = endpoint
        .submit_radar(601, DEVICE_ID, 30.0, 120.0)
        .await
        .unwrap();

    assert_eq!(
        rollcall::classify_radar(response),
        RadarOutcome::OutOfRange {
            distance: Some(1523.7)
        }
    );
}

#[tokio::test]
async fn test_radar_answer_unknown_response() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("PUT", "/api/rollcalls/602/answer")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"message": "internal"}"#)
        .create_async()
        .await;
    let endpoint = Arc::new(endpoint_for(&server));
    let answerer = RollcallAnswerer::new(
        endpoint,
        Arc::new(AppConfig::default()),
        Arc::new(AtomicBool::new(false)),
    );
    let task = RollCallTask {
        rollcall_id: 602,
        device_id: DEVICE_ID.to_string(),
        mode: AnswerMode::Radar {
            site: "home".to_string(),
            latitude: 30.0,
            longitude: 120.0,
        },
    };

    let outcome = answerer.answer(&task).await.unwrap();

    assert!(matches!(
        outcome,
        AnswerOutcome::Radar {
            outcome: RadarOutcome::Unknown(_),
            ..
        }
    ));
    assert!(matches!(
        rollcall::report_outcome(&task, &outcome),
        Err(AppError::RollcallFailed(_))
    ));
}

#[tokio::test]
async fn test_list_rollcalls() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/radar/rollcalls")
        .match_query(Matcher::UrlEncoded("api_version".into(), "1.1.0".into()))
        .with_status(200)
        .with_body(
            r#"{"rollcalls": [
                {"rollcall_id": 777, "course_title": "线性代数", "created_by_name": "张老师", "is_number": true},
                {"rollcall_id": 778, "course_title": "大学物理", "is_radar": true}
            ]}"#,
        )
        .create_async()
        .await;
    let config = Arc::new(AppConfig {
        base_url: server.url(),
        ..Default::default()
    });
    let client = RobustClient::new(config, Some("s")).unwrap();

    let rollcalls = rollcall::list::fetch_rollcalls(&client).await.unwrap();

    assert_eq!(rollcalls.len(), 2);
    assert_eq!(rollcalls[0].rollcall_id, 777);
    assert_eq!(rollcalls[0].created_by_name.as_deref(), Some("张老师"));
    assert!(rollcalls[1].is_radar);
    mock.assert_async().await;
}
