// Tests for the AI content review client

use mailqa_core::config::ReviewConfig;
use mailqa_core::review::{ReviewClient, ReviewOutcome, SYSTEM_PROMPT, run_review};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

fn config_for(server: &MockServer) -> ReviewConfig {
    ReviewConfig {
        api_key: Some("sk-test".to_string()),
        base_url: format!("{}/v1", server.uri()),
        ..ReviewConfig::default()
    }
}

#[tokio::test]
async fn test_review_completed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": { "role": "assistant", "content": "  Tone is clear. Add a rate disclaimer.  " },
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = run_review(&config_for(&server), "Get 5% APY today!").await;
    assert_eq!(
        outcome,
        ReviewOutcome::Completed("Tone is clear. Add a rate disclaimer.".to_string())
    );

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(
        body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .ends_with("Get 5% APY today!")
    );
}

#[tokio::test]
async fn test_review_server_error_is_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    match run_review(&config_for(&server), "text").await {
        ReviewOutcome::Failed(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("upstream exploded"));
        }
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_review_empty_choices_is_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let outcome = run_review(&config_for(&server), "text").await;
    assert!(matches!(outcome, ReviewOutcome::Failed(msg) if msg.contains("no content")));
}

#[tokio::test]
async fn test_review_without_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = ReviewConfig {
        api_key: None,
        ..config_for(&server)
    };
    assert!(matches!(
        run_review(&config, "text").await,
        ReviewOutcome::Disabled(_)
    ));
    assert!(ReviewClient::from_config(&config).unwrap().is_none());
}

#[tokio::test]
async fn test_review_unreachable_service_is_failed() {
    let config = ReviewConfig {
        api_key: Some("sk-test".to_string()),
        base_url: "http://127.0.0.1:9/v1".to_string(),
        timeout_secs: 2,
        ..ReviewConfig::default()
    };

    assert!(matches!(
        run_review(&config, "text").await,
        ReviewOutcome::Failed(_)
    ));
}
