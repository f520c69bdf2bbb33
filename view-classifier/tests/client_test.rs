//! Integration tests for XaiChatClient against a wiremock server.

use serde_json::{json, Value};
use view_classifier::{
    ClassifierError, Classifier, FewShotEncoding, Label, LlmAdapter, ModelConfig, PromptBuilder, ReferenceExample,
    ReferenceSet, XaiChatClient,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn create_test_client(mock_server: &MockServer) -> XaiChatClient {
    let config = ModelConfig::default()
        .with_api_base(format!("{}/v1", mock_server.uri()))
        .with_api_key("test-key")
        .with_model("test-model")
        .with_timeout(5);
    XaiChatClient::new(config).expect("failed to create client")
}

fn reply(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ]
    })
}

#[tokio::test]
async fn test_classify_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("1\nContinuous photo textures on every wall.")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let references = ReferenceSet::new(vec![ReferenceExample::new(Label::Two, "https://example.com/old.jpg")]);
    let classifier = Classifier::new(Box::new(create_test_client(&mock_server)), references)
        .with_prompt_builder(PromptBuilder::new(FewShotEncoding::AssistantEcho));

    let classification = classifier
        .classify("https://example.com/target.jpg", true)
        .await
        .expect("classification failed");

    assert_eq!(classification.prediction, Some(Label::One));
    assert!(classification.reply.starts_with("1\n"));
}

#[tokio::test]
async fn test_request_body_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("2")))
        .mount(&mock_server)
        .await;

    let references = ReferenceSet::new(vec![ReferenceExample::new(Label::Three, "https://example.com/flat.jpg")]);
    let classifier = Classifier::new(Box::new(create_test_client(&mock_server)), references);
    classifier
        .classify("https://example.com/target.jpg", false)
        .await
        .expect("classification failed");

    let requests: Vec<Request> = mock_server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();

    assert_eq!(body["model"], "test-model");
    assert_eq!(body["temperature"], 0.0);

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["role"], "system");
    assert!(messages[0]["content"].is_string());
    assert_eq!(messages[1]["content"][1]["image_url"]["url"], "https://example.com/flat.jpg");
    assert_eq!(messages[2], json!({ "role": "assistant", "content": "3" }));
    assert_eq!(messages[3]["role"], "user");
    assert_eq!(messages[3]["content"][0]["type"], "text");
    assert_eq!(messages[3]["content"][1]["type"], "image_url");
    assert_eq!(messages[3]["content"][1]["image_url"]["url"], "https://example.com/target.jpg");
}

#[tokio::test]
async fn test_api_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .complete(&PromptBuilder::default().build_conversation("https://example.com/a.jpg", &[], false))
        .await
        .unwrap_err();

    match err {
        ClassifierError::Api { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "slow down");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_content_is_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .complete(&PromptBuilder::default().build_conversation("https://example.com/a.jpg", &[], false))
        .await
        .unwrap_err();

    assert!(matches!(err, ClassifierError::EmptyResponse));
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .complete(&PromptBuilder::default().build_conversation("https://example.com/a.jpg", &[], false))
        .await
        .unwrap_err();

    assert!(matches!(err, ClassifierError::Serialization(_)));
}
