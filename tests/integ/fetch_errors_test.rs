use crate::common::{TestClient, TestServer, quiz_config};

use trivia_quiz::fake_data::{FakeProvider, FakeResponse, fake_questions};
use trivia_quiz::model::client_message::ClientMessage;
use trivia_quiz::model::server_message::ServerMessage;
use trivia_quiz::model::types::QuizConfiguration;

async fn start_expecting_error(response: FakeResponse) -> (String, String) {
    let provider = FakeProvider::shared();
    provider.set_questions(response);
    let server = TestServer::start_with_provider(provider).await;
    let (mut player, _) = TestClient::connect_player(&server).await;

    player
        .send(&ClientMessage::StartQuiz {
            config: quiz_config(3),
        })
        .await;
    let loading: ServerMessage = player.recv_json().await;
    assert!(matches!(loading, ServerMessage::Loading), "got {loading:?}");
    player.expect_error().await
}

#[tokio::test]
async fn success_code_without_results_is_insufficient_questions() {
    let (kind, message) = start_expecting_error(FakeResponse::questions(0, &[])).await;
    assert_eq!(kind, "insufficientQuestions");
    assert!(message.contains("Try fewer questions"), "{message}");
}

#[tokio::test]
async fn response_codes_are_classified() {
    let questions = fake_questions(3);
    for (code, expected) in [
        (1, "insufficientQuestions"),
        (2, "invalidParameter"),
        (3, "sessionTokenMissing"),
        (4, "sessionTokenExhausted"),
        (5, "rateLimited"),
        (7, "unknownResponseCode"),
    ] {
        let (kind, _) = start_expecting_error(FakeResponse::questions(code, &questions)).await;
        assert_eq!(kind, expected, "response code {code}");
    }
}

#[tokio::test]
async fn rate_limit_status_without_body_is_rate_limited() {
    let (kind, message) = start_expecting_error(FakeResponse::status(429, "")).await;
    assert_eq!(kind, "rateLimited");
    assert!(message.contains("wait"), "{message}");
}

#[tokio::test]
async fn malformed_payload_is_a_decoding_error_with_cause() {
    let (kind, message) =
        start_expecting_error(FakeResponse::status(200, r#"{"results": []}"#)).await;
    assert_eq!(kind, "decodingError");
    assert!(message.contains("response_code"), "{message}");
}

#[tokio::test]
async fn server_error_status_is_a_transport_error() {
    let (kind, _) = start_expecting_error(FakeResponse::status(503, "<html>down</html>")).await;
    assert_eq!(kind, "transport");
}

#[tokio::test]
async fn invalid_configuration_never_reaches_provider() {
    let server = TestServer::start().await;
    let (mut player, _) = TestClient::connect_player(&server).await;

    player
        .send(&ClientMessage::StartQuiz {
            config: QuizConfiguration {
                question_count: 0,
                ..quiz_config(3)
            },
        })
        .await;
    let (kind, _) = player.expect_error().await;
    assert_eq!(kind, "invalidRequest");
    assert_eq!(server.provider.question_requests(), 0);
}

#[tokio::test]
async fn player_can_retry_after_a_failed_fetch() {
    let provider = FakeProvider::shared();
    provider.set_questions(FakeResponse::questions(5, &[]));
    let server = TestServer::start_with_provider(provider).await;
    let (mut player, _) = TestClient::connect_player(&server).await;

    player
        .send(&ClientMessage::StartQuiz {
            config: quiz_config(3),
        })
        .await;
    let _: ServerMessage = player.recv_json().await; // Loading
    let (kind, _) = player.expect_error().await;
    assert_eq!(kind, "rateLimited");

    server
        .provider
        .set_questions(FakeResponse::questions(0, &fake_questions(3)));
    let state = player.start_quiz(quiz_config(3)).await;
    assert_eq!(state.total_questions, 3);
    assert_eq!(server.provider.question_requests(), 2);
}
