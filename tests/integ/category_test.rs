use crate::common::{TestClient, TestServer, quiz_config};

use trivia_quiz::fake_data::{FakeProvider, FakeResponse};
use trivia_quiz::model::client_message::ClientMessage;
use trivia_quiz::model::server_message::ServerMessage;

#[tokio::test]
async fn categories_are_sent_on_connect() {
    let server = TestServer::start().await;
    let (_player, categories) = TestClient::connect_player(&server).await;

    assert_eq!(categories.len(), 3);
    assert!(categories.iter().any(|c| c.id == 9 && c.name == "General Knowledge"));
}

#[tokio::test]
async fn category_failure_degrades_to_empty_list() {
    let provider = FakeProvider::shared();
    provider.set_categories(FakeResponse::status(500, "<html>oops</html>"));
    let server = TestServer::start_with_provider(provider).await;

    let (mut player, categories) = TestClient::connect_player(&server).await;
    assert!(categories.is_empty(), "Failed category load should degrade silently");

    // "Any category" still works
    let state = player.start_quiz(quiz_config(3)).await;
    assert_eq!(state.total_questions, 3);
    let query = server.provider.last_query().unwrap();
    assert!(!query.contains("category="), "Query was {query}");
}

#[tokio::test]
async fn malformed_catalog_degrades_to_empty_list() {
    let provider = FakeProvider::shared();
    provider.set_categories(FakeResponse::status(200, r#"{"unexpected": true}"#));
    let server = TestServer::start_with_provider(provider).await;

    let (_player, categories) = TestClient::connect_player(&server).await;
    assert!(categories.is_empty());
}

#[tokio::test]
async fn load_categories_refetches_catalog() {
    let server = TestServer::start().await;
    let (mut player, _) = TestClient::connect_player(&server).await;

    player.send(&ClientMessage::LoadCategories).await;
    let response: ServerMessage = player.recv_json().await;
    match response {
        ServerMessage::Categories { categories } => assert_eq!(categories.len(), 3),
        other => panic!("Expected Categories, got {other:?}"),
    }
}
