use std::sync::Arc;
use std::time::Duration;

use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::net::TcpListener;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use trivia_quiz::fake_data::FakeProvider;
use trivia_quiz::model::client_message::ClientMessage;
use trivia_quiz::model::server_message::{ServerMessage, SessionView};
use trivia_quiz::model::types::{Category, QuizConfiguration, TimerDuration};
use trivia_quiz::provider::TriviaClient;
use trivia_quiz::server::{AppState, start_ws_server};

pub struct TestServer {
    pub ws_port: u16,
    pub provider: Arc<FakeProvider>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_provider(FakeProvider::shared()).await
    }

    pub async fn start_with_provider(provider: Arc<FakeProvider>) -> Self {
        let base_url = provider.serve().await.expect("Fake provider should start");
        let trivia = TriviaClient::new(base_url, Duration::from_secs(5)).unwrap();

        let ws_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_port = ws_listener.local_addr().unwrap().port();

        let app_state = Arc::new(AppState::new(trivia));
        tokio::spawn(async move {
            start_ws_server(ws_listener, app_state).await;
        });

        // Give the server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        Self { ws_port, provider }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.ws_port)
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub struct TestClient {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
}

/// A quiz of `question_count` questions on the shortest timer.
pub fn quiz_config(question_count: u32) -> QuizConfiguration {
    QuizConfiguration {
        question_count,
        timer_duration: TimerDuration::ThirtySeconds,
        ..QuizConfiguration::default()
    }
}

impl TestClient {
    pub async fn connect(url: &str) -> Self {
        let (ws_stream, _) = connect_async(url).await.expect("Failed to connect");
        let (write, read) = ws_stream.split();
        Self { write, read }
    }

    /// Connect and consume the category catalog the server sends first
    pub async fn connect_player(server: &TestServer) -> (Self, Vec<Category>) {
        let mut client = Self::connect(&server.ws_url()).await;
        let response: ServerMessage = client.recv_json().await;
        match response {
            ServerMessage::Categories { categories } => (client, categories),
            other => panic!("Expected Categories, got {other:?}"),
        }
    }

    pub async fn send(&mut self, msg: &ClientMessage) {
        self.send_json(msg).await;
    }

    pub async fn send_json<T: Serialize>(&mut self, msg: &T) {
        let json = serde_json::to_string(msg).unwrap();
        self.write.send(Message::Text(json.into())).await.unwrap();
    }

    pub async fn send_raw_text(&mut self, text: &str) {
        self.write
            .send(Message::Text(text.to_string().into()))
            .await
            .unwrap();
    }

    pub async fn recv_json<T: DeserializeOwned>(&mut self) -> T {
        self.recv_json_within(Duration::from_secs(2)).await
    }

    pub async fn recv_json_within<T: DeserializeOwned>(&mut self, timeout_duration: Duration) -> T {
        loop {
            match tokio::time::timeout(timeout_duration, self.read.next()).await {
                Ok(Some(Ok(Message::Text(text)))) => {
                    return serde_json::from_str(text.as_str()).unwrap();
                }
                // Heartbeat pings are answered by tungstenite
                Ok(Some(Ok(_))) => continue,
                Ok(Some(Err(e))) => panic!("WebSocket error: {e}"),
                Ok(None) => panic!("WebSocket stream closed"),
                Err(_) => {
                    panic!("Timeout waiting for message from server (waited {timeout_duration:?})")
                }
            }
        }
    }

    /// Next message that is not a timer tick
    pub async fn recv_skipping_ticks(&mut self) -> ServerMessage {
        loop {
            match self.recv_json().await {
                ServerMessage::TimerTick { .. } => continue,
                other => return other,
            }
        }
    }

    /// Assert the server sends no text message for `duration`
    pub async fn expect_silence(&mut self, duration: Duration) {
        let deadline = tokio::time::Instant::now() + duration;
        loop {
            match tokio::time::timeout_at(deadline, self.read.next()).await {
                Err(_) => return,
                Ok(Some(Ok(Message::Text(text)))) => {
                    panic!("Expected silence, got {}", text.as_str())
                }
                Ok(Some(Ok(_))) => continue,
                Ok(Some(Err(e))) => panic!("WebSocket error: {e}"),
                Ok(None) => panic!("WebSocket stream closed"),
            }
        }
    }

    /// Send StartQuiz and wait for the first session state
    pub async fn start_quiz(&mut self, config: QuizConfiguration) -> SessionView {
        self.send(&ClientMessage::StartQuiz { config }).await;

        let response: ServerMessage = self.recv_json().await;
        assert!(
            matches!(response, ServerMessage::Loading),
            "Expected Loading, got {response:?}"
        );
        self.expect_state().await
    }

    pub async fn select_answer(&mut self, answer: &str) -> SessionView {
        self.send(&ClientMessage::SelectAnswer {
            answer: answer.to_string(),
        })
        .await;
        self.expect_state().await
    }

    pub async fn advance(&mut self) -> SessionView {
        self.send(&ClientMessage::Advance).await;
        self.expect_state().await
    }

    pub async fn expect_state(&mut self) -> SessionView {
        match self.recv_skipping_ticks().await {
            ServerMessage::SessionState { state } => state,
            other => panic!("Expected SessionState, got {other:?}"),
        }
    }

    /// Wait for an error message and return its wire kind and text
    pub async fn expect_error(&mut self) -> (String, String) {
        match self.recv_skipping_ticks().await {
            ServerMessage::Error { kind, message } => {
                let kind = serde_json::to_value(kind).unwrap();
                (kind.as_str().unwrap().to_string(), message)
            }
            other => panic!("Expected Error, got {other:?}"),
        }
    }
}

/// The raw value of an answer option that is wrong for the current question
pub fn wrong_option(state: &SessionView, correct: &str) -> String {
    state
        .question
        .answers
        .iter()
        .find(|o| o.value != correct)
        .map(|o| o.value.clone())
        .expect("Every question has at least one wrong answer")
}
