use std::time::Duration;

use crate::common::{TestClient, TestServer, quiz_config};

use trivia_quiz::fake_data::fake_questions;
use trivia_quiz::model::client_message::ClientMessage;
use trivia_quiz::model::server_message::ServerMessage;
use trivia_quiz::session::Phase;

#[tokio::test]
async fn timer_ticks_once_per_second() {
    let server = TestServer::start().await;
    let (mut player, _) = TestClient::connect_player(&server).await;
    player.start_quiz(quiz_config(3)).await;

    for expected_remaining in [29, 28] {
        let tick: ServerMessage = player.recv_json().await;
        match tick {
            ServerMessage::TimerTick { seconds_remaining } => {
                assert_eq!(seconds_remaining, expected_remaining);
            }
            other => panic!("Expected TimerTick, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn state_reflects_elapsed_time() {
    let server = TestServer::start().await;
    let (mut player, _) = TestClient::connect_player(&server).await;
    let state = player.start_quiz(quiz_config(3)).await;

    let _: ServerMessage = player.recv_json().await; // first tick
    let answer = fake_questions(3)[state.question.id].correct_answer.clone();
    let state = player.select_answer(&answer).await;
    assert!(state.time_remaining_seconds <= 29);
}

#[tokio::test]
async fn finishing_the_quiz_stops_the_timer() {
    let server = TestServer::start().await;
    let (mut player, _) = TestClient::connect_player(&server).await;

    let state = player.start_quiz(quiz_config(1)).await;
    let answer = fake_questions(1)[state.question.id].correct_answer.clone();
    player.select_answer(&answer).await;
    let state = player.advance().await;
    assert_eq!(state.phase, Phase::Complete);

    player.expect_silence(Duration::from_millis(1500)).await;

    player.send(&ClientMessage::Advance).await;
    let (_, message) = player.expect_error().await;
    assert!(message.contains("already complete"));
}
