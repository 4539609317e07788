use crate::{
    error::{ErrorKind, QuizError, SessionError},
    heartbeat::{ConnectionHealth, PING_INTERVAL},
    model::{
        client_message::ClientMessage,
        quiz::ActiveQuiz,
        server_message::{ServerMessage, SessionView, send_msg},
        types::QuizConfiguration,
    },
    quiz_timer::{SharedQuiz, abandon_session, start_session, stop_timer},
    resolver::QuizResolver,
    server::{AppState, Tx},
    session::{Advance, QuizSession},
};
use futures_util::{SinkExt, StreamExt};
use log::*;
use std::{net::SocketAddr, sync::Arc};
use tokio::{
    net::TcpStream,
    sync::{Mutex, mpsc},
};
use tokio_tungstenite::{WebSocketStream, tungstenite::Message};

/// Run one player connection until it closes. The connection owns its quiz;
/// closing it abandons whatever session is in progress.
pub async fn handle_player(
    ws_stream: WebSocketStream<TcpStream>,
    app_state: Arc<AppState>,
    peer: SocketAddr,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let quiz: SharedQuiz = Arc::new(Mutex::new(ActiveQuiz::new()));
    let resolver = QuizResolver::new(app_state.trivia.clone());

    // The configuration screen needs the catalog right away
    load_categories(&resolver, &tx);

    let (mut ws_write, mut ws_read) = ws_stream.split();
    let mut health = ConnectionHealth::new();
    let mut ping_interval =
        tokio::time::interval_at(tokio::time::Instant::now() + PING_INTERVAL, PING_INTERVAL);

    loop {
        tokio::select! {
            // Outgoing messages from channel
            Some(msg) = rx.recv() => {
                if ws_write.send(msg).await.is_err() {
                    break;
                }
            }

            // Incoming messages from WebSocket
            msg_result = ws_read.next() => {
                match msg_result {
                    Some(Ok(Message::Pong(_))) => {
                        health.record_pong();
                    }
                    Some(Ok(Message::Text(text))) => {
                        if text.is_empty() {
                            warn!("Received empty message");
                            continue;
                        }
                        info!("Received message: {}", text.as_str());
                        process_player_message(text.as_str(), &quiz, &resolver, &tx).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Err(_)) => {
                        break;
                    }
                    _ => {} // Ping is answered by tungstenite; Binary is not part of the protocol
                }
            }

            _ = ping_interval.tick() => {
                if !health.is_alive() {
                    info!("Player {peer} timed out (no pong received)");
                    break;
                }
                if ws_write.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }
        }
    }

    info!("Player {peer} disconnected");
    abandon_session(&mut *quiz.lock().await, resolver.is_fetching());
}

async fn process_player_message(text: &str, quiz: &SharedQuiz, resolver: &QuizResolver, tx: &Tx) {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to parse message: {text}");
            warn!("Error: {e}");
            send_msg(
                tx,
                ServerMessage::error(ErrorKind::InvalidMessage, format!("Failed to parse message: {e}")),
            );
            return;
        }
    };

    match msg {
        ClientMessage::LoadCategories => load_categories(resolver, tx),
        ClientMessage::StartQuiz { config } => start_quiz(config, quiz, resolver, tx).await,
        action => {
            // Acquire lock, mutate, build the reply, then release before sending
            let reply = {
                let mut quiz = quiz.lock().await;
                process_session_action(action, &mut quiz, resolver.is_fetching())
            };
            send_msg(tx, reply);
        }
    }
}

/// Apply a session action. The quiz must be held under its lock; this does
/// not await. `fetch_pending` says whether a start is still loading.
fn process_session_action(
    action: ClientMessage,
    quiz: &mut ActiveQuiz,
    fetch_pending: bool,
) -> ServerMessage {
    let result = match action {
        ClientMessage::SelectAnswer { answer } => select_answer(quiz, &answer),
        ClientMessage::Advance => advance(quiz),
        ClientMessage::Abandon => {
            return if abandon_session(quiz, fetch_pending) {
                ServerMessage::SessionAbandoned
            } else {
                ServerMessage::from(&SessionError::NotStarted)
            };
        }
        ClientMessage::LoadCategories | ClientMessage::StartQuiz { .. } => {
            error!("Fetch actions must not reach the session action path");
            return ServerMessage::error(ErrorKind::InvalidAction, "Unexpected action");
        }
    };

    match result {
        Ok(state) => ServerMessage::SessionState { state },
        Err(e) => {
            warn!("Rejected session action: {e}");
            ServerMessage::from(&e)
        }
    }
}

fn select_answer(quiz: &mut ActiveQuiz, answer: &str) -> Result<SessionView, SessionError> {
    let session = quiz.session.as_mut().ok_or(SessionError::NotStarted)?;
    session.select_answer(answer)?;
    Ok(session.to_view())
}

fn advance(quiz: &mut ActiveQuiz) -> Result<SessionView, SessionError> {
    let session = quiz.session.as_mut().ok_or(SessionError::NotStarted)?;
    let outcome = session.advance()?;
    let state = session.to_view();
    if let Advance::Completed { .. } = outcome {
        stop_timer(quiz);
    }
    Ok(state)
}

fn load_categories(resolver: &QuizResolver, tx: &Tx) {
    let resolver = resolver.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let categories = resolver.load_categories().await;
        send_msg(&tx, ServerMessage::Categories { categories });
    });
}

/// Claim the fetch slot and fetch in the background so ticks and input keep
/// flowing. A start that arrives while a fetch is outstanding is dropped.
async fn start_quiz(config: QuizConfiguration, quiz: &SharedQuiz, resolver: &QuizResolver, tx: &Tx) {
    let generation = {
        let quiz = quiz.lock().await;
        if quiz.is_running() {
            send_msg(tx, ServerMessage::from(&SessionError::AlreadyRunning));
            return;
        }
        quiz.generation
    };

    if let Err(e) = config.validate() {
        send_msg(tx, ServerMessage::from(&e));
        return;
    }

    let guard = match resolver.begin_fetch() {
        Ok(guard) => guard,
        Err(e) => {
            info!("Ignoring startQuiz: {e}");
            return;
        }
    };

    send_msg(tx, ServerMessage::Loading);

    let quiz = quiz.clone();
    let resolver = resolver.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let questions = match resolver.resolve_with(&guard, &config).await {
            Ok(questions) => questions,
            Err(e) => {
                warn!("Quiz fetch failed: {e}");
                if quiz.lock().await.generation == generation {
                    send_msg(&tx, ServerMessage::from(&e));
                }
                return;
            }
        };

        let state = {
            let mut active = quiz.lock().await;
            if active.generation != generation {
                info!("Dropping fetched questions for an abandoned quiz");
                return;
            }
            match QuizSession::new(questions, config.timer_duration) {
                Ok(session) => {
                    let state = session.to_view();
                    start_session(&mut active, session, &quiz, &tx);
                    state
                }
                Err(e) => {
                    // classify() never hands back an empty batch
                    error!("Could not start quiz: {e}");
                    send_msg(&tx, ServerMessage::from(&QuizError::InsufficientQuestions));
                    return;
                }
            }
        };
        send_msg(&tx, ServerMessage::SessionState { state });
    });
}
