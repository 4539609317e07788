use crate::model::quiz::ActiveQuiz;
use crate::model::server_message::{ServerMessage, send_msg};
use crate::server::Tx;
use crate::session::{QuizSession, Tick};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;

pub type SharedQuiz = Arc<Mutex<ActiveQuiz>>;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle to the single countdown task of a session. Dropping the handle
/// cancels the task.
#[derive(Debug)]
pub struct SessionTimer {
    abort_handle: Option<AbortHandle>,
}

impl SessionTimer {
    fn new(abort_handle: AbortHandle) -> Self {
        Self {
            abort_handle: Some(abort_handle),
        }
    }

    /// Cancel the countdown. Only the call that actually stops the task
    /// returns `true`.
    pub fn stop(&mut self) -> bool {
        match self.abort_handle.take() {
            Some(handle) => {
                handle.abort();
                info!("Session timer stopped");
                true
            }
            None => false,
        }
    }

    /// The task finished by itself (time ran out); forget the handle
    /// without aborting.
    fn disarm(&mut self) -> bool {
        let was_active = self.abort_handle.take().is_some();
        if was_active {
            info!("Session timer expired");
        }
        was_active
    }

    pub fn is_active(&self) -> bool {
        self.abort_handle.is_some()
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Install a new session and spawn its countdown. Called while holding the
/// quiz lock. Any previous session and its timer are discarded first.
pub fn start_session(quiz: &mut ActiveQuiz, session: QuizSession, shared: &SharedQuiz, tx: &Tx) {
    if stop_timer(quiz) {
        warn!("Replaced a session whose timer was still running");
    }
    info!(
        "Starting quiz: {} questions, {}s on the clock",
        session.questions().len(),
        session.time_remaining()
    );
    quiz.session = Some(session);

    let task = tokio::spawn(run_countdown(shared.clone(), tx.clone()));
    quiz.timer = Some(SessionTimer::new(task.abort_handle()));
}

/// Stop the countdown if one is running. Called while holding the quiz lock.
pub fn stop_timer(quiz: &mut ActiveQuiz) -> bool {
    quiz.timer.take().is_some_and(|mut timer| timer.stop())
}

/// Tear down the session: stop its timer and discard its state. Bumping the
/// generation also drops the result of a fetch that is still in flight.
/// Returns whether a session or a pending fetch was cancelled.
pub fn abandon_session(quiz: &mut ActiveQuiz, fetch_pending: bool) -> bool {
    stop_timer(quiz);
    quiz.generation += 1;
    let had_session = quiz.session.take().is_some();
    if had_session {
        info!("Quiz abandoned");
    } else if fetch_pending {
        info!("Quiz abandoned while loading");
    }
    had_session || fetch_pending
}

async fn run_countdown(shared: SharedQuiz, tx: Tx) {
    loop {
        tokio::time::sleep(TICK_PERIOD).await;

        // Lock, tick, decide what to send; send after the lock is released
        let (should_continue, msg) = {
            let mut quiz = shared.lock().await;
            let Some(session) = quiz.session.as_mut() else {
                error!("Tried to tick quiz timer, but the session no longer exists!");
                break;
            };

            match session.tick() {
                Tick::Running { seconds_remaining } => {
                    (true, ServerMessage::TimerTick { seconds_remaining })
                }
                Tick::Expired => {
                    let state = session.to_view();
                    if let Some(mut timer) = quiz.timer.take() {
                        timer.disarm();
                    }
                    (false, ServerMessage::SessionState { state })
                }
                Tick::Ignored => {
                    error!("Tried to tick quiz timer, but the session is already complete!");
                    break;
                }
            }
        };

        send_msg(&tx, msg);

        if !should_continue {
            break;
        }
    }
}
