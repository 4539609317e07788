use crate::model::server_message::SessionView;
use crate::quiz_timer::SessionTimer;
use crate::session::QuizSession;

/// Everything one player connection owns: at most one session and the timer
/// driving it.
#[derive(Debug, Default)]
pub struct ActiveQuiz {
    pub session: Option<QuizSession>,
    pub timer: Option<SessionTimer>,
    /// Bumped on every abandon so a fetch that finishes afterwards can tell
    /// its result is stale.
    pub generation: u64,
}

impl ActiveQuiz {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a session exists and has not completed.
    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.is_complete())
    }

    pub fn to_view(&self) -> Option<SessionView> {
        self.session.as_ref().map(QuizSession::to_view)
    }

    pub fn timer_active(&self) -> bool {
        self.timer.as_ref().is_some_and(SessionTimer::is_active)
    }
}
