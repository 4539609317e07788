use std::time::{Duration, Instant};

pub const PING_INTERVAL: Duration = Duration::from_secs(5);
pub const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Tracks whether the player's client is still answering pings.
pub struct ConnectionHealth {
    last_pong: Instant,
    timeout: Duration,
}

impl ConnectionHealth {
    pub fn new() -> Self {
        Self::with_timeout(PONG_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            last_pong: Instant::now(),
            timeout,
        }
    }

    pub fn record_pong(&mut self) {
        self.last_pong = Instant::now();
    }

    pub fn is_alive(&self) -> bool {
        self.last_pong.elapsed() < self.timeout
    }
}

impl Default for ConnectionHealth {
    fn default() -> Self {
        Self::new()
    }
}
