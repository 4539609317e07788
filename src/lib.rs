pub mod config;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fake_data;
pub mod handler;
pub mod heartbeat;
pub mod model;
pub mod provider;
pub mod quiz_timer;
pub mod resolver;
pub mod server;
pub mod session;
pub mod text;
