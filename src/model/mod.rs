pub mod client_message;
pub mod quiz;
pub mod server_message;
pub mod types;
