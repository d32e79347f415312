pub mod client;
pub mod generate;
pub mod prompt;
pub mod secrets;

pub use client::{LlmClient, LlmConfig, ensure_client, test_configured_api_key};
pub use generate::request_card_batch;
pub use secrets::{clear_api_key, store_api_key};
