pub mod client;
pub mod types;

pub use client::LlmClient;
pub use types::*;
