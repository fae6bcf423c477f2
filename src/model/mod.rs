//! Remote generation service client and retry policy.

pub mod client;
pub mod retry;

pub use client::{GeminiClient, TextGenerator};
pub use retry::{ModelResponse, backoff_policy, generate_with_retry};
