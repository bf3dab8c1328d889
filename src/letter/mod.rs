// src/letter/mod.rs
//! Cover letter generation and PDF rendering.

pub mod generator;
pub mod pdf;
pub mod provider;

pub use generator::{CoverLetterGenerator, TextGenerator};
pub use pdf::CoverLetterRenderer;
pub use provider::{AnthropicClient, LlmClient, OpenAiClient};
