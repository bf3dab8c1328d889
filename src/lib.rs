//! AI-assisted easy apply automation.
//!
//! Walks a job board's in-platform application flow one job at a time,
//! optionally generating a tailored cover letter through a text-generation
//! provider, rendering it to PDF and attaching it to the submission.

pub mod board;
pub mod config;
pub mod letter;
pub mod pipeline;
pub mod resume;

pub use board::{BrowserSession, HttpJobBoard};
pub use config::{AppConfig, UploadManifest, COVER_LETTER_LABEL};
pub use letter::{AnthropicClient, CoverLetterGenerator, CoverLetterRenderer, LlmClient, OpenAiClient, TextGenerator};
pub use pipeline::{ApplicationPipeline, ApplyOutcome, CoverLetter, SkipReason};
pub use resume::ResumeDocument;
