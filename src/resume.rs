// src/resume.rs
//! Resume text extraction.
//!
//! Extraction is best effort: a resume that cannot be read or parsed yields
//! an empty text and the pipeline runs with a degraded prompt instead of
//! aborting.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// A resume file together with its extracted plain text.
///
/// Loaded once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub path: PathBuf,
    pub text: String,
}

impl ResumeDocument {
    /// Load the resume at `path`, falling back to empty text on any failure.
    pub async fn load(path: &Path) -> Self {
        match extract_text(path).await {
            Ok(text) => {
                info!(
                    "Extracted {} characters of resume text from {}",
                    text.len(),
                    path.display()
                );
                Self {
                    path: path.to_path_buf(),
                    text,
                }
            }
            Err(e) => {
                error!("Error extracting text from resume: {:#}", e);
                Self {
                    path: path.to_path_buf(),
                    text: String::new(),
                }
            }
        }
    }
}

/// Concatenated text of all pages, in page order.
async fn extract_text(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read resume file: {}", path.display()))?;

    let text = pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| anyhow::anyhow!("Failed to parse PDF {}: {}", path.display(), e))?;

    Ok(text)
}
