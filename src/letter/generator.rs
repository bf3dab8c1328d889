// src/letter/generator.rs
//! Prompt construction and the single completion call that produces a cover
//! letter draft.

use anyhow::Result;
use std::future::Future;
use tracing::{error, info};

/// One blocking-style completion call against a text-generation provider.
///
/// The seam that lets tests substitute a fake provider for the real clients
/// in [`crate::letter::provider`].
pub trait TextGenerator {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Generates cover letter drafts from job details and the resume text.
pub struct CoverLetterGenerator<G> {
    client: G,
    resume_text: String,
}

impl<G: TextGenerator> CoverLetterGenerator<G> {
    pub fn new(client: G, resume_text: impl Into<String>) -> Self {
        Self {
            client,
            resume_text: resume_text.into(),
        }
    }

    /// Generate a cover letter draft, or `None` if the provider call fails.
    ///
    /// Soft failure: a missing cover letter is not fatal to an application,
    /// so errors are logged here and the caller falls back to submitting
    /// without one. No retries, no backoff.
    pub async fn generate(
        &self,
        job_title: &str,
        company_name: &str,
        job_description: &str,
    ) -> Option<String> {
        let prompt = build_prompt(job_title, company_name, job_description, &self.resume_text);

        match self.client.complete(&prompt).await {
            Ok(text) => {
                info!(
                    "Generated cover letter for {} at {} ({} characters)",
                    job_title,
                    company_name,
                    text.len()
                );
                Some(text)
            }
            Err(e) => {
                error!("Error generating cover letter: {:#}", e);
                None
            }
        }
    }
}

/// The fixed prompt template. Empty values are embedded as-is; the provider
/// copes better with a thin prompt than the pipeline would with validation.
pub(crate) fn build_prompt(
    job_title: &str,
    company_name: &str,
    job_description: &str,
    resume_text: &str,
) -> String {
    format!(
        "Based on the following resume and job details, generate a professional cover letter:\n\
         \n\
         Job Title: {job_title}\n\
         Company: {company_name}\n\
         Job Description: {job_description}\n\
         \n\
         Resume: {resume_text}\n\
         \n\
         The cover letter should:\n\
         1. Be personalized for the role and company\n\
         2. Highlight relevant experience from the resume\n\
         3. Show enthusiasm for the position\n\
         4. Be professional but engaging\n\
         5. Be 3-4 paragraphs long\n\
         6. Follow standard business letter format\n\
         7. Not exceed one page\n\
         \n\
         Generate only the cover letter content, with no additional commentary.\n"
    )
}
