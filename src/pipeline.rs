// src/pipeline.rs
//! The application walk: navigate, check eligibility, generate and attach a
//! cover letter, submit, clean up.
//!
//! Every failure inside one job's walk degrades to either "submit without a
//! cover letter" or a `Failed` outcome for that job alone; nothing here may
//! take down the multi-job loop around it.

use crate::board::BrowserSession;
use crate::config::{UploadManifest, COVER_LETTER_LABEL};
use crate::letter::{CoverLetterGenerator, CoverLetterRenderer, TextGenerator};
use anyhow::Result;
use std::time::Duration;
use tracing::{error, info, warn};

/// Fixed settle wait after navigation, giving dynamic page content time to
/// load before the page is inspected.
const PAGE_SETTLE: Duration = Duration::from_secs(1);

const TITLE_DELIMITER: &str = " | ";

/// Outcome of one application attempt, detailed enough for the outer loop to
/// tell "submitted without a letter" apart from "job failed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The base submission routine ran; `accepted` is its verdict.
    Submitted {
        accepted: bool,
        cover_letter: CoverLetter,
    },
    /// The walk broke before submission could run. The job is given up.
    Failed(String),
}

impl ApplyOutcome {
    pub fn accepted(&self) -> bool {
        matches!(self, ApplyOutcome::Submitted { accepted: true, .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverLetter {
    Attached,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoEasyApply,
    BlacklistedTitle,
    GenerationFailed,
    RenderingFailed,
}

/// Drives one job board session, one job at a time.
pub struct ApplicationPipeline<S, G> {
    session: S,
    generator: CoverLetterGenerator<G>,
    renderer: CoverLetterRenderer,
    uploads: UploadManifest,
    blacklist_titles: Vec<String>,
}

impl<S: BrowserSession, G: TextGenerator> ApplicationPipeline<S, G> {
    pub fn new(
        session: S,
        generator: CoverLetterGenerator<G>,
        renderer: CoverLetterRenderer,
        uploads: UploadManifest,
        blacklist_titles: Vec<String>,
    ) -> Self {
        Self {
            session,
            generator,
            renderer,
            uploads,
            blacklist_titles,
        }
    }

    pub fn uploads(&self) -> &UploadManifest {
        &self.uploads
    }

    /// Apply to one job. Never propagates an error: anything unexpected is
    /// logged and reported as [`ApplyOutcome::Failed`] for this job only.
    pub async fn apply_to_job(&mut self, job_id: &str) -> ApplyOutcome {
        match self.run_walk(job_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error in AI-enhanced application for {}: {:#}", job_id, e);
                ApplyOutcome::Failed(format!("{:#}", e))
            }
        }
    }

    async fn run_walk(&mut self, job_id: &str) -> Result<ApplyOutcome> {
        self.session.goto_job(job_id).await?;
        tokio::time::sleep(PAGE_SETTLE).await;

        let page_title = self.session.page_title();

        if !self.session.easy_apply_available() {
            info!("No easy apply on job {}, submitting plain", job_id);
            return self.submit_plain(job_id, SkipReason::NoEasyApply).await;
        }

        if let Some(word) = self
            .blacklist_titles
            .iter()
            .find(|word| page_title.contains(word.as_str()))
        {
            info!(
                "Title of job {} matches blacklisted keyword {:?}, skipping cover letter",
                job_id, word
            );
            return self.submit_plain(job_id, SkipReason::BlacklistedTitle).await;
        }

        let (job_title, company_name) = split_page_title(&page_title);

        let job_description = self.session.job_description().unwrap_or_else(|| {
            warn!("Error getting job description for {}, using placeholder", job_id);
            format!("Position at {}", company_name)
        });

        let Some(content) = self
            .generator
            .generate(&job_title, &company_name, &job_description)
            .await
        else {
            return self.submit_plain(job_id, SkipReason::GenerationFailed).await;
        };

        let Some(cover_letter_path) = self.renderer.render(&content, &company_name) else {
            return self.submit_plain(job_id, SkipReason::RenderingFailed).await;
        };

        // Inject the letter for this one submission, then put the manifest
        // back exactly as it was, whatever the submission did.
        let original_uploads = self.uploads.clone();
        self.uploads
            .insert(COVER_LETTER_LABEL, cover_letter_path.clone());

        let submission = self.session.submit_application(job_id, &self.uploads).await;

        if let Err(e) = std::fs::remove_file(&cover_letter_path) {
            warn!(
                "Error removing temporary cover letter {}: {}",
                cover_letter_path.display(),
                e
            );
        }
        self.uploads = original_uploads;

        let accepted = submission?;
        Ok(ApplyOutcome::Submitted {
            accepted,
            cover_letter: CoverLetter::Attached,
        })
    }

    async fn submit_plain(&mut self, job_id: &str, reason: SkipReason) -> Result<ApplyOutcome> {
        let accepted = self.session.submit_application(job_id, &self.uploads).await?;
        Ok(ApplyOutcome::Submitted {
            accepted,
            cover_letter: CoverLetter::Skipped(reason),
        })
    }
}

/// Split `"<job title> | <company> | ..."` on the first delimiter. Pages
/// without a delimiter keep the whole string as the title and an empty
/// company.
fn split_page_title(page_title: &str) -> (String, String) {
    match page_title.split_once(TITLE_DELIMITER) {
        Some((title, rest)) => {
            let company = rest
                .split(TITLE_DELIMITER)
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            (title.trim().to_string(), company)
        }
        None => (page_title.trim().to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letter::CoverLetterGenerator;
    use anyhow::Result;
    use std::sync::{Arc, Mutex};

    struct FakeSession {
        title: String,
        easy_apply: bool,
        description: Option<String>,
        fail_submit: bool,
        submissions: Arc<Mutex<Vec<UploadManifest>>>,
    }

    impl FakeSession {
        fn new(title: &str) -> Self {
            Self {
                title: title.to_string(),
                easy_apply: true,
                description: Some("Build reliable backend services.".to_string()),
                fail_submit: false,
                submissions: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn submissions(&self) -> Arc<Mutex<Vec<UploadManifest>>> {
            Arc::clone(&self.submissions)
        }
    }

    impl BrowserSession for FakeSession {
        async fn goto_job(&mut self, _job_id: &str) -> Result<()> {
            Ok(())
        }

        fn page_title(&self) -> String {
            self.title.clone()
        }

        fn easy_apply_available(&self) -> bool {
            self.easy_apply
        }

        fn job_description(&self) -> Option<String> {
            self.description.clone()
        }

        async fn submit_application(
            &mut self,
            _job_id: &str,
            uploads: &UploadManifest,
        ) -> Result<bool> {
            self.submissions.lock().unwrap().push(uploads.clone());
            if self.fail_submit {
                anyhow::bail!("submission endpoint unavailable");
            }
            Ok(true)
        }
    }

    struct FakeGenerator {
        response: Option<String>,
    }

    impl TextGenerator for FakeGenerator {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            match &self.response {
                Some(text) => Ok(text.clone()),
                None => anyhow::bail!("simulated provider outage"),
            }
        }
    }

    const LETTER: &str = "Dear Hiring Manager,\n\nFirst paragraph.\n\nSecond paragraph.\n\nThird paragraph.";

    fn pipeline_with(
        session: FakeSession,
        response: Option<&str>,
        blacklist_titles: Vec<String>,
        output_dir: &std::path::Path,
    ) -> ApplicationPipeline<FakeSession, FakeGenerator> {
        let generator = CoverLetterGenerator::new(
            FakeGenerator {
                response: response.map(str::to_string),
            },
            "resume text",
        );
        let mut uploads = UploadManifest::new();
        uploads.insert("Resume", "data/resume.pdf");

        ApplicationPipeline::new(
            session,
            generator,
            CoverLetterRenderer::new(output_dir),
            uploads,
            blacklist_titles,
        )
    }

    #[tokio::test]
    async fn attaches_letter_and_restores_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new("Software Engineer | Acme Corp");
        let submissions = session.submissions();

        let mut pipeline = pipeline_with(session, Some(LETTER), Vec::new(), dir.path());
        let original = pipeline.uploads().clone();

        let outcome = pipeline.apply_to_job("1001").await;
        assert_eq!(
            outcome,
            ApplyOutcome::Submitted {
                accepted: true,
                cover_letter: CoverLetter::Attached,
            }
        );

        // The manifest seen by the submission momentarily carried the letter.
        let seen = submissions.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let injected = seen[0]
            .get(COVER_LETTER_LABEL)
            .expect("cover letter missing from submitted manifest")
            .clone();
        assert!(injected.starts_with(dir.path()));
        let name = injected.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("cover_letter_Acme Corp_"));

        // ...but was deleted and removed again after the call returned.
        assert!(!injected.exists());
        assert_eq!(pipeline.uploads(), &original);
    }

    #[tokio::test]
    async fn blacklisted_title_skips_generation() {
        let dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new("Software Engineer | BadCo");
        let submissions = session.submissions();

        let mut pipeline =
            pipeline_with(session, Some(LETTER), vec!["BadCo".to_string()], dir.path());
        let outcome = pipeline.apply_to_job("1002").await;

        assert_eq!(
            outcome,
            ApplyOutcome::Submitted {
                accepted: true,
                cover_letter: CoverLetter::Skipped(SkipReason::BlacklistedTitle),
            }
        );

        // Plain submission, no letter injected, no file created.
        let seen = submissions.lock().unwrap();
        assert!(seen[0].get(COVER_LETTER_LABEL).is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_easy_apply_submits_plain() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = FakeSession::new("Software Engineer | Acme Corp");
        session.easy_apply = false;

        let mut pipeline = pipeline_with(session, Some(LETTER), Vec::new(), dir.path());
        let outcome = pipeline.apply_to_job("1003").await;

        assert_eq!(
            outcome,
            ApplyOutcome::Submitted {
                accepted: true,
                cover_letter: CoverLetter::Skipped(SkipReason::NoEasyApply),
            }
        );
    }

    #[tokio::test]
    async fn provider_outage_falls_back_to_plain_submission() {
        let dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new("Software Engineer | Acme Corp");
        let submissions = session.submissions();

        let mut pipeline = pipeline_with(session, None, Vec::new(), dir.path());
        let outcome = pipeline.apply_to_job("1004").await;

        assert_eq!(
            outcome,
            ApplyOutcome::Submitted {
                accepted: true,
                cover_letter: CoverLetter::Skipped(SkipReason::GenerationFailed),
            }
        );
        assert_eq!(submissions.lock().unwrap().len(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_description_uses_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = FakeSession::new("Software Engineer | Acme Corp");
        session.description = None;

        // The walk proceeds to generation and attachment despite the missing
        // description element.
        let mut pipeline = pipeline_with(session, Some(LETTER), Vec::new(), dir.path());
        let outcome = pipeline.apply_to_job("1005").await;

        assert_eq!(
            outcome,
            ApplyOutcome::Submitted {
                accepted: true,
                cover_letter: CoverLetter::Attached,
            }
        );
    }

    #[tokio::test]
    async fn failed_submission_still_restores_manifest_and_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = FakeSession::new("Software Engineer | Acme Corp");
        session.fail_submit = true;
        let submissions = session.submissions();

        let mut pipeline = pipeline_with(session, Some(LETTER), Vec::new(), dir.path());
        let original = pipeline.uploads().clone();

        let outcome = pipeline.apply_to_job("1006").await;
        assert!(matches!(outcome, ApplyOutcome::Failed(_)));

        assert_eq!(pipeline.uploads(), &original);
        let injected = submissions.lock().unwrap()[0]
            .get(COVER_LETTER_LABEL)
            .unwrap()
            .clone();
        assert!(!injected.exists());
    }

    #[test]
    fn title_split_takes_first_two_segments() {
        assert_eq!(
            split_page_title("Software Engineer | Acme Corp | Jobs"),
            ("Software Engineer".to_string(), "Acme Corp".to_string())
        );
        assert_eq!(
            split_page_title("Software Engineer"),
            ("Software Engineer".to_string(), String::new())
        );
        assert_eq!(split_page_title(""), (String::new(), String::new()));
    }

    #[test]
    fn outcome_accepted_helper() {
        assert!(ApplyOutcome::Submitted {
            accepted: true,
            cover_letter: CoverLetter::Attached
        }
        .accepted());
        assert!(!ApplyOutcome::Failed("boom".to_string()).accepted());
    }
}
