// src/board/http.rs
//! HTTP-backed job board session.
//!
//! Fetches the public job view page and parses one snapshot of it per
//! navigation. Selector lists carry fallbacks because the board ships
//! several generations of its markup at once.

use super::BrowserSession;
use crate::config::UploadManifest;
use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{error, info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const EASY_APPLY_SELECTORS: &[&str] = &[
    "button.jobs-apply-button",
    ".jobs-apply-button--top-card button",
    "button[data-control-name='jobdetails_topcard_inapply']",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    ".jobs-description",
    ".jobs-description__container",
    ".jobs-box__html-content",
    ".jobs-description-content__text",
];

/// Parsed view of one job posting page.
#[derive(Debug, Clone)]
struct PageSnapshot {
    title: String,
    easy_apply: bool,
    description: Option<String>,
}

pub struct HttpJobBoard {
    client: Client,
    base_url: String,
    phone_number: String,
    current: Option<PageSnapshot>,
}

impl HttpJobBoard {
    pub fn new(base_url: impl Into<String>, phone_number: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            phone_number: phone_number.into(),
            current: None,
        })
    }

    fn job_url(&self, job_id: &str) -> String {
        format!("{}/jobs/view/{}/", self.base_url, job_id)
    }

    fn apply_url(&self, job_id: &str) -> String {
        format!("{}/jobs/easy-apply/{}", self.base_url, job_id)
    }
}

impl BrowserSession for HttpJobBoard {
    async fn goto_job(&mut self, job_id: &str) -> Result<()> {
        let url = self.job_url(job_id);
        info!("Fetching job page: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch job page")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error fetching job page: {}", response.status());
        }

        let html = response
            .text()
            .await
            .context("Failed to read job page body")?;

        self.current = Some(parse_page(&html));
        Ok(())
    }

    fn page_title(&self) -> String {
        self.current
            .as_ref()
            .map(|page| page.title.clone())
            .unwrap_or_default()
    }

    fn easy_apply_available(&self) -> bool {
        self.current
            .as_ref()
            .map(|page| page.easy_apply)
            .unwrap_or(false)
    }

    fn job_description(&self) -> Option<String> {
        self.current.as_ref().and_then(|page| page.description.clone())
    }

    async fn submit_application(&mut self, job_id: &str, uploads: &UploadManifest) -> Result<bool> {
        let url = self.apply_url(job_id);

        let mut form = Form::new().text("phone_number", self.phone_number.clone());
        for (label, path) in uploads.iter() {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read upload file: {}", path.display()))?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("document.pdf")
                .to_string();

            form = form.part(
                label.clone(),
                Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(content_type_for(path.to_string_lossy().as_ref()))
                    .context("Failed to build multipart part")?,
            );
        }

        info!(
            "Submitting application for job {} with {} attachment(s)",
            job_id,
            uploads.len()
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("Failed to submit application")?;

        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("Submission rejected with status {}: {}", status, error_text);
            Ok(false)
        }
    }
}

fn parse_page(html: &str) -> PageSnapshot {
    let document = Html::parse_document(html);

    let title = find_text_by_selectors(&document, &["title"]).unwrap_or_else(|| {
        warn!("Job page has no title element");
        String::new()
    });

    let easy_apply = EASY_APPLY_SELECTORS.iter().any(|selector_str| {
        Selector::parse(selector_str)
            .ok()
            .map(|selector| document.select(&selector).next().is_some())
            .unwrap_or(false)
    });

    let description = find_text_by_selectors(&document, DESCRIPTION_SELECTORS);

    PageSnapshot {
        title,
        easy_apply,
        description,
    }
}

fn find_text_by_selectors(document: &Html, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = clean_text(&element.text().collect::<Vec<_>>().join(" "));
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn content_type_for(file_name: &str) -> &'static str {
    let lower_name = file_name.to_lowercase();
    if lower_name.ends_with(".docx") {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    } else {
        "application/pdf"
    }
}
