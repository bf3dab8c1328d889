// src/board/mod.rs
//! Job board session abstraction.
//!
//! The original design extended a base automation class and overrode its
//! apply method; here the seam is a trait instead. The pipeline drives any
//! [`BrowserSession`] and delegates actual submission to it, so the AI
//! augmentation composes with the base flow rather than inheriting from it.

pub mod http;

use crate::config::UploadManifest;
use anyhow::Result;
use std::future::Future;

pub use http::HttpJobBoard;

/// A sequential, page-at-a-time session against a job board.
///
/// Navigation establishes a current page; the query methods inspect it.
/// Before any navigation the page is empty: the title is `""`, easy apply is
/// unavailable and there is no description.
pub trait BrowserSession {
    /// Navigate the session to the posting identified by `job_id`.
    fn goto_job(&mut self, job_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Title of the current page, typically `"<job title> | <company>"`.
    fn page_title(&self) -> String;

    /// Whether the current page offers in-platform submission.
    fn easy_apply_available(&self) -> bool;

    /// Free-text job description scraped from the current page, if present.
    fn job_description(&self) -> Option<String>;

    /// The base submission routine: submit the application for `job_id`
    /// with the documents in `uploads` attached. Returns whether the board
    /// accepted the submission.
    fn submit_application(
        &mut self,
        job_id: &str,
        uploads: &UploadManifest,
    ) -> impl Future<Output = Result<bool>> + Send;
}
