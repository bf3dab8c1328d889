use anyhow::Result;
use applymate::{
    AnthropicClient, AppConfig, ApplicationPipeline, ApplyOutcome, CoverLetterGenerator,
    CoverLetterRenderer, HttpJobBoard, LlmClient, OpenAiClient, ResumeDocument,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Directory holding transient generated cover letters.
const COVER_LETTER_DIR: &str = "generated_cover_letters";

#[derive(Parser)]
#[command(name = "applymate")]
#[command(about = "Apply to job postings with AI-generated cover letters")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Base URL of the job board
    #[arg(long, default_value = "https://www.linkedin.com")]
    board_url: String,

    /// Job IDs to apply to, in order
    #[arg(required = true)]
    jobs: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    info!(
        "Applying as {} for positions {:?} in {:?}",
        config.username, config.positions, config.locations
    );

    let resume = ResumeDocument::load(&config.resume_path).await;
    let client = build_client(&config.ai_provider)?;
    let generator = CoverLetterGenerator::new(client, resume.text.clone());
    let renderer = CoverLetterRenderer::new(COVER_LETTER_DIR);
    let session = HttpJobBoard::new(cli.board_url.as_str(), config.phone_number.as_str())?;

    let mut pipeline = ApplicationPipeline::new(
        session,
        generator,
        renderer,
        config.uploads.clone(),
        config.blacklist_titles.clone(),
    );

    let mut accepted = 0usize;
    let mut failed = 0usize;

    for job_id in &cli.jobs {
        match pipeline.apply_to_job(job_id).await {
            ApplyOutcome::Submitted {
                accepted: ok,
                cover_letter,
            } => {
                info!(
                    "Job {}: submitted (accepted: {}, cover letter: {:?})",
                    job_id, ok, cover_letter
                );
                if ok {
                    accepted += 1;
                }
            }
            ApplyOutcome::Failed(reason) => {
                error!("Job {}: failed ({})", job_id, reason);
                failed += 1;
            }
        }
    }

    info!(
        "Done: {} accepted, {} failed, {} total",
        accepted,
        failed,
        cli.jobs.len()
    );

    Ok(())
}

/// Build the provider client named by the config, taking its API key from
/// the environment here so the clients themselves stay environment-free.
fn build_client(provider: &str) -> Result<LlmClient> {
    match provider {
        "claude" => {
            let api_key = std::env::var("ANTHROPIC_API_KEY")
                .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY environment variable not set"))?;
            Ok(LlmClient::Claude(AnthropicClient::new(api_key)?))
        }
        "gpt4" => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
            Ok(LlmClient::Gpt(OpenAiClient::new(api_key)?))
        }
        other => anyhow::bail!("Unsupported AI provider: {}. Use claude or gpt4", other),
    }
}
