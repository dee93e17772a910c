//! Campaign CLI
//!
//! Runs the five-agent marketing pipeline for one request and publishes the
//! result to Google Docs and Slides.

mod output;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use campaign::{CampaignConfig, CampaignRequest, CampaignService};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use output::OutputHandler;

/// Marketing campaign generator
#[derive(Parser)]
#[command(name = "campaign")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate a marketing campaign and publish it to Google Workspace")]
#[command(long_about = r#"
Runs trend analysis, copywriting, visual design, editing and SEO in order,
then writes a Google Doc and a Slides deck for the finished campaign.

Configuration is read from the environment (a .env file is loaded first):
  PROJECT_ID, LOCATION, GOOGLE_API_KEY, GOOGLE_APPLICATION_CREDENTIALS

Examples:
  campaign                              # Default request
  campaign "sustainable fashion"        # Campaign for a topic
  campaign --no-publish "AI tools"      # Skip Docs and Slides
  campaign authorize                    # One-time Workspace sign-in
"#)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Campaign topic
    request: Option<String>,

    /// Skip creating the Google Doc and Slides deck
    #[arg(long)]
    no_publish: bool,

    /// Print the final record as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    /// Stage progress and the banner are only printed when stdout is not
    /// reserved for the JSON record
    fn shows_progress(&self) -> bool {
        !self.json
    }

    fn campaign_request(&self) -> CampaignRequest {
        self.request
            .as_deref()
            .and_then(|r| CampaignRequest::new(r))
            .unwrap_or_default()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to Google Workspace and cache the token for later runs
    Authorize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("campaign={0},campaign_cli={0},warn", log_level).into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = CampaignConfig::from_env().context("Failed to load configuration")?;
    let output = Arc::new(OutputHandler::new());

    if let Some(Commands::Authorize) = cli.command {
        let service = CampaignService::new(&config);
        let path = service.authorize().await?;
        output.print_success(&format!("Authorized; token cached at {}", path.display()));
        return Ok(());
    }

    let request = cli.campaign_request();
    tracing::info!("Campaign requested for: {}", request);

    let mut service = CampaignService::new(&config);
    if cli.shows_progress() {
        service = service.with_observer(output.clone());
        output.print_banner(request.as_str());
    }
    let record = service.run(&request).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        output.print_package(&record);
    }

    if let Some(error) = record.error() {
        tracing::error!("Campaign for {} failed: {}", request, error);
        bail!("Campaign creation failed: {}", error);
    }

    if cli.no_publish {
        tracing::info!("Publishing skipped (--no-publish)");
        if cli.shows_progress() {
            output.print_info("Publishing skipped (--no-publish)");
        }
        return Ok(());
    }

    let published = service.publish(&record).await;
    tracing::info!(
        "Published campaign (doc: {:?}, slides: {:?})",
        published.doc_link,
        published.slide_link
    );
    if cli.shows_progress() {
        output.print_publish(&published);
    }
    if !published.is_success() {
        tracing::error!(
            "Publishing failed (doc: {:?}, slides: {:?})",
            published.doc_error,
            published.slide_error
        );
        bail!("Publishing to Google Workspace failed");
    }

    Ok(())
}
