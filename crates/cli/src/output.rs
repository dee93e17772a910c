//! Terminal rendering for campaign runs
//!
//! Prints each stage payload as it lands, the final campaign package and
//! the publishing outcome.

use campaign::{
    AgentDescriptor, CampaignRecord, PipelineObserver, PublishResult, Stage, StageError,
    StagePayload,
};
use colored::Colorize;

/// Output handler for terminal display
#[derive(Default)]
pub struct OutputHandler;

impl OutputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn print_banner(&self, request: &str) {
        println!();
        println!("{}", "═".repeat(60).bright_cyan());
        println!(
            "{} {}",
            "  Marketing Campaign:".bright_cyan().bold(),
            request.bright_white()
        );
        println!("{}", "═".repeat(60).bright_cyan());
    }

    /// Print a section header
    pub fn print_header(&self, text: &str) {
        println!();
        println!("{}", format!("▶ {}", text).bright_yellow().bold());
        println!("{}", "─".repeat(60).dimmed());
    }

    /// Print a success message
    pub fn print_success(&self, text: &str) {
        println!("{} {}", "✓".bright_green(), text.bright_white());
    }

    /// Print an error message
    pub fn print_error(&self, text: &str) {
        println!("{} {}", "✗".bright_red(), text.bright_red());
    }

    /// Print a warning message
    pub fn print_warning(&self, text: &str) {
        println!("{} {}", "⚠".bright_yellow(), text.yellow());
    }

    /// Print an info message
    pub fn print_info(&self, text: &str) {
        println!("{} {}", "ℹ".bright_blue(), text);
    }

    fn print_payload(&self, payload: &StagePayload) {
        for line in payload.to_pretty_json().lines() {
            println!("  {}", line.dimmed());
        }
    }

    /// Print every payload in the record followed by the summary
    pub fn print_package(&self, record: &CampaignRecord) {
        self.print_header("FINAL CAMPAIGN PACKAGE");

        for payload in record.payloads() {
            println!();
            println!(
                "{}",
                format!("== {} ==", payload.key().as_str().to_uppercase()).bright_cyan()
            );
            self.print_payload(&payload);
        }

        println!();
        println!("{}", "== CAMPAIGN SUMMARY ==".bright_cyan());
        println!("  {}", record.summary());

        match record.error() {
            None => self.print_success(&format!(
                "All {} stages completed",
                record.stages().len()
            )),
            Some(error) => self.print_error(&format!("Campaign creation failed: {}", error)),
        }
    }

    pub fn print_publish(&self, result: &PublishResult) {
        self.print_header("Google Workspace");

        match (&result.doc_link, &result.doc_error) {
            (Some(link), _) => self.print_success(&format!("Google Doc: {}", link)),
            (None, Some(error)) => self.print_error(&format!("Google Doc failed: {}", error)),
            (None, None) => {}
        }
        match (&result.slide_link, &result.slide_error) {
            (Some(link), _) => self.print_success(&format!("Google Slides: {}", link)),
            (None, Some(error)) => self.print_error(&format!("Google Slides failed: {}", error)),
            (None, None) => {}
        }
    }
}

impl PipelineObserver for OutputHandler {
    fn stage_started(&self, agent: &AgentDescriptor) {
        self.print_header(&format!(
            "Stage {}/{}: {} ({})",
            agent.stage.order(),
            Stage::ALL.len(),
            agent.stage.display_name(),
            agent.name
        ));
    }

    fn stage_completed(&self, agent: &AgentDescriptor, payload: &StagePayload, elapsed_ms: u64) {
        self.print_success(&format!(
            "{} produced {} in {}ms",
            agent.name,
            payload.key(),
            elapsed_ms
        ));
        if let StagePayload::Visuals(visuals) = payload {
            if let Some(error) = &visuals.error {
                self.print_warning(&format!("Image generation fell back to placeholders: {}", error));
            }
        }
        self.print_payload(payload);
    }

    fn stage_failed(&self, agent: &AgentDescriptor, error: &StageError) {
        self.print_error(&format!("{} failed: {}", agent.name, error));
    }
}
