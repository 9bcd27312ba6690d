// TextLens entry point
// Reads text from the arguments or stdin and prints the analysis as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use tracing::info;

use textlens_core::analysis::{AnalysisOrchestrator, Task};
use textlens_core::config::AppConfig;
use textlens_core::diagnostics::run_self_test;
use textlens_core::input::AnalysisRequest;
use textlens_core::telemetry::init_tracing;

/// TextLens - deterministic text analysis
#[derive(Parser, Debug)]
#[command(name = "textlens")]
#[command(version)]
#[command(about = "Sentiment, keywords, emotion and summary for a piece of text")]
#[command(after_help = "Reads TEXT from standard input when no text arguments are given.")]
struct Cli {
    /// Run the built-in diagnostics instead of analyzing
    #[arg(long)]
    self_test: bool,

    /// Comma-separated subset of sentiment, keywords, emotion, summary
    #[arg(long, value_delimiter = ',')]
    analyses: Option<Vec<Task>>,

    /// Text to analyze
    text: Vec<String>,
}

fn read_text(cli: &Cli) -> Result<String> {
    if !cli.text.is_empty() {
        return Ok(cli.text.join(" "));
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read text from stdin")?;
    Ok(buffer)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(config.log_format)?;

    let orchestrator =
        AnalysisOrchestrator::from_config(&config).context("failed to build analyzer")?;

    if cli.self_test {
        let sample = (!cli.text.is_empty()).then(|| cli.text.join(" "));
        let report = run_self_test(&orchestrator, sample.as_deref()).await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut request = AnalysisRequest::new(read_text(&cli)?);
    if let Some(analyses) = cli.analyses {
        request = request.with_analyses(analyses);
    }
    request.validate_with(&config.limits)?;

    info!("Analyzing {} characters", request.text.chars().count());
    let output = if request.runs_all() {
        serde_json::to_string_pretty(&orchestrator.analyze_all(&request.text).await)?
    } else {
        let selected = orchestrator
            .analyze_selected(&request.text, &request.analyses)
            .await;
        serde_json::to_string_pretty(&selected)?
    };
    println!("{}", output);

    Ok(())
}
