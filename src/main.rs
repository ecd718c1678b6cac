use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use course_crawler::apis::select_sources;
use course_crawler::config::Config;
use course_crawler::infra::http_client::ReqwestHttp;
use course_crawler::logging;
use course_crawler::pipeline::ingestion::crawl_sources;
use course_crawler::pipeline::orchestrator::run_to_files;
use course_crawler::pipeline::storage::write_json;
use course_crawler::pipeline::{Orchestrator, RunReport};

#[derive(Parser)]
#[command(name = "course_crawler")]
#[command(about = "Crawl course listings and reconcile them into a deduplicated dataset")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $COURSE_CRAWLER_CONFIG or config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the source adapters and write the raw payload
    Crawl {
        /// Specific sources to crawl (comma-separated). Default: all
        #[arg(long, value_delimiter = ',')]
        sources: Option<Vec<String>>,
        /// Raw payload output path
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Normalize, validate and deduplicate a raw payload into dataset + report
    Process(ProcessArgs),
    /// Crawl, then process
    Run {
        #[arg(long, value_delimiter = ',')]
        sources: Option<Vec<String>>,
        #[command(flatten)]
        process: ProcessArgs,
    },
}

#[derive(Args)]
struct ProcessArgs {
    /// Raw payload input path
    #[arg(long)]
    input: Option<PathBuf>,
    /// Accepted dataset output path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Run report output path
    #[arg(long)]
    report: Option<PathBuf>,
    /// Fixed run timestamp (RFC 3339) for reproducible output
    #[arg(long)]
    generated_at: Option<DateTime<Utc>>,
}

async fn crawl(config: &Config, sources: Option<Vec<String>>, output: PathBuf) -> anyhow::Result<()> {
    let http = Arc::new(ReqwestHttp::new(&config.crawl)?);
    let sources = select_sources(config, http, sources.as_deref())?;

    let payload = crawl_sources(&sources).await;
    write_json(&output, &payload)
        .with_context(|| format!("writing raw payload to {}", output.display()))?;

    println!(
        "Collected {} records ({} source errors) into {}",
        payload.records.len(),
        payload.errors.len(),
        output.display()
    );
    Ok(())
}

fn process(config: &Config, args: ProcessArgs) -> anyhow::Result<RunReport> {
    let input = args.input.unwrap_or_else(|| config.output.raw_path.clone());
    let output = args.output.unwrap_or_else(|| config.output.dataset_path.clone());
    let report_path = args.report.unwrap_or_else(|| config.output.report_path.clone());
    let run_timestamp = args.generated_at.unwrap_or_else(Utc::now);

    let orchestrator = Orchestrator::from_config(config);
    let report = run_to_files(&orchestrator, &input, &output, &report_path, run_timestamp)
        .with_context(|| format!("processing {}", input.display()))?;

    println!("Processed {} records.", report.counts.fetched);
    println!(
        "Accepted: {}, Rejected: {}, Deduped: {}",
        report.counts.accepted, report.counts.rejected, report.counts.deduped
    );
    println!("Report written to {}", report_path.display());
    Ok(report)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    logging::init_logging(&config.logging);

    let result = match cli.command {
        Commands::Crawl { sources, output } => {
            let output = output.unwrap_or_else(|| config.output.raw_path.clone());
            crawl(&config, sources, output).await
        }
        Commands::Process(args) => process(&config, args).map(|_| ()),
        Commands::Run { sources, process: args } => {
            let raw_path = args.input.clone().unwrap_or_else(|| config.output.raw_path.clone());
            info!("Step 1: crawling sources into {}", raw_path.display());
            crawl(&config, sources, raw_path.clone()).await?;

            info!("Step 2: processing {}", raw_path.display());
            process(&config, ProcessArgs { input: Some(raw_path), ..args }).map(|_| ())
        }
    };

    if let Err(e) = &result {
        error!("Run failed: {:#}", e);
    }
    result
}
