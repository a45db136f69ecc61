use std::path::PathBuf;

use clap::Parser;
use futures::future::join_all;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use docgate::api::DocumentApi;
use docgate::client::HttpSubmitter;
use docgate::config::DocgateConfig;
use docgate::document::Document;

/// Submit a signed document to the document API without exceeding the
/// configured request rate.
#[derive(Parser, Debug)]
#[command(name = "docgate", version)]
struct Args {
    /// YAML configuration file; `DOCGATE__*` environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file containing the document to submit
    #[arg(short, long)]
    document: PathBuf,

    /// Document signature sent in the `Signature` header
    #[arg(short, long)]
    signature: String,

    /// Number of concurrent submissions of the document
    #[arg(short, long, default_value_t = 1)]
    repeat: usize,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .init();
    }

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = DocgateConfig::load(args.config.as_deref())?;
    info!(
        endpoint = %config.client.endpoint,
        time_unit = ?config.gate.time_unit,
        request_limit = config.gate.request_limit,
        "Configuration loaded"
    );

    let contents = std::fs::read_to_string(&args.document)?;
    let document = Document::from_json(&contents)?;

    let api = DocumentApi::new(config.gate.build()?, HttpSubmitter::new(&config.client)?);

    let submissions = (0..args.repeat).map(|_| api.create_document(&document, &args.signature));
    let results = join_all(submissions).await;

    let failures = results.iter().filter(|result| result.is_err()).count();
    let created = results
        .iter()
        .filter(|result| matches!(result, Ok(response) if response.is_created()))
        .count();

    info!(
        submitted = results.len(),
        created = created,
        failed = failures,
        "All submissions finished"
    );

    if failures > 0 {
        error!(failed = failures, "Some submissions failed in transport");
        anyhow::bail!("{} of {} submissions failed", failures, results.len());
    }

    Ok(())
}
