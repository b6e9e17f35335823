//! brc-batch - brand reconciliation batch entry point
//!
//! Resolves configuration, picks the key source (query-backed when a
//! database URL is configured, table-backed otherwise), runs the pipeline,
//! and prints the run summary.

use anyhow::{Context, Result};
use brc_batch::services::{
    Classifier, CsvReportSink, HttpObjectStore, KeySource, ObjectFetcher, QueryKeySource,
    TableKeySource,
};
use brc_batch::{Pipeline, RunOutcome};
use brc_common::config::{BatchConfig, Overrides};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "brc-batch", version, about = "Reconcile S3-hosted order payloads against the expected brand")]
struct Args {
    /// Config file path (defaults to the platform config dir)
    #[arg(long, env = "BRC_CONFIG")]
    config: Option<PathBuf>,

    /// Object store endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Object store bucket
    #[arg(long)]
    bucket: Option<String>,

    /// Local cache directory for downloaded objects
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Input report table (index + key columns)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output report location
    #[arg(long)]
    output: Option<PathBuf>,

    /// Read keys from this database instead of the input table
    #[arg(long)]
    database_url: Option<String>,

    /// Expected brand; anything else is flagged
    #[arg(long)]
    expected_brand: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Starting brc-batch");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let overrides = Overrides {
        endpoint: args.endpoint,
        bucket: args.bucket,
        cache_dir: args.cache_dir,
        input_report: args.input,
        output_report: args.output,
        database_url: args.database_url,
        expected_brand: args.expected_brand,
    };
    let config = BatchConfig::resolve(overrides, args.config.as_deref())?;

    let store = HttpObjectStore::new(&config.object_store)
        .context("Failed to build object store client")?;
    let fetcher = ObjectFetcher::new(Arc::new(store), &config.paths.cache_dir)
        .with_context(|| {
            format!(
                "Failed to prepare cache directory {}",
                config.paths.cache_dir.display()
            )
        })?;
    let classifier = Classifier::new(&config.classify.expected_brand);
    let sink = CsvReportSink::new(&config.paths.output_report);

    let source: Box<dyn KeySource> = match &config.source.database_url {
        Some(url) => {
            info!("Key source: query against {}", url);
            Box::new(QueryKeySource::connect(url, &config.source.key_query).await?)
        }
        None => {
            info!("Key source: table {}", config.paths.input_report.display());
            Box::new(TableKeySource::new(&config.paths.input_report))
        }
    };

    let pipeline = Pipeline::new(fetcher, classifier, Box::new(sink));
    match pipeline.run(source.as_ref()).await? {
        RunOutcome::NoInput => {
            println!("No keys found in the source. Check the input; the previous report was left untouched.");
        }
        RunOutcome::Completed(report) => {
            let summary = &report.summary;
            println!(
                "Reconciled {} keys: {} downloaded, {} already present, {} failed, {} flagged",
                summary.total_keys,
                summary.downloaded,
                summary.already_present,
                summary.failed,
                summary.flagged
            );
            if summary.anomaly_order_ids.is_empty() {
                println!("Anomalies: none");
            } else {
                let ids: Vec<String> = summary
                    .anomaly_order_ids
                    .iter()
                    .map(i64::to_string)
                    .collect();
                println!("Anomalies (order ids): {}", ids.join(", "));
            }
            println!("Report written to {}", config.paths.output_report.display());
        }
    }

    Ok(())
}
