//! RfmForge: customer segmentation CLI using RFM quintile scores
//!
//! This is the main entrypoint that orchestrates loading, scoring,
//! reporting and the export of campaign target lists.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rfmforge::{load_records_from_path, report, rfm, run_analysis, Args};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.analysis_config()?;
    let start_time = Instant::now();

    let records = load_records_from_path(&args.input)
        .with_context(|| format!("Failed to load customers from {}", args.input.display()))?;
    if let Some(latest) = rfm::latest_order_date(&records) {
        debug!(%latest, reference_date = %config.reference_date, "latest order in export");
    }

    if args.describe {
        report::print_data_overview(&records, args.top);
    }

    let analysis = run_analysis(&records, &config).context("Segmentation failed")?;
    report::print_segment_summary(&analysis.summary, analysis.customers.len());

    // Nothing is written unless the whole analysis succeeded.
    let written = report::write_outputs(&args.output_dir, &analysis, args.rfm_output.as_deref())
        .context("Failed to write outputs")?;

    println!("\n=== Campaign Targets ===");
    for (targets, path) in analysis.targets.iter().zip(&written.target_lists) {
        println!(
            "{}: {} customers -> {}",
            targets.campaign,
            targets.customer_ids.len(),
            path.display()
        );
    }
    if let Some(path) = &written.scored_customers {
        println!("Scored customers saved to: {}", path.display());
    }

    info!(
        elapsed_secs = start_time.elapsed().as_secs_f64(),
        "pipeline complete"
    );
    Ok(())
}

/// Initialize tracing from the RFM_LOG environment variable, logging to stderr.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("RFM_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
