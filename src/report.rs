//! Summary tables, console reports and list exports

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::campaign::CampaignTargets;
use crate::data::CustomerRecord;
use crate::error::RfmError;
use crate::pipeline::{RfmAnalysis, ScoredCustomer};
use crate::segment::Segment;

/// Mean metrics of one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    pub segment: Segment,
    pub mean_recency: f64,
    pub mean_frequency: f64,
    pub mean_monetary: f64,
    pub count: usize,
}

/// Average recency, frequency and monetary per segment, for every segment
/// with at least one member, in segment declaration order.
pub fn summarize_segments(customers: &[ScoredCustomer]) -> Vec<SegmentSummary> {
    let mut totals: BTreeMap<Segment, (f64, f64, f64, usize)> = BTreeMap::new();
    for customer in customers {
        let entry = totals.entry(customer.segment).or_insert((0.0, 0.0, 0.0, 0));
        entry.0 += customer.metrics.recency as f64;
        entry.1 += customer.metrics.frequency as f64;
        entry.2 += customer.metrics.monetary;
        entry.3 += 1;
    }

    totals
        .into_iter()
        .map(|(segment, (recency, frequency, monetary, count))| {
            let n = count as f64;
            SegmentSummary {
                segment,
                mean_recency: recency / n,
                mean_frequency: frequency / n,
                mean_monetary: monetary / n,
                count,
            }
        })
        .collect()
}

/// Customer count and averages for one order channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSummary {
    pub channel: String,
    pub customers: usize,
    pub mean_orders: f64,
    pub mean_spend: f64,
}

/// Break the raw export down by order channel, ordered by channel name.
pub fn channel_breakdown(records: &[CustomerRecord]) -> Vec<ChannelSummary> {
    let mut totals: BTreeMap<&str, (usize, f64, f64)> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(record.order_channel.as_str()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += record.total_order_number() as f64;
        entry.2 += record.total_spending();
    }

    totals
        .into_iter()
        .map(|(channel, (customers, orders, spend))| ChannelSummary {
            channel: channel.to_string(),
            customers,
            mean_orders: orders / customers as f64,
            mean_spend: spend / customers as f64,
        })
        .collect()
}

/// The `limit` records ranking highest by `key`, ties kept in input order.
pub fn top_customers_by<F>(records: &[CustomerRecord], limit: usize, key: F) -> Vec<&CustomerRecord>
where
    F: Fn(&CustomerRecord) -> f64,
{
    let mut ranked: Vec<&CustomerRecord> = records.iter().collect();
    ranked.sort_by(|a, b| key(b).total_cmp(&key(a)));
    ranked.truncate(limit);
    ranked
}

/// Print the exploratory overview of the raw export
pub fn print_data_overview(records: &[CustomerRecord], top: usize) {
    println!("\n=== Data Overview ===");
    println!("Rows: {}", records.len());

    println!("\nBreakdown by order channel:");
    println!("  {:<14} | {:>9} | {:>11} | {:>11}", "Channel", "Customers", "Mean orders", "Mean spend");
    println!("  ---------------|-----------|-------------|------------");
    for channel in channel_breakdown(records) {
        println!(
            "  {:<14} | {:>9} | {:>11.2} | {:>11.2}",
            channel.channel, channel.customers, channel.mean_orders, channel.mean_spend
        );
    }

    println!("\nTop {top} customers by total spending:");
    for record in top_customers_by(records, top, CustomerRecord::total_spending) {
        println!("  {:<40} {:>12.2}", record.customer_id, record.total_spending());
    }

    println!("\nTop {top} customers by total orders:");
    for record in top_customers_by(records, top, |r| r.total_order_number() as f64) {
        println!("  {:<40} {:>12}", record.customer_id, record.total_order_number());
    }
}

/// Print the per-segment summary table
pub fn print_segment_summary(summary: &[SegmentSummary], total_customers: usize) {
    println!("\n=== Segment Summary ===");
    println!("Total customers: {}", total_customers);
    println!(
        "  {:<20} | {:>9} | {:>10} | {:>10} | {:>6} | {:>6}",
        "Segment", "Recency", "Frequency", "Monetary", "Count", "Share"
    );
    println!("  ---------------------|-----------|------------|------------|--------|-------");
    for row in summary {
        let share = (row.count as f64 / total_customers.max(1) as f64) * 100.0;
        println!(
            "  {:<20} | {:>9.2} | {:>10.2} | {:>10.2} | {:>6} | {:>5.1}%",
            row.segment.as_str(),
            row.mean_recency,
            row.mean_frequency,
            row.mean_monetary,
            row.count,
            share
        );
    }
}

#[derive(Serialize)]
struct ScoredRow<'a> {
    customer_id: &'a str,
    recency: u64,
    frequency: u64,
    monetary: f64,
    recency_score: u8,
    frequency_score: u8,
    monetary_score: u8,
    rfm_code: String,
    segment: Segment,
}

/// Write every scored customer as CSV.
pub fn write_scored_customers<W: Write>(sink: W, customers: &[ScoredCustomer]) -> Result<(), RfmError> {
    let mut writer = csv::Writer::from_writer(sink);
    for customer in customers {
        writer.serialize(ScoredRow {
            customer_id: &customer.metrics.customer_id,
            recency: customer.metrics.recency,
            frequency: customer.metrics.frequency,
            monetary: customer.metrics.monetary,
            recency_score: customer.scores.recency.get(),
            frequency_score: customer.scores.frequency.get(),
            monetary_score: customer.scores.monetary.get(),
            rfm_code: customer.rfm_code().to_string(),
            segment: customer.segment,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write one campaign's list under a single `<campaign>_target_customer_id`
/// column.
pub fn write_target_ids<W: Write>(sink: W, targets: &CampaignTargets) -> Result<(), RfmError> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record([format!("{}_target_customer_id", targets.campaign)])?;
    for id in &targets.customer_ids {
        writer.write_record([id])?;
    }
    writer.flush()?;
    Ok(())
}

/// Where a campaign's list lands inside `output_dir`.
pub fn target_list_path(output_dir: &Path, campaign: &str) -> PathBuf {
    output_dir.join(format!("{campaign}_target_customer_ids.csv"))
}

/// Files produced by [`write_outputs`].
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenOutputs {
    pub target_lists: Vec<PathBuf>,
    pub scored_customers: Option<PathBuf>,
}

/// Write the campaign lists and the optional scored export.
///
/// Every file is first written to a temporary file beside its destination;
/// they are renamed into place only once all of them were written, so a
/// failing destination leaves no list behind.
pub fn write_outputs(
    output_dir: &Path,
    analysis: &RfmAnalysis,
    rfm_output: Option<&Path>,
) -> Result<WrittenOutputs, RfmError> {
    let mut staged: Vec<(NamedTempFile, PathBuf)> = Vec::new();

    if let Some(path) = rfm_output {
        let mut file = NamedTempFile::new_in(parent_dir(path))?;
        write_scored_customers(file.as_file_mut(), &analysis.customers)?;
        staged.push((file, path.to_path_buf()));
    }

    fs::create_dir_all(output_dir)?;
    let mut target_lists = Vec::with_capacity(analysis.targets.len());
    for targets in &analysis.targets {
        let mut file = NamedTempFile::new_in(output_dir)?;
        write_target_ids(file.as_file_mut(), targets)?;
        let path = target_list_path(output_dir, &targets.campaign);
        staged.push((file, path.clone()));
        target_lists.push(path);
    }

    for (file, path) in staged {
        file.persist(&path).map_err(|err| err.error)?;
        info!(path = %path.display(), "wrote output file");
    }

    Ok(WrittenOutputs {
        target_lists,
        scored_customers: rfm_output.map(Path::to_path_buf),
    })
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
