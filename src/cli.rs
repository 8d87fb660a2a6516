//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::campaign::Campaign;
use crate::config::{AnalysisConfig, DEFAULT_REFERENCE_DATE};
use crate::segment::Segment;

/// Customer segmentation CLI using RFM quintile scores
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the customer export CSV file
    #[arg(short, long, default_value = "flo_data_20k.csv")]
    pub input: PathBuf,

    /// Date recency is measured against (YYYY-MM-DD)
    #[arg(long, env = "RFM_REFERENCE_DATE", default_value_t = DEFAULT_REFERENCE_DATE)]
    pub reference_date: NaiveDate,

    /// Directory the campaign target lists are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Also write every scored customer to this CSV file
    #[arg(long)]
    pub rfm_output: Option<PathBuf>,

    /// Print channel breakdown and top customers before scoring
    #[arg(long)]
    pub describe: bool,

    /// Number of customers listed in the top rankings
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Segments targeted by the new-brand campaign
    #[arg(long, value_delimiter = ',', default_values = ["champions", "loyal_customers"])]
    pub brand_segments: Vec<Segment>,

    /// Spend the new-brand campaign requires, strictly greater than (250 when unset)
    #[arg(long)]
    pub brand_min_spend: Option<f64>,

    /// Target new-brand customers regardless of spend
    #[arg(long, conflicts_with = "brand_min_spend")]
    pub no_brand_min_spend: bool,

    /// Category substrings for the new-brand campaign
    #[arg(long, value_delimiter = ',', default_values = ["KADIN"])]
    pub brand_categories: Vec<String>,

    /// Segments targeted by the discount campaign
    #[arg(
        long,
        value_delimiter = ',',
        default_values = ["at_risk", "hibernating", "cant_loose", "new_customers"]
    )]
    pub discount_segments: Vec<Segment>,

    /// Spend the discount campaign requires (strictly greater than)
    #[arg(long)]
    pub discount_min_spend: Option<f64>,

    /// Category substrings for the discount campaign
    #[arg(long, value_delimiter = ',', default_values = ["ERKEK", "COCUK"])]
    pub discount_categories: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Campaign definitions assembled from the campaign flags
    pub fn campaigns(&self) -> Vec<Campaign> {
        let brand_min_spend = if self.no_brand_min_spend {
            None
        } else {
            self.brand_min_spend
                .or(Campaign::new_brand().monetary_threshold)
        };

        vec![
            Campaign {
                name: "new_brand".to_string(),
                segments: self.brand_segments.clone(),
                monetary_threshold: brand_min_spend,
                category_filters: self.brand_categories.clone(),
            },
            Campaign {
                name: "discount".to_string(),
                segments: self.discount_segments.clone(),
                monetary_threshold: self.discount_min_spend,
                category_filters: self.discount_categories.clone(),
            },
        ]
    }

    /// Build the analysis configuration
    pub fn analysis_config(&self) -> crate::Result<AnalysisConfig> {
        for campaign in self.campaigns() {
            if let Some(threshold) = campaign.monetary_threshold {
                if !threshold.is_finite() || threshold < 0.0 {
                    anyhow::bail!(
                        "Spend threshold for campaign '{}' must be a non-negative number",
                        campaign.name
                    );
                }
            }
        }
        Ok(AnalysisConfig::new(self.reference_date, self.campaigns()))
    }
}
