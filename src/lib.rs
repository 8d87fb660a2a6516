//! RfmForge: customer segmentation from RFM quintile scores
//!
//! Derives recency, frequency and monetary metrics from a customer export,
//! scores each metric into quintiles, names a segment per customer and
//! extracts campaign target lists.

pub mod campaign;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod rfm;
pub mod scoring;
pub mod segment;

// Re-export public items for easier access
pub use campaign::{Campaign, CampaignTargets};
pub use cli::Args;
pub use config::AnalysisConfig;
pub use data::{load_records, load_records_from_path, CustomerRecord};
pub use error::RfmError;
pub use pipeline::{run_analysis, segment_customers, RfmAnalysis, ScoredCustomer};
pub use rfm::{compute_rfm, CustomerMetrics};
pub use scoring::{score_population, Metric, RfmScores, Score};
pub use segment::{classify, RfmCode, Segment};

/// Result type used by the command-line layer
pub type Result<T> = anyhow::Result<T>;
