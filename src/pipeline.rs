//! End-to-end RFM segmentation run

use tracing::info;

use crate::campaign::CampaignTargets;
use crate::config::AnalysisConfig;
use crate::data::CustomerRecord;
use crate::error::RfmError;
use crate::report::{summarize_segments, SegmentSummary};
use crate::rfm::{compute_rfm, CustomerMetrics};
use crate::scoring::{score_population, RfmScores};
use crate::segment::{classify, RfmCode, Segment};

/// A customer with its metrics, scores and segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCustomer {
    pub metrics: CustomerMetrics,
    pub scores: RfmScores,
    pub segment: Segment,
}

impl ScoredCustomer {
    pub fn rfm_code(&self) -> RfmCode {
        RfmCode::from(&self.scores)
    }
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct RfmAnalysis {
    pub customers: Vec<ScoredCustomer>,
    pub summary: Vec<SegmentSummary>,
    pub targets: Vec<CampaignTargets>,
}

/// Score and classify the population, then extract every campaign's targets.
pub fn segment_customers(
    records: &[CustomerRecord],
    config: &AnalysisConfig,
) -> Result<Vec<ScoredCustomer>, RfmError> {
    let metrics = compute_rfm(records, config.reference_date)?;
    let scores = score_population(&metrics)?;

    metrics
        .into_iter()
        .zip(scores)
        .map(|(metrics, scores)| -> Result<ScoredCustomer, RfmError> {
            let segment = classify(RfmCode::from(&scores))?;
            Ok(ScoredCustomer {
                metrics,
                scores,
                segment,
            })
        })
        .collect()
}

/// Run the full analysis. Either every output is produced or none is.
pub fn run_analysis(
    records: &[CustomerRecord],
    config: &AnalysisConfig,
) -> Result<RfmAnalysis, RfmError> {
    let customers = segment_customers(records, config)?;
    let summary = summarize_segments(&customers);

    let targets = config
        .campaigns
        .iter()
        .map(|campaign| CampaignTargets {
            campaign: campaign.name.clone(),
            customer_ids: campaign.extract_targets(&customers),
        })
        .collect();

    info!(
        customers = customers.len(),
        segments = summary.len(),
        "segmentation complete"
    );

    Ok(RfmAnalysis {
        customers,
        summary,
        targets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: usize, days_ago: i64, orders: u64, spend: f64) -> CustomerRecord {
        let last = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap() - chrono::Duration::days(days_ago);
        CustomerRecord {
            customer_id: format!("c{id}"),
            order_channel: "Mobile".to_string(),
            last_order_channel: "Mobile".to_string(),
            first_order_date: last,
            last_order_date: last,
            last_order_date_online: last,
            last_order_date_offline: last,
            online_orders: orders,
            offline_orders: 0,
            online_spend: spend,
            offline_spend: 0.0,
            categories: "[KADIN]".to_string(),
        }
    }

    #[test]
    fn test_segments_follow_codes() {
        let records: Vec<_> = (0..25)
            .map(|i| record(i, i as i64, 25 - i as u64, 100.0 + i as f64))
            .collect();
        let customers = segment_customers(&records, &AnalysisConfig::default()).unwrap();

        assert_eq!(customers.len(), 25);
        // Most recent and most frequent.
        assert_eq!(customers[0].rfm_code().to_string(), "55");
        assert_eq!(customers[0].segment, Segment::Champions);
        // Least recent and least frequent.
        assert_eq!(customers[24].rfm_code().to_string(), "11");
        assert_eq!(customers[24].segment, Segment::Hibernating);
        for customer in &customers {
            assert_eq!(customer.segment, classify(customer.rfm_code()).unwrap());
        }
    }

    #[test]
    fn test_run_is_deterministic() {
        let records: Vec<_> = (0..40)
            .map(|i| record(i, (i * 13 % 17) as i64, 1 + (i % 3) as u64, 50.0 * (i % 7) as f64))
            .collect();
        let config = AnalysisConfig::default();

        let first = run_analysis(&records, &config).unwrap();
        let second = run_analysis(&records, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_too_few_customers_fails_whole_run() {
        let records: Vec<_> = (0..3).map(|i| record(i, 1, 1, 1.0)).collect();
        assert!(matches!(
            run_analysis(&records, &AnalysisConfig::default()),
            Err(RfmError::DegeneratePopulation { .. })
        ));
    }
}
