//! Target-customer extraction for promotional campaigns

use tracing::info;

use crate::pipeline::ScoredCustomer;
use crate::segment::Segment;

/// Filter selecting the customers a campaign should reach.
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    /// Short identifier, also used to name the exported list.
    pub name: String,
    pub segments: Vec<Segment>,
    /// Customers must spend strictly more than this, when set.
    pub monetary_threshold: Option<f64>,
    /// Case-sensitive substrings; any one occurring in the category text is a
    /// match. Empty accepts every customer.
    pub category_filters: Vec<String>,
}

impl Campaign {
    /// Loyal customers spending above 250 who shop the women's category.
    pub fn new_brand() -> Self {
        Campaign {
            name: "new_brand".to_string(),
            segments: vec![Segment::Champions, Segment::LoyalCustomers],
            monetary_threshold: Some(250.0),
            category_filters: vec!["KADIN".to_string()],
        }
    }

    /// Lapsing and brand-new customers of the men's and children's categories.
    pub fn discount() -> Self {
        Campaign {
            name: "discount".to_string(),
            segments: vec![
                Segment::AtRisk,
                Segment::Hibernating,
                Segment::CantLoose,
                Segment::NewCustomers,
            ],
            monetary_threshold: None,
            category_filters: vec!["ERKEK".to_string(), "COCUK".to_string()],
        }
    }

    pub fn matches(&self, customer: &ScoredCustomer) -> bool {
        self.segments.contains(&customer.segment)
            && self
                .monetary_threshold
                .map_or(true, |threshold| customer.metrics.monetary > threshold)
            && (self.category_filters.is_empty()
                || self
                    .category_filters
                    .iter()
                    .any(|filter| customer.metrics.categories.contains(filter.as_str())))
    }

    /// Identifiers of matching customers, in population order.
    pub fn extract_targets(&self, customers: &[ScoredCustomer]) -> Vec<String> {
        let targets: Vec<String> = customers
            .iter()
            .filter(|customer| self.matches(customer))
            .map(|customer| customer.metrics.customer_id.clone())
            .collect();

        info!(campaign = %self.name, targets = targets.len(), "extracted campaign targets");
        targets
    }
}

/// Target list produced for one campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignTargets {
    pub campaign: String,
    pub customer_ids: Vec<String>,
}
