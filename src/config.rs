//! Analysis configuration

use chrono::NaiveDate;

use crate::campaign::Campaign;

/// Reference date of the observed export.
pub const DEFAULT_REFERENCE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2021, 6, 1) {
    Some(date) => date,
    None => panic!("default reference date is not a calendar date"),
};

/// Parameters of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Date recency is measured against; must not precede any last order.
    pub reference_date: NaiveDate,
    pub campaigns: Vec<Campaign>,
}

impl AnalysisConfig {
    pub fn new(reference_date: NaiveDate, campaigns: Vec<Campaign>) -> Self {
        Self {
            reference_date,
            campaigns,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_date: DEFAULT_REFERENCE_DATE,
            campaigns: vec![Campaign::new_brand(), Campaign::discount()],
        }
    }
}
