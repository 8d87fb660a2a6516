//! Per-customer recency, frequency and monetary aggregation

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::data::CustomerRecord;
use crate::error::RfmError;

/// Recency, frequency and monetary values for one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerMetrics {
    pub customer_id: String,
    /// Whole days between the last order and the reference date.
    pub recency: u64,
    pub frequency: u64,
    pub monetary: f64,
    pub last_order_date: NaiveDate,
    pub order_channel: String,
    pub categories: String,
}

/// Group records by customer and measure them against `reference_date`.
///
/// Rows sharing an identifier are merged: counts and spend are summed, the
/// latest last-order date wins and category text is concatenated. Output
/// order is the order in which each customer first appears.
pub fn compute_rfm(
    records: &[CustomerRecord],
    reference_date: NaiveDate,
) -> Result<Vec<CustomerMetrics>, RfmError> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    let mut merged: Vec<CustomerMetrics> = Vec::with_capacity(records.len());

    for record in records {
        match positions.get(record.customer_id.as_str()) {
            Some(&position) => {
                let entry = &mut merged[position];
                entry.frequency += record.total_order_number();
                entry.monetary += record.total_spending();
                entry.last_order_date = entry.last_order_date.max(record.last_order_date);
                entry.categories.push_str(&record.categories);
            }
            None => {
                positions.insert(record.customer_id.as_str(), merged.len());
                merged.push(CustomerMetrics {
                    customer_id: record.customer_id.clone(),
                    recency: 0,
                    frequency: record.total_order_number(),
                    monetary: record.total_spending(),
                    last_order_date: record.last_order_date,
                    order_channel: record.order_channel.clone(),
                    categories: record.categories.clone(),
                });
            }
        }
    }

    if merged.len() < records.len() {
        debug!(
            rows = records.len(),
            customers = merged.len(),
            "merged repeated customer rows"
        );
    }

    for customer in &mut merged {
        let days = (reference_date - customer.last_order_date).num_days();
        if days < 0 {
            return Err(RfmError::ReferenceDateTooEarly {
                reference_date,
                last_order_date: customer.last_order_date,
                record_id: customer.customer_id.clone(),
            });
        }
        customer.recency = days as u64;
    }

    info!(customers = merged.len(), %reference_date, "computed RFM metrics");
    Ok(merged)
}

/// Latest last-order date in the data set, the earliest valid reference date.
pub fn latest_order_date(records: &[CustomerRecord]) -> Option<NaiveDate> {
    records.iter().map(|record| record.last_order_date).max()
}
