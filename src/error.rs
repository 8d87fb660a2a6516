//! Error taxonomy for the RFM pipeline

use chrono::NaiveDate;

use crate::scoring::Metric;

/// Errors raised while loading, scoring or classifying customers.
#[derive(Debug, thiserror::Error)]
pub enum RfmError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed input at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("record '{record_id}': invalid field '{field}': {reason}")]
    InvalidField {
        record_id: String,
        field: &'static str,
        reason: String,
    },

    #[error("record '{record_id}' has no orders on any channel")]
    NoOrders { record_id: String },

    #[error(
        "reference date {reference_date} precedes last order {last_order_date} of customer '{record_id}'"
    )]
    ReferenceDateTooEarly {
        reference_date: NaiveDate,
        last_order_date: NaiveDate,
        record_id: String,
    },

    #[error("cannot split {metric} into quintiles: population of {population} customers")]
    DegeneratePopulation { metric: Metric, population: usize },

    #[error("internal invariant violated: no segment rule matches code {recency}{frequency}")]
    UnclassifiedCode { recency: u8, frequency: u8 },

    #[error("invalid RFM code '{0}': expected two digits between 1 and 5")]
    InvalidCode(String),

    #[error("failed to write output: {0}")]
    Output(#[from] csv::Error),
}

impl RfmError {
    pub(crate) fn invalid_field(
        record_id: &str,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            record_id: record_id.to_string(),
            field,
            reason: reason.into(),
        }
    }
}
