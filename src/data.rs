//! Data loading and per-customer feature derivation

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::RfmError;

/// One row of the customer export exactly as it appears on disk.
///
/// Every field is kept as text so that validation can name the offending
/// column and customer instead of failing with a bare decode error.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCustomerRecord {
    pub master_id: String,
    pub order_channel: String,
    pub last_order_channel: String,
    pub first_order_date: String,
    pub last_order_date: String,
    pub last_order_date_online: String,
    pub last_order_date_offline: String,
    pub order_num_total_ever_online: String,
    pub order_num_total_ever_offline: String,
    pub customer_value_total_ever_offline: String,
    pub customer_value_total_ever_online: String,
    pub interested_in_categories_12: String,
}

/// A validated customer record with channel totals and parsed dates.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub order_channel: String,
    pub last_order_channel: String,
    pub first_order_date: NaiveDate,
    pub last_order_date: NaiveDate,
    pub last_order_date_online: NaiveDate,
    pub last_order_date_offline: NaiveDate,
    pub online_orders: u64,
    pub offline_orders: u64,
    pub online_spend: f64,
    pub offline_spend: f64,
    /// Free-text category interests, matched verbatim by campaigns.
    pub categories: String,
}

impl CustomerRecord {
    /// Orders placed across both channels.
    pub fn total_order_number(&self) -> u64 {
        self.online_orders + self.offline_orders
    }

    /// Money spent across both channels.
    pub fn total_spending(&self) -> f64 {
        self.online_spend + self.offline_spend
    }
}

impl TryFrom<RawCustomerRecord> for CustomerRecord {
    type Error = RfmError;

    fn try_from(raw: RawCustomerRecord) -> Result<Self, Self::Error> {
        let id = raw.master_id.trim();
        if id.is_empty() {
            return Err(RfmError::invalid_field("<blank>", "master_id", "missing identifier"));
        }

        let record = CustomerRecord {
            customer_id: id.to_string(),
            order_channel: raw.order_channel.trim().to_string(),
            last_order_channel: raw.last_order_channel.trim().to_string(),
            first_order_date: parse_date(id, "first_order_date", &raw.first_order_date)?,
            last_order_date: parse_date(id, "last_order_date", &raw.last_order_date)?,
            last_order_date_online: parse_date(
                id,
                "last_order_date_online",
                &raw.last_order_date_online,
            )?,
            last_order_date_offline: parse_date(
                id,
                "last_order_date_offline",
                &raw.last_order_date_offline,
            )?,
            online_orders: parse_count(
                id,
                "order_num_total_ever_online",
                &raw.order_num_total_ever_online,
            )?,
            offline_orders: parse_count(
                id,
                "order_num_total_ever_offline",
                &raw.order_num_total_ever_offline,
            )?,
            online_spend: parse_amount(
                id,
                "customer_value_total_ever_online",
                &raw.customer_value_total_ever_online,
            )?,
            offline_spend: parse_amount(
                id,
                "customer_value_total_ever_offline",
                &raw.customer_value_total_ever_offline,
            )?,
            categories: raw.interested_in_categories_12,
        };

        if record.total_order_number() == 0 {
            return Err(RfmError::NoOrders {
                record_id: record.customer_id,
            });
        }

        Ok(record)
    }
}

/// Parse a calendar date, dropping any time-of-day component.
pub fn parse_date(record_id: &str, field: &'static str, value: &str) -> Result<NaiveDate, RfmError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RfmError::invalid_field(record_id, field, "missing date"));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime.date());
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.date_naive());
    }

    Err(RfmError::invalid_field(
        record_id,
        field,
        format!("'{value}' is not a calendar date"),
    ))
}

/// Parse an order count. The export writes counts as `4.0`, so integral
/// decimals are accepted.
fn parse_count(record_id: &str, field: &'static str, value: &str) -> Result<u64, RfmError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RfmError::invalid_field(record_id, field, "missing order count"));
    }
    if let Ok(count) = value.parse::<u64>() {
        return Ok(count);
    }

    match value.parse::<f64>() {
        Ok(count) if count.is_finite() && count >= 0.0 && count.fract() == 0.0 => {
            Ok(count as u64)
        }
        _ => Err(RfmError::invalid_field(
            record_id,
            field,
            format!("'{value}' is not a non-negative whole number"),
        )),
    }
}

fn parse_amount(record_id: &str, field: &'static str, value: &str) -> Result<f64, RfmError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RfmError::invalid_field(record_id, field, "missing amount"));
    }

    match value.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        _ => Err(RfmError::invalid_field(
            record_id,
            field,
            format!("'{value}' is not a non-negative amount"),
        )),
    }
}

/// Load and validate customer records from any CSV source.
///
/// Stops at the first bad row: dropping customers would shift every
/// quintile boundary.
pub fn load_records<R: Read>(reader: R) -> Result<Vec<CustomerRecord>, RfmError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<RawCustomerRecord>().enumerate() {
        let raw = row.map_err(|source| RfmError::Csv {
            line: source
                .position()
                .map_or(index as u64 + 2, |position| position.line()),
            source,
        })?;
        records.push(CustomerRecord::try_from(raw)?);
    }

    debug!(records = records.len(), "decoded customer rows");
    Ok(records)
}

/// Load and validate customer records from a CSV file.
pub fn load_records_from_path(path: impl AsRef<Path>) -> Result<Vec<CustomerRecord>, RfmError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records = load_records(file)?;
    info!(path = %path.display(), records = records.len(), "loaded customer export");
    Ok(records)
}
