//! Quintile scoring of recency, frequency and monetary values

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use crate::error::RfmError;
use crate::rfm::CustomerMetrics;

/// Number of ordinal buckets every metric is split into.
pub const QUANTILE_BUCKETS: usize = 5;

/// The metric a score was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Recency,
    Frequency,
    Monetary,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Recency => "recency",
            Metric::Frequency => "frequency",
            Metric::Monetary => "monetary",
        })
    }
}

/// An ordinal score between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Score(u8);

impl Score {
    pub const MIN: Score = Score(1);
    pub const MAX: Score = Score(5);

    pub fn new(value: u8) -> Option<Self> {
        (1..=QUANTILE_BUCKETS as u8).contains(&value).then_some(Score(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn inverted(self) -> Self {
        Score(QUANTILE_BUCKETS as u8 + 1 - self.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scores of one customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfmScores {
    pub recency: Score,
    pub frequency: Score,
    pub monetary: Score,
}

/// Split a population into five buckets of near-equal size.
///
/// Values are ranked ascending with ties kept in input order, then the rank
/// `r` of `n` lands in the first bucket `k` with `r - 1 <= k * (n - 1) / 5`,
/// i.e. quintile cuts taken over the ranks rather than the raw values. This
/// keeps every bucket populated however many values repeat.
pub fn quintile_buckets<T, F>(values: &[T], metric: Metric, compare: F) -> Result<Vec<Score>, RfmError>
where
    F: Fn(&T, &T) -> Ordering,
{
    let population = values.len();
    if population < QUANTILE_BUCKETS {
        return Err(RfmError::DegeneratePopulation { metric, population });
    }

    let mut order: Vec<usize> = (0..population).collect();
    order.sort_by(|&a, &b| compare(&values[a], &values[b]));

    let span = (population - 1) as u64;
    let mut buckets = vec![Score::MIN; population];
    let mut sizes = [0usize; QUANTILE_BUCKETS];
    for (position, &index) in order.iter().enumerate() {
        let bucket = (position as u64 * QUANTILE_BUCKETS as u64)
            .div_ceil(span)
            .max(1) as usize;
        sizes[bucket - 1] += 1;
        buckets[index] = Score(bucket as u8);
    }

    if sizes.contains(&0) {
        return Err(RfmError::DegeneratePopulation { metric, population });
    }

    debug!(%metric, ?sizes, "assigned quintile buckets");
    Ok(buckets)
}

/// Score every customer on the three metrics.
///
/// Recency is inverted so the most recent fifth of the population scores 5.
pub fn score_population(customers: &[CustomerMetrics]) -> Result<Vec<RfmScores>, RfmError> {
    let recency: Vec<u64> = customers.iter().map(|c| c.recency).collect();
    let frequency: Vec<u64> = customers.iter().map(|c| c.frequency).collect();
    let monetary: Vec<f64> = customers.iter().map(|c| c.monetary).collect();

    let recency_scores = quintile_buckets(&recency, Metric::Recency, u64::cmp)?;
    let frequency_scores = quintile_buckets(&frequency, Metric::Frequency, u64::cmp)?;
    let monetary_scores = quintile_buckets(&monetary, Metric::Monetary, f64::total_cmp)?;

    Ok(recency_scores
        .into_iter()
        .zip(frequency_scores)
        .zip(monetary_scores)
        .map(|((recency, frequency), monetary)| RfmScores {
            recency: recency.inverted(),
            frequency,
            monetary,
        })
        .collect())
}
