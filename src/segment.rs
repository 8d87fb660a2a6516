//! Mapping of recency/frequency codes to named marketing segments

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::Serialize;

use crate::error::RfmError;
use crate::scoring::{RfmScores, Score};

/// Named customer segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Hibernating,
    AtRisk,
    CantLoose,
    AboutToSleep,
    NeedAttention,
    LoyalCustomers,
    Promising,
    NewCustomers,
    PotentialLoyalists,
    Champions,
}

impl Segment {
    pub const ALL: [Segment; 10] = [
        Segment::Hibernating,
        Segment::AtRisk,
        Segment::CantLoose,
        Segment::AboutToSleep,
        Segment::NeedAttention,
        Segment::LoyalCustomers,
        Segment::Promising,
        Segment::NewCustomers,
        Segment::PotentialLoyalists,
        Segment::Champions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Segment::Hibernating => "hibernating",
            Segment::AtRisk => "at_risk",
            Segment::CantLoose => "cant_loose",
            Segment::AboutToSleep => "about_to_sleep",
            Segment::NeedAttention => "need_attention",
            Segment::LoyalCustomers => "loyal_customers",
            Segment::Promising => "promising",
            Segment::NewCustomers => "new_customers",
            Segment::PotentialLoyalists => "potential_loyalists",
            Segment::Champions => "champions",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Segment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Segment::ALL
            .into_iter()
            .find(|segment| segment.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known: Vec<_> = Segment::ALL.iter().map(|s| s.as_str()).collect();
                format!("unknown segment '{wanted}', expected one of: {}", known.join(", "))
            })
    }
}

/// Two-character code built from the recency and frequency scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RfmCode {
    pub recency: Score,
    pub frequency: Score,
}

impl From<&RfmScores> for RfmCode {
    fn from(scores: &RfmScores) -> Self {
        RfmCode {
            recency: scores.recency,
            frequency: scores.frequency,
        }
    }
}

impl fmt::Display for RfmCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.recency, self.frequency)
    }
}

impl FromStr for RfmCode {
    type Err = RfmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digit = |c: char| {
            c.to_digit(10)
                .and_then(|d| Score::new(d as u8))
                .ok_or_else(|| RfmError::InvalidCode(s.to_string()))
        };

        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(r), Some(f), None) => Ok(RfmCode {
                recency: digit(r)?,
                frequency: digit(f)?,
            }),
            _ => Err(RfmError::InvalidCode(s.to_string())),
        }
    }
}

struct Rule {
    recency: RangeInclusive<u8>,
    frequency: RangeInclusive<u8>,
    segment: Segment,
}

impl Rule {
    fn matches(&self, code: RfmCode) -> bool {
        self.recency.contains(&code.recency.get()) && self.frequency.contains(&code.frequency.get())
    }
}

/// Ordered decision table; the first matching rule wins.
const RULES: [Rule; 10] = [
    Rule { recency: 1..=2, frequency: 1..=2, segment: Segment::Hibernating },
    Rule { recency: 1..=2, frequency: 3..=4, segment: Segment::AtRisk },
    Rule { recency: 1..=2, frequency: 5..=5, segment: Segment::CantLoose },
    Rule { recency: 3..=3, frequency: 1..=2, segment: Segment::AboutToSleep },
    Rule { recency: 3..=3, frequency: 3..=3, segment: Segment::NeedAttention },
    Rule { recency: 3..=4, frequency: 4..=5, segment: Segment::LoyalCustomers },
    Rule { recency: 4..=4, frequency: 1..=1, segment: Segment::Promising },
    Rule { recency: 5..=5, frequency: 1..=1, segment: Segment::NewCustomers },
    Rule { recency: 4..=5, frequency: 2..=3, segment: Segment::PotentialLoyalists },
    Rule { recency: 5..=5, frequency: 4..=5, segment: Segment::Champions },
];

/// Classify a code into its segment.
pub fn classify(code: RfmCode) -> Result<Segment, RfmError> {
    RULES
        .iter()
        .find(|rule| rule.matches(code))
        .map(|rule| rule.segment)
        .ok_or(RfmError::UnclassifiedCode {
            recency: code.recency.get(),
            frequency: code.frequency.get(),
        })
}
