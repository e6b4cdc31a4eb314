//! Aggregate value types shared by every level of the result hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Outcome;

/// Count of children per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub struct Histogram {
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub pass: u32,
    #[serde(default)]
    pub error: u32,
    #[serde(default)]
    pub fail: u32,
}

impl Histogram {
    /// Histogram of an arbitrary sequence of outcomes.
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Outcome>,
    {
        let mut histogram = Self::default();
        for outcome in outcomes {
            histogram.record(outcome);
        }
        histogram
    }

    pub fn get(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Skipped => self.skipped,
            Outcome::Pass => self.pass,
            Outcome::Error => self.error,
            Outcome::Fail => self.fail,
        }
    }

    fn slot(&mut self, outcome: Outcome) -> &mut u32 {
        match outcome {
            Outcome::Skipped => &mut self.skipped,
            Outcome::Pass => &mut self.pass,
            Outcome::Error => &mut self.error,
            Outcome::Fail => &mut self.fail,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        *self.slot(outcome) += 1;
    }

    /// Elementwise sum.
    pub fn add(&mut self, other: &Histogram) {
        for outcome in Outcome::ALL {
            *self.slot(outcome) += other.get(outcome);
        }
    }

    pub fn total(&self) -> u32 {
        self.skipped + self.pass + self.error + self.fail
    }

    /// Most severe outcome with a non-zero count, `Skipped` when empty.
    pub fn worst(&self) -> Outcome {
        Outcome::worst(Outcome::ALL.into_iter().filter(|o| self.get(*o) > 0))
    }
}

/// Earliest start and latest end of a set of children. Either side may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeSpan {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeSpan {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Span covering a single instant.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self::new(Some(instant), Some(instant))
    }

    /// Minimum start, maximum end. Unset values never win over set ones.
    pub fn widen(&mut self, other: &TimeSpan) {
        self.start = earliest(self.start, other.start);
        self.end = latest(self.end, other.end);
    }

    pub fn widened(mut self, other: &TimeSpan) -> Self {
        self.widen(other);
        self
    }

    pub fn merge<'a, I>(spans: I) -> Self
    where
        I: IntoIterator<Item = &'a TimeSpan>,
    {
        spans
            .into_iter()
            .fold(TimeSpan::default(), |acc, span| acc.widened(span))
    }
}

fn earliest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

fn latest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Derived aggregate for any node of the hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RollupSummary {
    pub status: Outcome,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Direct children counted by outcome (executions for suites and builds).
    pub histogram: Histogram,
}
