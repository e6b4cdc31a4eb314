//! Execution outcome and its severity ordering.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of a step, action, execution, suite or build.
///
/// Declaration order is severity order: `Skipped < Pass < Error < Fail`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    #[default]
    Skipped,
    Pass,
    Error,
    Fail,
}

impl Outcome {
    /// All outcomes, lowest severity first.
    pub const ALL: [Outcome; 4] = [Outcome::Skipped, Outcome::Pass, Outcome::Error, Outcome::Fail];

    /// Severity rank; higher is worse.
    pub fn rank(self) -> u8 {
        match self {
            Self::Skipped => 0,
            Self::Pass => 1,
            Self::Error => 2,
            Self::Fail => 3,
        }
    }

    /// The more severe of two outcomes. On equal rank `self` wins.
    pub fn combine(self, other: Outcome) -> Outcome {
        if other.rank() > self.rank() { other } else { self }
    }

    /// Fold any number of outcomes, starting from `Skipped`.
    pub fn worst<I>(outcomes: I) -> Outcome
    where
        I: IntoIterator<Item = Outcome>,
    {
        outcomes.into_iter().fold(Outcome::Skipped, Outcome::combine)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped => "SKIPPED",
            Self::Pass => "PASS",
            Self::Error => "ERROR",
            Self::Fail => "FAIL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SKIPPED" => Some(Self::Skipped),
            "PASS" => Some(Self::Pass),
            "ERROR" => Some(Self::Error),
            "FAIL" => Some(Self::Fail),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
