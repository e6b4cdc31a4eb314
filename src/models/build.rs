//! Build model with its embedded suites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{ExecutionSummary, Histogram, Outcome, RollupSummary, TimeSpan};

/// Case-insensitive suite identity, normalized once when a suite name enters the system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SuiteKey(String);

impl SuiteKey {
    pub fn new(name: &str) -> Self {
        SuiteKey(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Suite embedded in a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Suite {
    /// Display name as first reported.
    pub name: String,
    pub key: SuiteKey,
    pub histogram: Histogram,
    pub status: Outcome,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub executions: Vec<ExecutionSummary>,
}

impl Suite {
    pub fn new(name: &str) -> Self {
        Suite {
            name: name.trim().to_string(),
            key: SuiteKey::new(name),
            histogram: Histogram::default(),
            status: Outcome::Skipped,
            start: None,
            end: None,
            executions: Vec::new(),
        }
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.end)
    }
}

/// One test run: the root of the result hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Build {
    pub id: Uuid,
    pub name: String,
    pub suites: Vec<Suite>,
    pub histogram: Histogram,
    pub status: Outcome,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Build {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Build {
            id: Uuid::now_v7(),
            name: name.into(),
            suites: Vec::new(),
            histogram: Histogram::default(),
            status: Outcome::Skipped,
            start: None,
            end: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.end)
    }

    pub fn suite(&self, name: &str) -> Option<&Suite> {
        let key = SuiteKey::new(name);
        self.suites.iter().find(|s| s.key == key)
    }
}

/// Request to create a build.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBuildRequest {
    pub name: String,
}

/// Dashboard view of a build without its suites' execution lists.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BuildSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub rollup: RollupSummary,
    pub suites: Vec<SuiteSummary>,
}

/// Dashboard view of one suite.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SuiteSummary {
    pub name: String,
    pub rollup: RollupSummary,
}
