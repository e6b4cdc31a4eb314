//! Execution model: an ordered set of actions, each an ordered set of steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Outcome, Platform, TimeSpan};

/// Leaf result. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Step {
    pub name: String,
    pub status: Outcome,
    pub timestamp: DateTime<Utc>,
    /// Screenshot captured during this step, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_id: Option<Uuid>,
}

/// Ordered steps plus the derived status and span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Derived: worst step status, `SKIPPED` without steps.
    #[serde(default)]
    pub status: Outcome,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl Action {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Action {
            name: name.into(),
            steps,
            status: Outcome::Skipped,
            start: None,
            end: None,
        }
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.end)
    }
}

/// A single test execution, belonging to exactly one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Execution {
    pub id: Uuid,
    pub build_id: Uuid,
    pub title: String,
    /// Name of the suite this execution is grouped under (matched case-insensitively).
    pub suite_name: String,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// Derived: worst action status.
    pub status: Outcome,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Execution {
    /// Create an execution from an incoming request. Derived fields stay at their
    /// defaults until the aggregator rolls it up.
    pub fn new(build_id: Uuid, request: NewExecution) -> Self {
        Execution {
            id: request.id.unwrap_or_else(Uuid::now_v7),
            build_id,
            title: request.title,
            suite_name: request.suite_name,
            actions: request
                .actions
                .into_iter()
                .map(|a| Action::new(a.name, a.steps))
                .collect(),
            platforms: request
                .platforms
                .into_iter()
                .map(Platform::normalized)
                .collect(),
            status: Outcome::Skipped,
            start: None,
            end: None,
        }
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.end)
    }

    /// Compact record embedded in the owning suite.
    pub fn summary(&self) -> ExecutionSummary {
        ExecutionSummary {
            execution_id: self.id,
            title: self.title.clone(),
            status: self.status,
            start: self.start,
            end: self.end,
        }
    }
}

/// What a suite keeps about each of its executions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExecutionSummary {
    pub execution_id: Uuid,
    pub title: String,
    pub status: Outcome,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ExecutionSummary {
    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.end)
    }
}

/// Action as submitted by a test runner.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAction {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Request to record an execution into a build.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewExecution {
    /// Client-assigned id; re-submitting the same id replaces the earlier report.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    pub suite_name: String,
    #[serde(default)]
    pub actions: Vec<NewAction>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

impl NewExecution {
    /// Reject requests that cannot be grouped into a suite.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.suite_name.trim().is_empty() {
            return Err("suite_name must not be empty".to_string());
        }
        Ok(())
    }
}
