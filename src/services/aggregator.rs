//! Status rollup across the result hierarchy.
//!
//! Every derived field (`status`, `start`, `end`, `histogram`) on actions,
//! executions, suites and builds is written here and nowhere else. Aggregation is
//! pure: worst status by severity, earliest start, latest end, counts by outcome.
//! Appending an execution updates only its suite and the build by delta; a full
//! recompute with [`rollup_build`] always yields the same result.

use chrono::Utc;

use crate::models::{
    Action, Build, Execution, Histogram, Outcome, RollupSummary, Suite, SuiteKey, TimeSpan,
};

/// Derived aggregate of a node, computed from its children.
pub trait Rollup {
    fn rollup(&self) -> RollupSummary;
}

fn summary(status: Outcome, span: TimeSpan, histogram: Histogram) -> RollupSummary {
    RollupSummary {
        status,
        start: span.start,
        end: span.end,
        histogram,
    }
}

impl Rollup for Action {
    fn rollup(&self) -> RollupSummary {
        let spans: Vec<TimeSpan> = self.steps.iter().map(|s| TimeSpan::at(s.timestamp)).collect();
        summary(
            Outcome::worst(self.steps.iter().map(|s| s.status)),
            TimeSpan::merge(&spans),
            Histogram::from_outcomes(self.steps.iter().map(|s| s.status)),
        )
    }
}

impl Rollup for Execution {
    fn rollup(&self) -> RollupSummary {
        let actions: Vec<RollupSummary> = self.actions.iter().map(Rollup::rollup).collect();
        let spans: Vec<TimeSpan> = actions
            .iter()
            .map(|a| TimeSpan::new(a.start, a.end))
            .collect();
        summary(
            Outcome::worst(actions.iter().map(|a| a.status)),
            TimeSpan::merge(&spans),
            Histogram::from_outcomes(actions.iter().map(|a| a.status)),
        )
    }
}

impl Rollup for Suite {
    fn rollup(&self) -> RollupSummary {
        let spans: Vec<TimeSpan> = self.executions.iter().map(|e| e.span()).collect();
        summary(
            Outcome::worst(self.executions.iter().map(|e| e.status)),
            TimeSpan::merge(&spans),
            Histogram::from_outcomes(self.executions.iter().map(|e| e.status)),
        )
    }
}

impl Rollup for Build {
    fn rollup(&self) -> RollupSummary {
        let suites: Vec<RollupSummary> = self.suites.iter().map(Rollup::rollup).collect();
        let spans: Vec<TimeSpan> = suites
            .iter()
            .map(|s| TimeSpan::new(s.start, s.end))
            .collect();
        let mut histogram = Histogram::default();
        for suite in &suites {
            histogram.add(&suite.histogram);
        }
        summary(
            Outcome::worst(suites.iter().map(|s| s.status)),
            TimeSpan::merge(&spans),
            histogram,
        )
    }
}

/// Write an action's derived status and span.
pub fn rollup_action(action: &mut Action) {
    let rolled = action.rollup();
    action.status = rolled.status;
    action.start = rolled.start;
    action.end = rolled.end;
}

/// Write derived fields for every action of an execution, then the execution itself.
pub fn rollup_execution(execution: &mut Execution) {
    for action in &mut execution.actions {
        rollup_action(action);
    }
    let rolled = execution.rollup();
    execution.status = rolled.status;
    execution.start = rolled.start;
    execution.end = rolled.end;
}

/// Recompute a suite's aggregates from its execution summaries.
pub fn rollup_suite(suite: &mut Suite) {
    let rolled = suite.rollup();
    suite.status = rolled.status;
    suite.start = rolled.start;
    suite.end = rolled.end;
    suite.histogram = rolled.histogram;
}

/// Recompute a build's aggregates from scratch, suites first.
pub fn rollup_build(build: &mut Build) {
    for suite in &mut build.suites {
        rollup_suite(suite);
    }
    let rolled = build.rollup();
    build.status = rolled.status;
    build.start = rolled.start;
    build.end = rolled.end;
    build.histogram = rolled.histogram;
}

/// How an execution landed in its build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// New execution; suite and build updated by delta.
    Appended,
    /// Execution id was already present; its summary was replaced and the build recomputed.
    Replaced,
}

/// Roll up `execution` and fold it into `build`.
///
/// The suite is located by case-insensitive name and created when absent. Callers
/// must serialize calls per build.
pub fn apply_execution(build: &mut Build, execution: &mut Execution) -> Applied {
    rollup_execution(execution);
    let entry = execution.summary();
    let key = SuiteKey::new(&execution.suite_name);

    let previously_recorded = build
        .suites
        .iter()
        .any(|s| s.executions.iter().any(|e| e.execution_id == entry.execution_id));

    if previously_recorded {
        for suite in &mut build.suites {
            suite.executions.retain(|e| e.execution_id != entry.execution_id);
        }
        build
            .suites
            .retain(|s| s.key == key || !s.executions.is_empty());
    }

    let index = match build.suites.iter().position(|s| s.key == key) {
        Some(index) => index,
        None => {
            build.suites.push(Suite::new(&execution.suite_name));
            build.suites.len() - 1
        }
    };

    let suite = &mut build.suites[index];
    let span = entry.span();
    let status = entry.status;
    suite.executions.push(entry);
    build.updated_at = Utc::now();

    if previously_recorded {
        rollup_build(build);
        return Applied::Replaced;
    }

    suite.histogram.record(status);
    suite.status = suite.status.combine(status);
    let suite_span = suite.span().widened(&span);
    suite.start = suite_span.start;
    suite.end = suite_span.end;

    build.histogram.record(status);
    build.status = build.status.combine(status);
    let build_span = build.span().widened(&span);
    build.start = build_span.start;
    build.end = build_span.end;

    Applied::Appended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Step;
    use chrono::{DateTime, TimeZone};
    use uuid::Uuid;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn step(status: Outcome, at: i64) -> Step {
        Step {
            name: format!("step@{}", at),
            status,
            timestamp: ts(at),
            screenshot_id: None,
        }
    }

    fn execution(build: &Build, suite: &str, steps: Vec<Step>) -> Execution {
        Execution {
            id: Uuid::now_v7(),
            build_id: build.id,
            title: format!("{} case", suite),
            suite_name: suite.to_string(),
            actions: vec![Action::new("main", steps)],
            platforms: vec![],
            status: Outcome::Skipped,
            start: None,
            end: None,
        }
    }

    fn aggregates(build: &Build) -> (Outcome, TimeSpan, Histogram, Vec<(String, Outcome, Histogram, TimeSpan)>) {
        (
            build.status,
            build.span(),
            build.histogram,
            build
                .suites
                .iter()
                .map(|s| (s.key.as_str().to_string(), s.status, s.histogram, s.span()))
                .collect(),
        )
    }

    #[test]
    fn test_empty_action_is_skipped_and_unset() {
        let mut action = Action::new("noop", vec![]);
        rollup_action(&mut action);
        assert_eq!(action.status, Outcome::Skipped);
        assert!(action.start.is_none());
        assert!(action.end.is_none());
    }

    #[test]
    fn test_action_worst_status_and_span() {
        let mut action = Action::new(
            "checkout",
            vec![
                step(Outcome::Pass, 30),
                step(Outcome::Error, 10),
                step(Outcome::Pass, 20),
            ],
        );
        rollup_action(&mut action);
        assert_eq!(action.status, Outcome::Error);
        assert_eq!(action.start, Some(ts(10)));
        assert_eq!(action.end, Some(ts(30)));
    }

    #[test]
    fn test_execution_ignores_unset_action_spans() {
        let build = Build::new("b");
        let mut exec = execution(&build, "s", vec![step(Outcome::Pass, 5)]);
        exec.actions.push(Action::new("empty", vec![]));
        exec.actions.push(Action::new("late", vec![step(Outcome::Fail, 50)]));

        rollup_execution(&mut exec);
        assert_eq!(exec.status, Outcome::Fail);
        assert_eq!(exec.start, Some(ts(5)));
        assert_eq!(exec.end, Some(ts(50)));
        assert_eq!(exec.actions[1].status, Outcome::Skipped);
    }

    #[test]
    fn test_login_suite_scenario() {
        let mut build = Build::new("nightly");
        let mut passed = execution(&build, "login", vec![step(Outcome::Pass, 1)]);
        let mut failed = execution(&build, "login", vec![step(Outcome::Fail, 2)]);

        apply_execution(&mut build, &mut passed);
        apply_execution(&mut build, &mut failed);

        let suite = build.suite("login").unwrap();
        assert_eq!(suite.status, Outcome::Fail);
        assert_eq!(
            suite.histogram,
            Histogram {
                skipped: 0,
                pass: 1,
                error: 0,
                fail: 1
            }
        );
        assert_eq!(build.status, Outcome::Fail);
    }

    #[test]
    fn test_suite_lookup_is_case_insensitive() {
        let mut build = Build::new("b");
        let mut a = execution(&build, "Login", vec![step(Outcome::Pass, 1)]);
        let mut b = execution(&build, "LOGIN ", vec![step(Outcome::Pass, 2)]);

        apply_execution(&mut build, &mut a);
        apply_execution(&mut build, &mut b);

        assert_eq!(build.suites.len(), 1);
        assert_eq!(build.suites[0].name, "Login");
        assert_eq!(build.suites[0].executions.len(), 2);
    }

    #[test]
    fn test_incremental_matches_full_recompute() {
        let mut build = Build::new("b");
        let plan = [
            ("login", Outcome::Pass, 40),
            ("Checkout", Outcome::Error, 10),
            ("login", Outcome::Skipped, 70),
            ("search", Outcome::Pass, 5),
            ("checkout", Outcome::Fail, 90),
            ("LOGIN", Outcome::Pass, 1),
        ];

        for (suite, status, at) in plan {
            let mut exec = execution(&build, suite, vec![step(status, at), step(Outcome::Pass, at + 3)]);
            assert_eq!(apply_execution(&mut build, &mut exec), Applied::Appended);

            let incremental = aggregates(&build);
            let mut recomputed = build.clone();
            rollup_build(&mut recomputed);
            assert_eq!(incremental, aggregates(&recomputed));
        }

        assert_eq!(build.status, Outcome::Fail);
        assert_eq!(build.start, Some(ts(1)));
        assert_eq!(build.end, Some(ts(93)));
    }

    #[test]
    fn test_histogram_conservation() {
        let mut build = Build::new("b");
        let outcomes = [Outcome::Pass, Outcome::Fail, Outcome::Pass, Outcome::Error, Outcome::Skipped];
        for (i, outcome) in outcomes.iter().enumerate() {
            let suite = if i % 2 == 0 { "even" } else { "odd" };
            let steps = if *outcome == Outcome::Skipped { vec![] } else { vec![step(*outcome, i as i64)] };
            let mut exec = execution(&build, suite, steps);
            apply_execution(&mut build, &mut exec);
        }

        let mut summed = Histogram::default();
        for suite in &build.suites {
            summed.add(&suite.histogram);
        }
        let counted = Histogram::from_outcomes(
            build
                .suites
                .iter()
                .flat_map(|s| s.executions.iter().map(|e| e.status)),
        );

        assert_eq!(build.histogram, summed);
        assert_eq!(build.histogram, counted);
        assert_eq!(build.histogram.total(), outcomes.len() as u32);
    }

    #[test]
    fn test_rereport_replaces_without_double_counting() {
        let mut build = Build::new("b");
        let mut first = execution(&build, "login", vec![step(Outcome::Fail, 10)]);
        apply_execution(&mut build, &mut first);

        let mut retry = first.clone();
        retry.actions = vec![Action::new("main", vec![step(Outcome::Pass, 20)])];
        assert_eq!(apply_execution(&mut build, &mut retry), Applied::Replaced);

        assert_eq!(build.histogram.total(), 1);
        assert_eq!(build.histogram.pass, 1);
        assert_eq!(build.status, Outcome::Pass);
        assert_eq!(build.start, Some(ts(20)));
    }

    #[test]
    fn test_rereport_into_other_suite_moves_execution() {
        let mut build = Build::new("b");
        let mut first = execution(&build, "login", vec![step(Outcome::Fail, 10)]);
        apply_execution(&mut build, &mut first);

        let mut moved = first.clone();
        moved.suite_name = "auth".to_string();
        assert_eq!(apply_execution(&mut build, &mut moved), Applied::Replaced);

        assert!(build.suite("login").is_none());
        assert_eq!(build.suite("auth").unwrap().histogram.fail, 1);
        assert_eq!(build.histogram.total(), 1);
    }

    #[test]
    fn test_rollup_trait_on_every_level() {
        let mut build = Build::new("b");
        let mut exec = execution(&build, "s", vec![step(Outcome::Error, 3)]);
        assert_eq!(exec.rollup().status, Outcome::Error);
        assert_eq!(exec.actions[0].rollup().histogram.error, 1);

        apply_execution(&mut build, &mut exec);
        assert_eq!(build.suites[0].rollup().status, Outcome::Error);
        assert_eq!(build.rollup().histogram.error, 1);
        assert_eq!(build.rollup().start, Some(ts(3)));
    }
}
