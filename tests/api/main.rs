//! HTTP-level tests against an in-memory store and a temporary artifact directory.

mod baselines;
mod builds;
mod common;
mod diffs;
mod screenshots;
