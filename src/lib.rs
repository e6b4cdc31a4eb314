//! Visual Results Server library.
//!
//! Rolls test executions up into suite and build outcomes, matches
//! screenshots to baselines per platform and serves cached visual diffs.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
