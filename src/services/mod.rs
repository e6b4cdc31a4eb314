//! Business logic services.

pub mod aggregator;
pub mod baseline_matcher;
pub mod baselines;
pub mod builds;
pub mod diff_cache;
pub mod dynamic_baseline;
pub mod fingerprint;
pub mod locks;
pub mod pixel_diff;
pub mod screenshots;
pub mod storage;

pub use diff_cache::DiffCache;
pub use locks::{BuildLocks, KeyedLocks};
pub use storage::{BlobStore, LocalStorage, S3Storage};
