//! SeaORM entity definitions for PostgreSQL database.

pub mod baseline;
pub mod build;
pub mod execution;
pub mod screenshot;
