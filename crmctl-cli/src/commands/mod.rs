//! Command implementations for the crmctl CLI

pub mod config;
pub mod jobs;
pub mod seed;
pub mod serve;

// Re-export dispatcher functions for flat access from main.rs
pub use config::run_config;
pub use jobs::{run_job, run_jobs};
pub use seed::run_seed;
pub use serve::run_serve;
