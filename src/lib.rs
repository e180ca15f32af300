//! Pair protections
//!
//! Root crate that provides benchmark and integration test access to the
//! workspace crates. For actual functionality, use the crates directly:
//!
//! - `protection-core`: trade and lock types, errors, configuration
//! - `protections`: the protection trait, host seams and the cooldown rule
//! - `protection-check`: CLI dry-run of configured protections

// Re-export for benchmarks
pub use protection_core as core;
pub use protections as rules;
