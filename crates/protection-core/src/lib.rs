//! Protection Core Library
//!
//! Shared types, errors and configuration for the pair protection rules.

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
