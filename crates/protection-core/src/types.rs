//! Core domain types for pair protections.

pub mod lock;
pub mod timeframe;
pub mod trade;

pub use lock::*;
pub use timeframe::*;
pub use trade::*;
