//! Analysis modules.
//!
//! Per-quarter aggregation and the cross-quarter trend series built on it.

pub mod aggregator;
pub mod trends;

pub use aggregator::*;
pub use trends::*;
