//! Report rendering for the dashboard, record form and trends views.

pub mod format;
pub mod generator;

pub use generator::*;
