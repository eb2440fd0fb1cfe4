//! Aggregation engine.
//!
//! Turns the year subset of the dataset into chart-ready tables.

pub mod aggregator;

pub use aggregator::*;
