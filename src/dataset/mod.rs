//! In-memory flight dataset.
//!
//! The dataset is loaded once at startup and shared read-only between
//! every report computation.

mod loader;

pub use loader::{load, DataSource};

#[cfg(test)]
pub use loader::parse_csv;

use crate::models::FlightRecord;
use std::sync::Arc;

/// Immutable, cheaply clonable collection of flight records.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Arc<[FlightRecord]>,
}

impl Dataset {
    /// Freeze a list of records into a shared dataset.
    pub fn new(records: Vec<FlightRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// All records, in source order.
    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years present in the dataset, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

impl From<Vec<FlightRecord>> for Dataset {
    fn from(records: Vec<FlightRecord>) -> Self {
        Self::new(records)
    }
}
