//! Year filtering and group-by aggregation.
//!
//! Everything here is a pure function of its input: tables are rebuilt
//! from scratch for every selection and nothing is cached.

use crate::models::{
    CancellationRow, DelayTables, DestAirlineFlights, FlightRecord, MonthlyAirlineMean,
    PerformanceTables, StateFlights,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Running mean that skips missing values.
#[derive(Debug, Default, Clone, Copy)]
struct MeanAcc {
    sum: f64,
    count: usize,
}

impl MeanAcc {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Records of one year, in input order. No range check: an unknown year
/// just yields an empty subset.
pub fn filter_by_year(records: &[FlightRecord], year: i32) -> Vec<&FlightRecord> {
    records.iter().filter(|r| r.year == year).collect()
}

/// Sum `value` per key. Records with a missing key form no group; missing
/// values add nothing.
fn group_sum<K, FK, FV>(subset: &[&FlightRecord], key: FK, value: FV) -> BTreeMap<K, f64>
where
    K: Ord,
    FK: Fn(&FlightRecord) -> Option<K>,
    FV: Fn(&FlightRecord) -> Option<f64>,
{
    let mut groups: BTreeMap<K, f64> = BTreeMap::new();

    for record in subset {
        if let Some(k) = key(*record) {
            let total = groups.entry(k).or_default();
            if let Some(v) = value(*record).filter(|v| !v.is_nan()) {
                *total += v;
            }
        }
    }

    groups
}

/// Mean of `value` per key, skipping missing values.
fn group_mean<K, FK, FV>(subset: &[&FlightRecord], key: FK, value: FV) -> BTreeMap<K, Option<f64>>
where
    K: Ord,
    FK: Fn(&FlightRecord) -> Option<K>,
    FV: Fn(&FlightRecord) -> Option<f64>,
{
    let mut groups: BTreeMap<K, MeanAcc> = BTreeMap::new();

    for record in subset {
        if let Some(k) = key(*record) {
            groups.entry(k).or_default().push(value(*record));
        }
    }

    groups.into_iter().map(|(k, acc)| (k, acc.mean())).collect()
}

fn month_airline(record: &FlightRecord) -> Option<(u32, String)> {
    record
        .reporting_airline
        .as_ref()
        .map(|airline| (record.month, airline.clone()))
}

/// Mean of one field per (month, airline).
pub fn monthly_airline_mean<F>(subset: &[&FlightRecord], value: F) -> Vec<MonthlyAirlineMean>
where
    F: Fn(&FlightRecord) -> Option<f64>,
{
    group_mean(subset, month_airline, value)
        .into_iter()
        .map(|((month, reporting_airline), value)| MonthlyAirlineMean {
            month,
            reporting_airline,
            value,
        })
        .collect()
}

/// Flights per (month, cancellation code).
pub fn cancellation_counts(subset: &[&FlightRecord]) -> Vec<CancellationRow> {
    group_sum(
        subset,
        |r| r.cancellation_code.clone().map(|code| (r.month, code)),
        |r| r.flights,
    )
    .into_iter()
    .map(|((month, cancellation_code), flights)| CancellationRow {
        month,
        cancellation_code,
        flights,
    })
    .collect()
}

/// Rows that landed at a diversion airport. A missing landing count is
/// not equal to zero and is kept.
pub fn diverted_flights(subset: &[&FlightRecord]) -> Vec<FlightRecord> {
    subset
        .iter()
        .filter(|r| r.div_airport_landings != Some(0.0))
        .map(|r| (*r).clone())
        .collect()
}

/// Flights per origin state.
pub fn origin_state_counts(subset: &[&FlightRecord]) -> Vec<StateFlights> {
    group_sum(subset, |r| r.origin_state.clone(), |r| r.flights)
        .into_iter()
        .map(|(state, flights)| StateFlights { state, flights })
        .collect()
}

/// Flights per (destination state, airline).
pub fn dest_airline_counts(subset: &[&FlightRecord]) -> Vec<DestAirlineFlights> {
    group_sum(
        subset,
        |r| match (&r.dest_state, &r.reporting_airline) {
            (Some(state), Some(airline)) => Some((state.clone(), airline.clone())),
            _ => None,
        },
        |r| r.flights,
    )
    .into_iter()
    .map(|((dest_state, reporting_airline), flights)| DestAirlineFlights {
        dest_state,
        reporting_airline,
        flights,
    })
    .collect()
}

/// Build the five tables of the yearly performance report.
pub fn compute_performance_tables(subset: &[&FlightRecord]) -> PerformanceTables {
    let tables = PerformanceTables {
        cancellation: cancellation_counts(subset),
        airtime: monthly_airline_mean(subset, |r: &FlightRecord| r.air_time),
        diversions: diverted_flights(subset),
        origin_states: origin_state_counts(subset),
        dest_by_airline: dest_airline_counts(subset),
    };

    debug!(
        "Performance tables: {} cancellation, {} airtime, {} diversions, {} origin, {} dest rows",
        tables.cancellation.len(),
        tables.airtime.len(),
        tables.diversions.len(),
        tables.origin_states.len(),
        tables.dest_by_airline.len()
    );

    tables
}

/// Build the five mean-delay tables of the yearly delay report.
pub fn compute_delay_tables(subset: &[&FlightRecord]) -> DelayTables {
    let tables = DelayTables {
        carrier: monthly_airline_mean(subset, |r: &FlightRecord| r.carrier_delay),
        weather: monthly_airline_mean(subset, |r: &FlightRecord| r.weather_delay),
        nas: monthly_airline_mean(subset, |r: &FlightRecord| r.nas_delay),
        security: monthly_airline_mean(subset, |r: &FlightRecord| r.security_delay),
        late_aircraft: monthly_airline_mean(subset, |r: &FlightRecord| r.late_aircraft_delay),
    };

    debug!("Delay tables: {} (month, airline) groups", tables.carrier.len());

    tables
}
