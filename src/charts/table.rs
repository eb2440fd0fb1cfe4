//! Renderer-agnostic data tables handed to chart consumers.

use crate::models::{
    CancellationRow, DestAirlineFlights, FlightRecord, MonthlyAirlineMean, StateFlights,
};
use serde::Serialize;
use std::fmt;

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Number(f64),
    Null,
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Number(n) => Some(*n),
            Cell::Text(_) | Cell::Null => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Number(n) => write!(f, "{:.2}", n),
            Cell::Null => write!(f, ""),
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Null)
    }
}

impl From<Option<&String>> for Cell {
    fn from(value: Option<&String>) -> Self {
        value.map(|s| Cell::Text(s.clone())).unwrap_or(Cell::Null)
    }
}

/// A named, ordered table: one chart's worth of data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl DataTable {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Values of one column, by header name.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }

    /// Largest numeric value of a column, if any.
    pub fn column_max(&self, name: &str) -> Option<f64> {
        self.column(name)?
            .into_iter()
            .filter_map(Cell::as_f64)
            .fold(None, |max, v| Some(max.map_or(v, |m: f64| m.max(v))))
    }

    fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }
}

pub(crate) fn cancellation_table(rows: &[CancellationRow]) -> DataTable {
    let mut table = DataTable::new("cancellation", &["Month", "CancellationCode", "Flights"]);
    for row in rows {
        table.push(vec![
            Cell::Integer(row.month.into()),
            Cell::Text(row.cancellation_code.clone()),
            Cell::Number(row.flights),
        ]);
    }
    table
}

pub(crate) fn monthly_mean_table(
    name: &str,
    value_column: &str,
    rows: &[MonthlyAirlineMean],
) -> DataTable {
    let mut table = DataTable::new(name, &["Month", "Reporting_Airline", value_column]);
    for row in rows {
        table.push(vec![
            Cell::Integer(row.month.into()),
            Cell::Text(row.reporting_airline.clone()),
            row.value.into(),
        ]);
    }
    table
}

pub(crate) fn diversions_table(rows: &[FlightRecord]) -> DataTable {
    let mut table = DataTable::new(
        "diversions",
        &[
            "Month",
            "Reporting_Airline",
            "OriginState",
            "DestState",
            "Flights",
            "DivAirportLandings",
            "Div1Airport",
            "Div1TailNum",
            "Div2Airport",
            "Div2TailNum",
        ],
    );
    for row in rows {
        table.push(vec![
            Cell::Integer(row.month.into()),
            row.reporting_airline.as_ref().into(),
            row.origin_state.as_ref().into(),
            row.dest_state.as_ref().into(),
            row.flights.into(),
            row.div_airport_landings.into(),
            row.div1_airport.as_ref().into(),
            row.div1_tail_num.as_ref().into(),
            row.div2_airport.as_ref().into(),
            row.div2_tail_num.as_ref().into(),
        ]);
    }
    table
}

pub(crate) fn origin_states_table(rows: &[StateFlights]) -> DataTable {
    let mut table = DataTable::new("origin_states", &["OriginState", "Flights"]);
    for row in rows {
        table.push(vec![Cell::Text(row.state.clone()), Cell::Number(row.flights)]);
    }
    table
}

pub(crate) fn dest_by_airline_table(rows: &[DestAirlineFlights]) -> DataTable {
    let mut table = DataTable::new(
        "dest_by_airline",
        &["DestState", "Reporting_Airline", "Flights"],
    );
    for row in rows {
        table.push(vec![
            Cell::Text(row.dest_state.clone()),
            Cell::Text(row.reporting_airline.clone()),
            Cell::Number(row.flights),
        ]);
    }
    table
}
