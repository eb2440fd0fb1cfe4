//! Data models for the flight dashboard.
//!
//! This module contains the core data structures used throughout
//! the application for representing flight records, report selections
//! and the rows produced by aggregation.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One row of the airline dataset.
///
/// Column names follow the source CSV header. Only `Year` and `Month` are
/// required; in any other column an empty cell or an NA token such as
/// `NA` or `null` is a missing value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlightRecord {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(
        rename = "Reporting_Airline",
        alias = "ReportingAirline",
        default,
        deserialize_with = "na_text"
    )]
    pub reporting_airline: Option<String>,
    #[serde(rename = "OriginState", default, deserialize_with = "na_text")]
    pub origin_state: Option<String>,
    #[serde(rename = "DestState", default, deserialize_with = "na_text")]
    pub dest_state: Option<String>,
    /// Number of flights represented by the row.
    #[serde(rename = "Flights", default, deserialize_with = "na_number")]
    pub flights: Option<f64>,
    /// Air time in minutes.
    #[serde(rename = "AirTime", default, deserialize_with = "na_number")]
    pub air_time: Option<f64>,
    /// Cancellation reason code; missing when the flight was not cancelled.
    #[serde(rename = "CancellationCode", default, deserialize_with = "na_text")]
    pub cancellation_code: Option<String>,
    #[serde(rename = "DivAirportLandings", default, deserialize_with = "na_number")]
    pub div_airport_landings: Option<f64>,
    #[serde(rename = "CarrierDelay", default, deserialize_with = "na_number")]
    pub carrier_delay: Option<f64>,
    #[serde(rename = "WeatherDelay", default, deserialize_with = "na_number")]
    pub weather_delay: Option<f64>,
    #[serde(rename = "NASDelay", default, deserialize_with = "na_number")]
    pub nas_delay: Option<f64>,
    #[serde(rename = "SecurityDelay", default, deserialize_with = "na_number")]
    pub security_delay: Option<f64>,
    #[serde(rename = "LateAircraftDelay", default, deserialize_with = "na_number")]
    pub late_aircraft_delay: Option<f64>,
    // Diversion identifiers stay text: airport codes and tail numbers such
    // as "0123" or "1E7" must not go through a numeric parse.
    #[serde(rename = "Div1Airport", default, deserialize_with = "na_text")]
    pub div1_airport: Option<String>,
    #[serde(rename = "Div1TailNum", default, deserialize_with = "na_text")]
    pub div1_tail_num: Option<String>,
    #[serde(rename = "Div2Airport", default, deserialize_with = "na_text")]
    pub div2_airport: Option<String>,
    #[serde(rename = "Div2TailNum", default, deserialize_with = "na_text")]
    pub div2_tail_num: Option<String>,
}

/// Cell values read as missing, the same set dataframe CSV readers treat
/// as NA by default.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_na(value: &str) -> bool {
    NA_TOKENS.contains(&value.trim())
}

fn na_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|v| !is_na(v)))
}

fn na_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !is_na(&raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid number {:?}", raw))),
        _ => Ok(None),
    }
}

/// Which report to build for a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Yearly airline performance report (five charts).
    #[default]
    Performance,
    /// Yearly airline delay report (one composite chart).
    Delay,
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::Performance => write!(f, "Yearly Airline Performance Report"),
            ReportType::Delay => write!(f, "Yearly Airline Delay Report"),
        }
    }
}

impl ReportType {
    /// Short machine name, as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Performance => "performance",
            ReportType::Delay => "delay",
        }
    }
}

impl FromStr for ReportType {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "opt1" | "performance" => Ok(ReportType::Performance),
            "opt2" | "delay" => Ok(ReportType::Delay),
            other => Err(SelectionError::UnknownReportType(other.to_string())),
        }
    }
}

/// Errors raised while parsing a report selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown report type: {0:?} (expected performance/OPT1 or delay/OPT2)")]
    UnknownReportType(String),

    #[error("year is not an integer: {0:?}")]
    InvalidYear(String),

    #[error("expected `<report> <year>`, got {0:?}")]
    Malformed(String),
}

/// The input that drives one recomputation of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSelection {
    pub report_type: ReportType,
    pub year: i32,
}

impl ReportSelection {
    pub fn new(report_type: ReportType, year: i32) -> Self {
        Self { report_type, year }
    }

    /// Parse a selection from its two raw control values.
    pub fn parse(report: &str, year: &str) -> Result<Self, SelectionError> {
        let report_type = report.parse()?;
        let year = year
            .trim()
            .parse()
            .map_err(|_| SelectionError::InvalidYear(year.trim().to_string()))?;
        Ok(Self { report_type, year })
    }

    /// Parse a `<report> <year>` line as sent by the interactive session.
    pub fn parse_line(line: &str) -> Result<Self, SelectionError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [report, year] => Self::parse(report, year),
            _ => Err(SelectionError::Malformed(line.trim().to_string())),
        }
    }
}

impl fmt::Display for ReportSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.report_type.as_str(), self.year)
    }
}

/// Flights summed per (month, cancellation code).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancellationRow {
    pub month: u32,
    pub cancellation_code: String,
    pub flights: f64,
}

/// A mean value per (month, airline).
///
/// `value` is `None` when every contributing record was missing the field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAirlineMean {
    pub month: u32,
    pub reporting_airline: String,
    pub value: Option<f64>,
}

/// Flights summed per origin state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateFlights {
    pub state: String,
    pub flights: f64,
}

/// Flights summed per (destination state, airline).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestAirlineFlights {
    pub dest_state: String,
    pub reporting_airline: String,
    pub flights: f64,
}

/// Result tables of the performance report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PerformanceTables {
    pub cancellation: Vec<CancellationRow>,
    pub airtime: Vec<MonthlyAirlineMean>,
    pub diversions: Vec<FlightRecord>,
    pub origin_states: Vec<StateFlights>,
    pub dest_by_airline: Vec<DestAirlineFlights>,
}

impl PerformanceTables {
    pub fn is_empty(&self) -> bool {
        self.cancellation.is_empty()
            && self.airtime.is_empty()
            && self.diversions.is_empty()
            && self.origin_states.is_empty()
            && self.dest_by_airline.is_empty()
    }
}

/// Result tables of the delay report, one mean per delay cause.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DelayTables {
    pub carrier: Vec<MonthlyAirlineMean>,
    pub weather: Vec<MonthlyAirlineMean>,
    pub nas: Vec<MonthlyAirlineMean>,
    pub security: Vec<MonthlyAirlineMean>,
    pub late_aircraft: Vec<MonthlyAirlineMean>,
}

impl DelayTables {
    pub fn is_empty(&self) -> bool {
        self.carrier.is_empty()
            && self.weather.is_empty()
            && self.nas.is_empty()
            && self.security.is_empty()
            && self.late_aircraft.is_empty()
    }
}
