//! Chart specifications and report dispatch.
//!
//! A dashboard always has five positional slots (`plot1`..`plot5`). The
//! performance report fills all five; the delay report fills the first
//! with one composite scatter chart and leaves the other four empty.

mod table;

pub use table::DataTable;

use crate::analysis::{compute_delay_tables, compute_performance_tables, filter_by_year};
use crate::dataset::Dataset;
use crate::models::{DelayTables, PerformanceTables, ReportSelection, ReportType};
use serde::Serialize;
use table::{
    cancellation_table, dest_by_airline_table, diversions_table, monthly_mean_table,
    origin_states_table,
};
use tracing::{debug, info, warn};

/// Number of chart slots in a dashboard.
pub const SLOT_COUNT: usize = 5;

const TRANSPARENT: &str = "rgba(0, 0, 0, 0)";

/// How the data of a chart maps onto its visual channels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mark {
    Bar {
        x: String,
        y: String,
        color: String,
    },
    Line {
        x: String,
        y: String,
        color: String,
    },
    Pie {
        values: String,
        names: String,
    },
    Choropleth {
        locations: String,
        color: String,
        hover_data: Vec<String>,
        location_mode: String,
        color_scale: String,
        range_color: [f64; 2],
    },
    Treemap {
        path: Vec<String>,
        values: String,
        color: String,
        color_scale: String,
    },
    Scatter {
        x: String,
        y: String,
        color: String,
    },
}

impl Mark {
    pub fn name(&self) -> &'static str {
        match self {
            Mark::Bar { .. } => "bar",
            Mark::Line { .. } => "line",
            Mark::Pie { .. } => "pie",
            Mark::Choropleth { .. } => "choropleth",
            Mark::Treemap { .. } => "treemap",
            Mark::Scatter { .. } => "scatter",
        }
    }
}

/// An extra marker series drawn on top of a base chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub name: String,
    pub color: String,
    pub x: String,
    pub y: String,
    pub data: DataTable,
}

/// Figure-level styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub plot_bgcolor: String,
    pub paper_bgcolor: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            plot_bgcolor: TRANSPARENT.to_string(),
            paper_bgcolor: TRANSPARENT.to_string(),
        }
    }
}

/// A complete, renderer-agnostic chart description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub mark: Mark,
    pub data: DataTable,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overlays: Vec<Overlay>,
    pub layout: Layout,
}

impl ChartSpec {
    fn new(title: &str, mark: Mark, data: DataTable) -> Self {
        Self {
            title: title.to_string(),
            mark,
            data,
            overlays: Vec::new(),
            layout: Layout::default(),
        }
    }
}

/// One positional output of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "slot", rename_all = "snake_case")]
pub enum ChartSlot {
    Chart(ChartSpec),
    Empty,
}

impl ChartSlot {
    pub fn chart(&self) -> Option<&ChartSpec> {
        match self {
            ChartSlot::Chart(spec) => Some(spec),
            ChartSlot::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChartSlot::Empty)
    }
}

/// The five chart slots produced for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// `None` when the selection could not be parsed.
    pub selection: Option<ReportSelection>,
    pub slots: [ChartSlot; SLOT_COUNT],
}

impl Dashboard {
    /// Five empty placeholders.
    pub fn blank() -> Self {
        Self {
            selection: None,
            slots: std::array::from_fn(|_| ChartSlot::Empty),
        }
    }

    /// Number of slots holding a chart.
    pub fn chart_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }
}

/// Compute the dashboard for a selection.
///
/// Years outside the dataset are not rejected: they produce charts over
/// empty tables.
pub fn build_dashboard(dataset: &Dataset, selection: ReportSelection) -> Dashboard {
    let subset = filter_by_year(dataset.records(), selection.year);
    if subset.is_empty() {
        warn!("No records for year {}; charts will be empty", selection.year);
    }
    debug!("Year {} subset: {} records", selection.year, subset.len());

    let slots = match selection.report_type {
        ReportType::Performance => {
            let tables = compute_performance_tables(&subset);
            if tables.is_empty() {
                debug!("All performance tables are empty");
            }
            performance_charts(&tables)
        }
        ReportType::Delay => {
            let tables = compute_delay_tables(&subset);
            if tables.is_empty() {
                debug!("All delay tables are empty");
            }
            delay_charts(&tables)
        }
    };

    info!("Rendered {} ({} records)", selection, subset.len());

    Dashboard {
        selection: Some(selection),
        slots,
    }
}

/// Compute the dashboard from raw control values, failing closed to a blank
/// dashboard when they do not parse.
pub fn build_from_raw(dataset: &Dataset, report: &str, year: &str) -> Dashboard {
    match ReportSelection::parse(report, year) {
        Ok(selection) => build_dashboard(dataset, selection),
        Err(e) => {
            warn!("Ignoring selection: {}", e);
            Dashboard::blank()
        }
    }
}

fn performance_charts(tables: &PerformanceTables) -> [ChartSlot; SLOT_COUNT] {
    let bar = ChartSpec::new(
        "Monthly Flight Cancellation",
        Mark::Bar {
            x: "Month".to_string(),
            y: "Flights".to_string(),
            color: "CancellationCode".to_string(),
        },
        cancellation_table(&tables.cancellation),
    );

    let line = ChartSpec::new(
        "Average monthly flight time (minutes) by airline",
        Mark::Line {
            x: "Month".to_string(),
            y: "AirTime".to_string(),
            color: "Reporting_Airline".to_string(),
        },
        monthly_mean_table("airtime", "AirTime", &tables.airtime),
    );

    let pie = ChartSpec::new(
        "% of flights by reporting airline",
        Mark::Pie {
            values: "Flights".to_string(),
            names: "Reporting_Airline".to_string(),
        },
        diversions_table(&tables.diversions),
    );

    let origin = origin_states_table(&tables.origin_states);
    let max_flights = origin.column_max("Flights").unwrap_or(0.0);
    let map = ChartSpec::new(
        "Number of flights from each origin state",
        Mark::Choropleth {
            locations: "OriginState".to_string(),
            color: "Flights".to_string(),
            hover_data: vec!["OriginState".to_string(), "Flights".to_string()],
            location_mode: "USA-states".to_string(),
            color_scale: "GnBu".to_string(),
            range_color: [0.0, max_flights],
        },
        origin,
    );

    let tree = ChartSpec::new(
        "Flight count by airline to destination state",
        Mark::Treemap {
            path: vec!["DestState".to_string(), "Reporting_Airline".to_string()],
            values: "Flights".to_string(),
            color: "Flights".to_string(),
            color_scale: "RdBu".to_string(),
        },
        dest_by_airline_table(&tables.dest_by_airline),
    );

    [
        ChartSlot::Chart(bar),
        ChartSlot::Chart(line),
        ChartSlot::Chart(pie),
        ChartSlot::Chart(map),
        ChartSlot::Chart(tree),
    ]
}

fn delay_overlay(name: &str, color: &str, column: &str, table: DataTable) -> Overlay {
    Overlay {
        name: name.to_string(),
        color: color.to_string(),
        x: "Month".to_string(),
        y: column.to_string(),
        data: table,
    }
}

fn delay_charts(tables: &DelayTables) -> [ChartSlot; SLOT_COUNT] {
    let mut scatter = ChartSpec::new(
        "Average carrier delay time (minutes) by airline",
        Mark::Scatter {
            x: "Month".to_string(),
            y: "CarrierDelay".to_string(),
            color: "Reporting_Airline".to_string(),
        },
        monthly_mean_table("carrier_delay", "CarrierDelay", &tables.carrier),
    );

    scatter.overlays = vec![
        delay_overlay(
            "Weather",
            "blue",
            "WeatherDelay",
            monthly_mean_table("weather_delay", "WeatherDelay", &tables.weather),
        ),
        delay_overlay(
            "NAS",
            "green",
            "NASDelay",
            monthly_mean_table("nas_delay", "NASDelay", &tables.nas),
        ),
        delay_overlay(
            "Security",
            "red",
            "SecurityDelay",
            monthly_mean_table("security_delay", "SecurityDelay", &tables.security),
        ),
        delay_overlay(
            "Late Aircraft",
            "black",
            "LateAircraftDelay",
            monthly_mean_table(
                "late_aircraft_delay",
                "LateAircraftDelay",
                &tables.late_aircraft,
            ),
        ),
    ];

    [
        ChartSlot::Chart(scatter),
        ChartSlot::Empty,
        ChartSlot::Empty,
        ChartSlot::Empty,
        ChartSlot::Empty,
    ]
}

#[cfg(test)]
mod tests {
    use super::table::Cell;
    use super::*;
    use crate::models::FlightRecord;

    fn dataset() -> Dataset {
        let record = |month: u32, airline: &str, origin: &str, landings: f64| FlightRecord {
            year: 2010,
            month,
            reporting_airline: Some(airline.to_string()),
            origin_state: Some(origin.to_string()),
            dest_state: Some("CA".to_string()),
            flights: Some(1.0),
            air_time: Some(90.0),
            div_airport_landings: Some(landings),
            carrier_delay: Some(12.0),
            weather_delay: Some(3.0),
            ..Default::default()
        };

        Dataset::new(vec![
            record(1, "AA", "TX", 0.0),
            record(1, "AA", "TX", 1.0),
            record(2, "UA", "NY", 0.0),
            FlightRecord {
                year: 2011,
                ..record(1, "DL", "GA", 0.0)
            },
        ])
    }

    #[test]
    fn test_performance_fills_all_slots() {
        let dashboard = build_dashboard(
            &dataset(),
            ReportSelection::new(ReportType::Performance, 2010),
        );

        assert_eq!(dashboard.chart_count(), SLOT_COUNT);
        let kinds: Vec<&str> = dashboard
            .slots
            .iter()
            .filter_map(ChartSlot::chart)
            .map(|c| c.mark.name())
            .collect();
        assert_eq!(kinds, vec!["bar", "line", "pie", "choropleth", "treemap"]);
    }

    #[test]
    fn test_delay_fills_one_slot() {
        let dashboard = build_dashboard(&dataset(), ReportSelection::new(ReportType::Delay, 2010));

        assert_eq!(dashboard.chart_count(), 1);
        assert!(dashboard.slots[1..].iter().all(ChartSlot::is_empty));

        let scatter = dashboard.slots[0].chart().unwrap();
        assert_eq!(scatter.mark.name(), "scatter");
        let overlays: Vec<(&str, &str)> = scatter
            .overlays
            .iter()
            .map(|o| (o.name.as_str(), o.color.as_str()))
            .collect();
        assert_eq!(
            overlays,
            vec![
                ("Weather", "blue"),
                ("NAS", "green"),
                ("Security", "red"),
                ("Late Aircraft", "black")
            ]
        );
    }

    #[test]
    fn test_choropleth_range_uses_max_flights() {
        let dashboard = build_dashboard(
            &dataset(),
            ReportSelection::new(ReportType::Performance, 2010),
        );
        let map = dashboard.slots[3].chart().unwrap();
        match &map.mark {
            Mark::Choropleth { range_color, .. } => assert_eq!(*range_color, [0.0, 2.0]),
            other => panic!("unexpected mark: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_year_gives_empty_charts() {
        let dashboard = build_dashboard(
            &dataset(),
            ReportSelection::new(ReportType::Performance, 2025),
        );

        assert_eq!(dashboard.chart_count(), SLOT_COUNT);
        assert!(dashboard
            .slots
            .iter()
            .filter_map(ChartSlot::chart)
            .all(|c| c.data.is_empty()));

        let delay = build_dashboard(&dataset(), ReportSelection::new(ReportType::Delay, 2025));
        let scatter = delay.slots[0].chart().unwrap();
        assert!(scatter.data.is_empty());
        assert!(scatter.overlays.iter().all(|o| o.data.is_empty()));
    }

    #[test]
    fn test_pie_without_diversions_is_empty() {
        let dataset = Dataset::new(vec![FlightRecord {
            year: 2010,
            month: 1,
            div_airport_landings: Some(0.0),
            ..Default::default()
        }]);
        let dashboard = build_dashboard(
            &dataset,
            ReportSelection::new(ReportType::Performance, 2010),
        );
        let pie = dashboard.slots[2].chart().unwrap();
        assert_eq!(pie.mark.name(), "pie");
        assert!(pie.data.is_empty());
    }

    #[test]
    fn test_no_rows_from_other_years() {
        let dashboard = build_dashboard(
            &dataset(),
            ReportSelection::new(ReportType::Performance, 2010),
        );
        let line = dashboard.slots[1].chart().unwrap();
        let airlines = line.data.column("Reporting_Airline").unwrap();
        assert!(!airlines.contains(&&Cell::Text("DL".to_string())));
    }

    #[test]
    fn test_malformed_selection_fails_closed() {
        let dashboard = build_from_raw(&dataset(), "OPT9", "2010");
        assert_eq!(dashboard, Dashboard::blank());

        let dashboard = build_from_raw(&dataset(), "OPT1", "20x0");
        assert_eq!(dashboard.chart_count(), 0);
        assert_eq!(dashboard.selection, None);

        let dashboard = build_from_raw(&dataset(), "OPT2", "2010");
        assert_eq!(dashboard.chart_count(), 1);
    }

    #[test]
    fn test_rebuild_is_identical() {
        let dataset = dataset();
        let selection = ReportSelection::new(ReportType::Performance, 2010);
        assert_eq!(
            build_dashboard(&dataset, selection),
            build_dashboard(&dataset, selection)
        );
    }

    #[test]
    fn test_fixture_performance_report() {
        let dataset =
            crate::dataset::parse_csv(include_str!("../../fixtures/airline_sample.csv")).unwrap();
        let dashboard = build_dashboard(
            &dataset,
            ReportSelection::new(ReportType::Performance, 2010),
        );

        let bar = dashboard.slots[0].chart().unwrap();
        assert_eq!(
            bar.data.rows,
            vec![vec![
                Cell::Integer(4),
                Cell::Text("A".to_string()),
                Cell::Number(1.0)
            ]]
        );

        let pie = dashboard.slots[2].chart().unwrap();
        assert_eq!(pie.data.len(), 1);
        assert_eq!(
            pie.data.column("Div1Airport"),
            Some(vec![&Cell::Text("TPA".to_string())])
        );

        let map = dashboard.slots[3].chart().unwrap();
        assert_eq!(
            map.data.column("OriginState"),
            Some(vec![
                &Cell::Text("AZ".to_string()),
                &Cell::Text("IL".to_string()),
                &Cell::Text("TX".to_string())
            ])
        );
    }

    #[test]
    fn test_slot_serialization() {
        let json = serde_json::to_value(Dashboard::blank()).unwrap();
        assert_eq!(json["slots"][0]["slot"], "empty");
        assert!(json["selection"].is_null());

        let dashboard = build_dashboard(&dataset(), ReportSelection::new(ReportType::Delay, 2010));
        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["slots"][0]["slot"], "chart");
        assert_eq!(json["slots"][0]["mark"]["type"], "scatter");
        assert_eq!(json["slots"][0]["layout"]["plot_bgcolor"], "rgba(0, 0, 0, 0)");
        assert_eq!(json["selection"]["report_type"], "delay");
    }
}
