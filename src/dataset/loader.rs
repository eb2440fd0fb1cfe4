//! Dataset ingestion from a local file or an HTTP(S) URL.

use super::Dataset;
use crate::models::FlightRecord;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading the dataset. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to download dataset from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed dataset row {row}: {source}")]
    Csv {
        row: u64,
        #[source]
        source: csv::Error,
    },

    #[error("dataset header is missing required column {0:?}")]
    MissingColumn(&'static str),
}

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// Classify a raw source string: `http://` and `https://` are URLs,
    /// everything else is a file path.
    pub fn parse(source: &str) -> Self {
        let trimmed = source.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Url(trimmed.to_string())
        } else {
            DataSource::File(PathBuf::from(trimmed))
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Load the dataset once. Shows a spinner unless `show_progress` is false.
pub async fn load(source: &DataSource, show_progress: bool) -> Result<Dataset, DatasetError> {
    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Loading dataset from {}", source));
        Some(pb)
    } else {
        None
    };

    let bytes = match fetch(source).await {
        Ok(bytes) => bytes,
        Err(e) => {
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            return Err(e);
        }
    };
    debug!("Read {} bytes from {}", bytes.len(), source);

    if let Some(ref pb) = spinner {
        pb.set_message("Parsing records");
    }
    let parsed = parse_csv(&decode_latin1(&bytes));

    if let Some(pb) = spinner {
        match &parsed {
            Ok(dataset) => pb.finish_with_message(format!("Loaded {} records", dataset.len())),
            Err(_) => pb.finish_and_clear(),
        }
    }

    let dataset = parsed?;
    info!("Loaded {} flight records from {}", dataset.len(), source);
    Ok(dataset)
}

async fn fetch(source: &DataSource) -> Result<Vec<u8>, DatasetError> {
    match source {
        DataSource::File(path) => tokio::fs::read(path).await.map_err(|source| DatasetError::Io {
            path: path.clone(),
            source,
        }),
        DataSource::Url(url) => {
            let http_err = |source| DatasetError::Http {
                url: url.clone(),
                source,
            };
            let response = reqwest::get(url.as_str())
                .await
                .and_then(|r| r.error_for_status())
                .map_err(http_err)?;
            let body = response.bytes().await.map_err(http_err)?;
            Ok(body.to_vec())
        }
    }
}

/// The source file is ISO-8859-1: every byte maps to the code point of
/// the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Parse CSV text with a header row into a dataset.
pub fn parse_csv(text: &str) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| DatasetError::Csv { row: 0, source })?
        .clone();
    for required in ["Year", "Month"] {
        if !headers.iter().any(|h| h == required) {
            return Err(DatasetError::MissingColumn(required));
        }
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<FlightRecord>().enumerate() {
        let record = row.map_err(|source| DatasetError::Csv {
            row: index as u64 + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(Dataset::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Year,Month,Reporting_Airline,OriginState,DestState,Flights,AirTime,CancellationCode,DivAirportLandings,Div1Airport,Div1TailNum
2010,3,AA,TX,CA,1.0,100.0,,0.0,,
2010,3,AA,TX,NY,1.0,,B,1.0,0123,N1E7
2011,4,UA,IL,CA,1.0,90.0,,0.0,,
";

    #[test]
    fn test_data_source_parse() {
        assert_eq!(
            DataSource::parse("https://example.com/airline_data.csv"),
            DataSource::Url("https://example.com/airline_data.csv".to_string())
        );
        assert_eq!(
            DataSource::parse("data/airline.csv"),
            DataSource::File(PathBuf::from("data/airline.csv"))
        );
    }

    #[test]
    fn test_parse_csv_missing_values() {
        let dataset = parse_csv(SAMPLE).unwrap();
        assert_eq!(dataset.len(), 3);

        let first = &dataset.records()[0];
        assert_eq!(first.year, 2010);
        assert_eq!(first.reporting_airline.as_deref(), Some("AA"));
        assert_eq!(first.cancellation_code, None);
        assert_eq!(first.air_time, Some(100.0));
        // Columns absent from the header are missing, not errors.
        assert_eq!(first.carrier_delay, None);

        let second = &dataset.records()[1];
        assert_eq!(second.air_time, None);
        assert_eq!(second.cancellation_code.as_deref(), Some("B"));
    }

    #[test]
    fn test_na_tokens_are_missing() {
        let text = "\
Year,Month,Reporting_Airline,OriginState,Flights,AirTime,CarrierDelay,DivAirportLandings,Div1Airport
2010,1,AA,TX,1.0,NA,N/A,0,null
2010,1,AA,NULL,1.0,NaN,#N/A,,NA
2010,2,n/a,CA,1.0,95.5,12.0,nan,<NA>
";
        let dataset = parse_csv(text).unwrap();
        assert_eq!(dataset.len(), 3);

        let first = &dataset.records()[0];
        assert_eq!(first.air_time, None);
        assert_eq!(first.carrier_delay, None);
        assert_eq!(first.div_airport_landings, Some(0.0));
        assert_eq!(first.div1_airport, None);

        let second = &dataset.records()[1];
        assert_eq!(second.origin_state, None);
        assert_eq!(second.air_time, None);
        assert_eq!(second.div_airport_landings, None);

        let third = &dataset.records()[2];
        assert_eq!(third.reporting_airline, None);
        assert_eq!(third.air_time, Some(95.5));
        assert_eq!(third.div1_airport, None);
    }

    #[test]
    fn test_non_numeric_value_is_an_error() {
        let err = parse_csv("Year,Month,AirTime\n2010,1,fast\n").unwrap_err();
        assert!(matches!(err, DatasetError::Csv { row: 1, .. }));
    }

    #[test]
    fn test_diversion_identifiers_stay_text() {
        let dataset = parse_csv(SAMPLE).unwrap();
        let diverted = &dataset.records()[1];
        assert_eq!(diverted.div1_airport.as_deref(), Some("0123"));
        assert_eq!(diverted.div1_tail_num.as_deref(), Some("N1E7"));
    }

    #[test]
    fn test_reporting_airline_alias() {
        let text = "Year,Month,ReportingAirline,Flights\n2015,7,DL,1.0\n";
        let dataset = parse_csv(text).unwrap();
        assert_eq!(dataset.records()[0].reporting_airline.as_deref(), Some("DL"));
    }

    #[test]
    fn test_missing_required_column() {
        let err = parse_csv("Month,Flights\n1,1.0\n").unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn("Year")));
    }

    #[test]
    fn test_malformed_row_reports_row_number() {
        let err = parse_csv("Year,Month\n2010,1\nnot-a-year,2\n").unwrap_err();
        assert!(matches!(err, DatasetError::Csv { row: 2, .. }));
    }

    #[test]
    fn test_parse_fixture() {
        let dataset = parse_csv(include_str!("../../fixtures/airline_sample.csv")).unwrap();
        assert_eq!(dataset.len(), 8);
        assert_eq!(dataset.years(), vec![2010, 2011, 2012]);

        let last = &dataset.records()[7];
        assert_eq!(last.reporting_airline.as_deref(), Some("US"));
        assert_eq!(last.div1_airport.as_deref(), Some("0123"));
        assert_eq!(last.div2_airport, None);
    }

    #[test]
    fn test_decode_latin1() {
        assert_eq!(decode_latin1(&[0x53, 0xE3, 0x6F]), "São");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = DataSource::File(file.path().to_path_buf());
        let dataset = tokio_test::block_on(load(&source, false)).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.years(), vec![2010, 2011]);
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let source = DataSource::File(PathBuf::from("/nonexistent/airline_data.csv"));
        let err = tokio_test::block_on(load(&source, false)).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
