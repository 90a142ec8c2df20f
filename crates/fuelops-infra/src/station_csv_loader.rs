//! CSV loader for station defaults
//!
//! Expected header (only `name` is required, column order is free):
//! name,going_rate,going_liters,going_formula,going_field,returning_rate,returning_liters,returning_formula,returning_field,active

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use fuelops_domain::{DirectionDefaults, LedgerField, StationConfig};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvLoaderError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid number format in row {row}, column {column}: {value}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Unknown ledger field in row {row}, column {column}: {value}")]
    InvalidField {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Missing station name in row {0}")]
    MissingName(usize),

    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

impl From<CsvLoaderError> for fuelops_types::Error {
    fn from(err: CsvLoaderError) -> Self {
        match err {
            CsvLoaderError::IoError(io) => fuelops_types::Error::Io(io),
            other => fuelops_types::Error::validation(other.to_string()),
        }
    }
}

pub fn load_stations<P: AsRef<Path>>(path: P) -> Result<Vec<StationConfig>, CsvLoaderError> {
    let file = File::open(path)?;
    parse_stations(file)
}

/// Parse station rows from any reader
pub fn parse_stations<R: std::io::Read>(input: R) -> Result<Vec<StationConfig>, CsvLoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let columns: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase(), i))
        .collect();
    if !columns.contains_key("name") {
        return Err(CsvLoaderError::MissingColumn("name".to_string()));
    }

    let mut stations = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        let row = Row {
            record: &record,
            columns: &columns,
            number: row_idx + 2,
        };

        let name = row.text("name").ok_or(CsvLoaderError::MissingName(row.number))?;
        let mut station = StationConfig::new(name);
        station.going = row.defaults("going")?;
        station.returning = row.defaults("returning")?;
        station.active = row.text("active").map_or(true, parse_flag);
        stations.push(station);
    }

    tracing::debug!(count = stations.len(), "stations parsed from CSV");
    Ok(stations)
}

struct Row<'a> {
    record: &'a csv::StringRecord,
    columns: &'a HashMap<String, usize>,
    number: usize,
}

impl Row<'_> {
    fn text(&self, column: &str) -> Option<&str> {
        self.columns
            .get(column)
            .and_then(|&i| self.record.get(i))
            .filter(|s| !s.is_empty())
    }

    fn float(&self, column: &str) -> Result<Option<f64>, CsvLoaderError> {
        self.text(column)
            .map(|value| {
                value
                    .replace(',', "")
                    .parse::<f64>()
                    .map_err(|_| CsvLoaderError::InvalidNumber {
                        row: self.number,
                        column: column.to_string(),
                        value: value.to_string(),
                    })
            })
            .transpose()
    }

    fn defaults(&self, prefix: &str) -> Result<DirectionDefaults, CsvLoaderError> {
        let field_column = format!("{prefix}_field");
        let custom_field = self
            .text(&field_column)
            .map(|value| {
                LedgerField::parse(value).ok_or_else(|| CsvLoaderError::InvalidField {
                    row: self.number,
                    column: field_column.clone(),
                    value: value.to_string(),
                })
            })
            .transpose()?;

        Ok(DirectionDefaults {
            rate: self.float(&format!("{prefix}_rate"))?,
            liters: self.float(&format!("{prefix}_liters"))?,
            formula: self.text(&format!("{prefix}_formula")).map(str::to_string),
            custom_field,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.to_lowercase().as_str(),
        "false" | "no" | "0" | "inactive" | "n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_with_optional_columns() {
        let csv = "\
name,going_rate,going_field,returning_rate,returning_liters,returning_formula,active
lake kitwe,1.42,,1.40,350,totalLiters - 900,yes
NEW DEPOT,\"1,380\",tdmGoing,,,,no
";
        let stations = parse_stations(csv.as_bytes()).unwrap();
        assert_eq!(stations.len(), 2);

        assert_eq!(stations[0].name, "LAKE KITWE");
        assert_eq!(stations[0].going.rate, Some(1.42));
        assert_eq!(stations[0].returning.liters, Some(350.0));
        assert_eq!(stations[0].returning.formula.as_deref(), Some("totalLiters - 900"));
        assert!(stations[0].active);

        assert_eq!(stations[1].going.rate, Some(1380.0));
        assert_eq!(stations[1].going.custom_field, Some(LedgerField::TdmGoing));
        assert!(!stations[1].active);
    }

    #[test]
    fn reports_row_of_bad_values() {
        let csv = "name,going_rate\nGBP DAR,abc\n";
        match parse_stations(csv.as_bytes()) {
            Err(CsvLoaderError::InvalidNumber { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "going_rate");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let csv = "name,returning_field\nX,nowhere\n";
        assert!(matches!(
            parse_stations(csv.as_bytes()),
            Err(CsvLoaderError::InvalidField { .. })
        ));
    }

    #[test]
    fn requires_a_name_column() {
        let csv = "station,going_rate\nGBP DAR,1.2\n";
        assert!(matches!(
            parse_stations(csv.as_bytes()),
            Err(CsvLoaderError::MissingColumn(_))
        ));
    }
}
