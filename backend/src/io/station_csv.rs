//! Station profile loader
//!
//! Expected layout:
//!
//! ```text
//! station_id,station_name,rentalrate_00:00,...,returnrate_23:30,...,capacity
//! ```
//!
//! Column 0 is the id, column 1 the name, the last column the capacity.
//! Any column whose header contains `rentalrate_` or `returnrate_` followed
//! by an `HH:MM` label feeds the matching half-hour slot. Other columns are
//! ignored.
//!
//! Bad rows are logged and skipped; only an unreadable source or a header
//! without the three fixed columns fails the whole load.

use crate::core::time::slot_from_clock;
use crate::models::station::StationProfile;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

const RENTAL_PREFIX: &str = "rentalrate_";
const RETURN_PREFIX: &str = "returnrate_";

/// Errors that abort a load
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read header: {0}")]
    Csv(#[from] csv::Error),

    #[error("Header needs id, name and capacity columns, found {0} column(s)")]
    InvalidHeader(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RateKind {
    Rental,
    Return,
}

#[derive(Debug, Clone, Copy)]
struct RateColumn {
    index: usize,
    kind: RateKind,
    slot: usize,
}

/// Load stations from a CSV file
pub fn load_stations(path: impl AsRef<Path>) -> Result<Vec<StationProfile>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_stations(file)
}

/// Load stations from any CSV source
///
/// # Example
/// ```
/// use station_udf_core_rs::io::read_stations;
///
/// let data = "\
/// id,name,rentalrate_08:00,returnrate_08:00,capacity
/// S1,Main St,0.5,0.25,12
/// ";
/// let stations = read_stations(data.as_bytes()).unwrap();
/// assert_eq!(stations[0].capacity(), 12);
/// assert_eq!(stations[0].rental_rate(16), 0.5);
/// assert_eq!(stations[0].return_rate(16), 0.25);
/// ```
pub fn read_stations<R: Read>(source: R) -> Result<Vec<StationProfile>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    if headers.len() < 3 {
        return Err(LoadError::InvalidHeader(headers.len()));
    }
    let columns = rate_columns(&headers);

    let mut stations = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Unreadable row. Skipping.");
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.len() != headers.len() {
            warn!(
                line,
                expected = headers.len(),
                found = record.len(),
                "Row has incorrect number of fields. Skipping."
            );
            continue;
        }

        match parse_station(&record, &columns) {
            Ok(station) => stations.push(station),
            Err(reason) => warn!(line, %reason, "Invalid row. Skipping."),
        }
    }

    Ok(stations)
}

fn rate_columns(headers: &csv::StringRecord) -> Vec<RateColumn> {
    let mut columns = Vec::new();

    for (index, header) in headers.iter().enumerate() {
        let (kind, label) = if let Some(pos) = header.find(RENTAL_PREFIX) {
            (RateKind::Rental, &header[pos + RENTAL_PREFIX.len()..])
        } else if let Some(pos) = header.find(RETURN_PREFIX) {
            (RateKind::Return, &header[pos + RETURN_PREFIX.len()..])
        } else {
            continue;
        };

        // Tolerate trailing seconds ("08:30:00")
        let clock = label.get(..5).unwrap_or(label);
        match slot_from_clock(clock) {
            Some(slot) => columns.push(RateColumn { index, kind, slot }),
            None => warn!(column = header, "Rate column has no valid HH:MM label. Ignoring."),
        }
    }

    columns
}

fn parse_station(record: &csv::StringRecord, columns: &[RateColumn]) -> Result<StationProfile, String> {
    let field = move |index: usize| record.get(index).unwrap_or_default();

    let capacity_field = field(record.len() - 1);
    let capacity: i64 = capacity_field
        .parse()
        .map_err(|_| format!("capacity {:?} is not an integer", capacity_field))?;

    let mut station = StationProfile::new(field(0), field(1), capacity);
    for column in columns {
        let raw = field(column.index);
        let rate: f64 = raw
            .parse()
            .map_err(|_| format!("rate {:?} in column {} is not a number", raw, column.index))?;

        let stored = match column.kind {
            RateKind::Rental => station.set_rental_rate(column.slot, rate),
            RateKind::Return => station.set_return_rate(column.slot, rate),
        };
        stored.map_err(|e| e.to_string())?;
    }

    Ok(station)
}
