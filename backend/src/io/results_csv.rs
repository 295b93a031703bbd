//! Consolidated results writer
//!
//! Header:
//!
//! ```text
//! Station ID,Station Name,Capacity,Optimal Inventory,Min UDF,UDF(0),...,UDF(maxCapacity)
//! ```
//!
//! `maxCapacity` is taken over stations that have results. Each row carries
//! UDF values up to its own station's capacity only, so rows for smaller
//! stations are shorter than the header. Consumers expecting a dense grid
//! must treat missing trailing cells as undefined.
//!
//! Failed stations get no row.

use crate::models::station::StationProfile;
use crate::orchestrator::engine::BatchReport;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors raised while writing the consolidated table
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Could not write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Write failed: {0}")]
    Write(#[from] csv::Error),

    #[error("Report has {outcomes} outcomes for {stations} stations")]
    LengthMismatch { stations: usize, outcomes: usize },
}

/// Write the consolidated table to a file, returning the number of data rows
pub fn write_results(
    path: impl AsRef<Path>,
    stations: &[StationProfile],
    report: &BatchReport,
) -> Result<usize, OutputError> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_results_to(file, stations, report)
}

/// Write the consolidated table to any sink
///
/// # Example
/// ```
/// use station_udf_core_rs::io::write_results_to;
/// use station_udf_core_rs::orchestrator::{BatchConfig, BatchOrchestrator};
/// use station_udf_core_rs::StationProfile;
///
/// let dir = tempfile::tempdir().unwrap();
/// let stations = vec![StationProfile::new("S1", "Quiet", 1)];
/// let orchestrator = BatchOrchestrator::new(BatchConfig {
///     checkpoint_dir: dir.path().to_path_buf(),
///     ..BatchConfig::default()
/// })
/// .unwrap();
/// let report = orchestrator.run(&stations).unwrap();
///
/// let mut out = Vec::new();
/// write_results_to(&mut out, &stations, &report).unwrap();
/// let text = String::from_utf8(out).unwrap();
/// assert!(text.starts_with("Station ID,Station Name,Capacity,Optimal Inventory,Min UDF,UDF(0),UDF(1)"));
/// ```
pub fn write_results_to<W: Write>(
    sink: W,
    stations: &[StationProfile],
    report: &BatchReport,
) -> Result<usize, OutputError> {
    if stations.len() != report.len() {
        return Err(OutputError::LengthMismatch {
            stations: stations.len(),
            outcomes: report.len(),
        });
    }

    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(sink);

    let max_capacity = report.max_capacity().unwrap_or(0);
    let mut header: Vec<String> = [
        "Station ID",
        "Station Name",
        "Capacity",
        "Optimal Inventory",
        "Min UDF",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend((0..=max_capacity).map(|i| format!("UDF({})", i)));
    writer.write_record(&header)?;

    let mut rows = 0;
    for (index, result) in report.resolved() {
        let station = &stations[index];
        let mut record = vec![
            station.id().to_string(),
            station.name().to_string(),
            station.capacity().to_string(),
            result.optimal_inventory().to_string(),
            result.min_udf().to_string(),
        ];
        record.extend(result.udf().iter().map(|value| value.to_string()));
        writer.write_record(&record)?;
        rows += 1;
    }
    writer.flush().map_err(csv::Error::from)?;

    let failed = report.failed_count();
    if failed > 0 {
        warn!(failed, "Stations without results were left out of the output");
    }

    Ok(rows)
}
