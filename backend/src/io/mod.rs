//! CSV collaborators: station input and consolidated results output

pub mod results_csv;
pub mod station_csv;

pub use results_csv::{write_results, write_results_to, OutputError};
pub use station_csv::{load_stations, read_stations, LoadError};
