//! Result export: sweep results to CSV/JSON, generator validations appended to CSV.

use std::path::Path;

use crate::metrics::SimulationResult;
use crate::parameters::ParameterSet;
use crate::validation::GeneratorValidation;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/validation_log.rs"]
mod validation_log;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export simulation results to JSON format (an array of result objects).
///
/// # Errors
///
/// Returns an error if file creation or JSON serialization fails.
pub fn export_to_json(
    results: &[SimulationResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::write_results_json(results, file)
}

/// Export simulation results with parameters to CSV format.
///
/// Parameters and results are paired by index (`results[i]` belongs to `parameter_sets[i]`).
///
/// # Errors
///
/// Returns an error if there is nothing to export, the lengths differ, or writing fails.
pub fn export_to_csv(
    results: &[SimulationResult],
    parameter_sets: &[ParameterSet],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(results)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(results, parameter_sets, file)
}

/// Append generator validations to a CSV log, writing the header only when the
/// file is new or empty. Each row is stamped with the current UTC time.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or written.
pub fn append_validation_csv(
    validations: &[GeneratorValidation],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::open_for_append(path)?;
    validation_log::append_validation_impl(validations, file, chrono::Utc::now())
}
