use std::fs::File;
use std::io::{BufWriter, Write};

use crate::metrics::SimulationResult;

/// Pretty-printed array of results, newline-terminated.
pub(crate) fn write_results_json(
    results: &[SimulationResult],
    file: File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, results)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
