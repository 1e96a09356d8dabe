//! CSV export of accumulated simulation results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::market::SimulationResult;

/// Column header for the results CSV export.
const HEADER: &str = "simulation,iteration,scenario,microgrid_bill,peak_load_kw,converged";

/// Exports run results to a CSV file at the given path.
///
/// Writes a header row followed by one data row per (simulation,
/// iteration) pair. Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &[SimulationResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes run results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &[SimulationResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for result in results {
        for (iteration, snapshot) in result.snapshots.iter().enumerate() {
            wtr.write_record(&[
                result.simulation.to_string(),
                iteration.to_string(),
                snapshot.scenario_summary(),
                format!("{:.4}", snapshot.microgrid_bill),
                format!("{:.4}", snapshot.peak_load_kw()),
                result.converged.to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
