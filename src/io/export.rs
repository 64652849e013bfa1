//! CSV export for ensemble summaries and raw run trajectories.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::ensemble::EnsembleSummary;
use crate::sim::types::RunResult;

/// Column header for the per-year summary export: mean and band edges for
/// every tracked variable.
const SUMMARY_HEADER: &str = "year,adoption_mean,adoption_lower,adoption_upper,\
                              annual_emissions_mean,annual_emissions_lower,annual_emissions_upper,\
                              cumulative_emissions_mean,cumulative_emissions_lower,cumulative_emissions_upper,\
                              temperature_mean,temperature_lower,temperature_upper,\
                              carbon_price_mean,carbon_price_lower,carbon_price_upper";

/// Column header for the raw per-run export, one row per run and year.
const RUNS_HEADER: &str = "run,year,technology_cost,annual_emissions,cumulative_emissions,\
                           temperature_anomaly,carbon_price,adoption_fraction";

/// Exports an ensemble summary to a CSV file at the given path.
///
/// Writes a header row followed by one data row per simulated year. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_summary_csv(summary: &EnsembleSummary, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_summary_csv(summary, buf)
}

/// Writes an ensemble summary as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_summary_csv(summary: &EnsembleSummary, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(SUMMARY_HEADER.split(',').map(str::trim))?;

    for year in &summary.years {
        wtr.write_record(&[
            year.year.to_string(),
            format!("{:.6}", year.adoption_fraction.mean),
            format!("{:.6}", year.adoption_fraction.lower),
            format!("{:.6}", year.adoption_fraction.upper),
            format!("{:.3}", year.annual_emissions.mean),
            format!("{:.3}", year.annual_emissions.lower),
            format!("{:.3}", year.annual_emissions.upper),
            format!("{:.3}", year.cumulative_emissions.mean),
            format!("{:.3}", year.cumulative_emissions.lower),
            format!("{:.3}", year.cumulative_emissions.upper),
            format!("{:.6}", year.temperature_anomaly.mean),
            format!("{:.6}", year.temperature_anomaly.lower),
            format!("{:.6}", year.temperature_anomaly.upper),
            format!("{:.4}", year.carbon_price.mean),
            format!("{:.4}", year.carbon_price.lower),
            format!("{:.4}", year.carbon_price.upper),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports raw run trajectories to a CSV file at the given path.
///
/// One row per run and year, in run order. Intended for offline analysis of
/// the full ensemble rather than the reduced bands.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_runs_csv(runs: &[RunResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_runs_csv(runs, buf)
}

/// Writes raw run trajectories as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_runs_csv(runs: &[RunResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(RUNS_HEADER.split(',').map(str::trim))?;

    for run in runs {
        for year in &run.years {
            wtr.write_record(&[
                run.run.to_string(),
                year.year.to_string(),
                format!("{:.4}", year.technology_cost),
                format!("{:.3}", year.annual_emissions),
                format!("{:.3}", year.cumulative_emissions),
                format!("{:.6}", year.temperature_anomaly),
                format!("{:.4}", year.carbon_price),
                format!("{:.6}", year.adoption_fraction),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
