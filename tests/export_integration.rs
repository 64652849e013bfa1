//! End-to-end export: simulate, reduce, and write both CSV schemas.

use transition_sim::config::ScenarioConfig;
use transition_sim::io::export::{write_runs_csv, write_summary_csv};
use transition_sim::sim::ensemble::EnsembleSummary;
use transition_sim::sim::monte_carlo::run_ensemble;

/// Minimal scenario for pipeline plumbing tests (60 households, 6 firms,
/// 8 runs, 10 years).
fn tiny_scenario() -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.runs = 8;
    cfg.simulation.years = 10;
    cfg.population.households = 60;
    cfg.population.firms = 6;
    cfg
}

#[test]
fn exported_csvs_are_byte_deterministic() {
    let cfg = tiny_scenario();

    let mut first_summary = Vec::new();
    let mut first_runs = Vec::new();
    let runs = run_ensemble(&cfg).expect("batch should complete");
    let summary = EnsembleSummary::from_runs(&runs).expect("batch should reduce");
    write_summary_csv(&summary, &mut first_summary).expect("summary export");
    write_runs_csv(&runs, &mut first_runs).expect("runs export");

    let mut second_summary = Vec::new();
    let mut second_runs = Vec::new();
    let runs = run_ensemble(&cfg).expect("batch should complete");
    let summary = EnsembleSummary::from_runs(&runs).expect("batch should reduce");
    write_summary_csv(&summary, &mut second_summary).expect("summary export");
    write_runs_csv(&runs, &mut second_runs).expect("runs export");

    assert_eq!(first_summary, second_summary);
    assert_eq!(first_runs, second_runs);
}

#[test]
fn export_row_counts_match_the_batch() {
    let cfg = tiny_scenario();
    let runs = run_ensemble(&cfg).expect("batch should complete");
    let summary = EnsembleSummary::from_runs(&runs).expect("batch should reduce");

    let mut summary_buf = Vec::new();
    write_summary_csv(&summary, &mut summary_buf).expect("summary export");
    let summary_text = String::from_utf8(summary_buf).expect("utf8");
    // 1 header + one row per simulated year
    assert_eq!(
        summary_text.lines().count(),
        1 + usize::from(cfg.simulation.years)
    );

    let mut runs_buf = Vec::new();
    write_runs_csv(&runs, &mut runs_buf).expect("runs export");
    let runs_text = String::from_utf8(runs_buf).expect("utf8");
    // 1 header + one row per run and year
    assert_eq!(
        runs_text.lines().count(),
        1 + cfg.simulation.runs * usize::from(cfg.simulation.years)
    );
}
