//! Simulator entry point: CLI wiring and config-driven ensemble runs.

use std::path::Path;
use std::process;

use transition_sim::config::ScenarioConfig;
use transition_sim::io::export::{export_runs_csv, export_summary_csv};
use transition_sim::sim::ensemble::EnsembleSummary;
use transition_sim::sim::monte_carlo::run_ensemble;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    runs_override: Option<usize>,
    summary_out: Option<String>,
    runs_out: Option<String>,
    quiet: bool,
}

fn print_help() {
    eprintln!("transition-sim - Agent-based energy transition simulator");
    eprintln!();
    eprintln!("Usage: transition-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>     Load scenario from TOML config file");
    eprintln!("  --preset <name>       Use a built-in preset (baseline, no_social, rapid_learning)");
    eprintln!("  --seed <u64>          Override the master random seed");
    eprintln!("  --runs <n>            Override the Monte Carlo batch size");
    eprintln!("  --summary-out <path>  Export the per-year ensemble summary to CSV");
    eprintln!("  --runs-out <path>     Export raw per-run trajectories to CSV");
    eprintln!("  --quiet               Skip the per-year summary on stdout");
    eprintln!("  --help                Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        runs_override: None,
        summary_out: None,
        runs_out: None,
        quiet: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--runs" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --runs requires an integer argument");
                    process::exit(1);
                }
                if let Ok(n) = args[i].parse::<usize>() {
                    cli.runs_override = Some(n);
                } else {
                    eprintln!("error: --runs value \"{}\" is not a valid count", args[i]);
                    process::exit(1);
                }
            }
            "--summary-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --summary-out requires a path argument");
                    process::exit(1);
                }
                cli.summary_out = Some(args[i].clone());
            }
            "--runs-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --runs-out requires a path argument");
                    process::exit(1);
                }
                cli.runs_out = Some(args[i].clone());
            }
            "--quiet" | "-q" => {
                cli.quiet = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    // Apply CLI overrides
    if let Some(seed) = cli.seed_override {
        scenario.simulation.master_seed = seed;
    }
    if let Some(runs) = cli.runs_override {
        scenario.simulation.runs = runs;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Run the batch
    let runs = match run_ensemble(&scenario) {
        Ok(runs) => runs,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Reduce to per-year bands
    let summary = match EnsembleSummary::from_runs(&runs) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if !cli.quiet {
        println!("{summary}");
    }

    // Export CSVs if requested
    if let Some(ref path) = cli.summary_out {
        if let Err(e) = export_summary_csv(&summary, Path::new(path)) {
            eprintln!("error: failed to write summary CSV: {e}");
            process::exit(1);
        }
        eprintln!("Summary written to {path}");
    }
    if let Some(ref path) = cli.runs_out {
        if let Err(e) = export_runs_csv(&runs, Path::new(path)) {
            eprintln!("error: failed to write runs CSV: {e}");
            process::exit(1);
        }
        eprintln!("Run trajectories written to {path}");
    }
}
