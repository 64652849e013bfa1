//! Monte Carlo orchestration: independent runs fanned out over a worker pool.
//!
//! Every run derives its own RNG stream from the master seed and its run
//! index, so results are bit-identical whether the batch executes
//! sequentially or in parallel, and re-running run `i` alone reproduces its
//! trajectory exactly.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::config::ScenarioConfig;
use crate::error::{SamplingError, SimError};
use crate::params;

use super::engine::RunSimulator;
use super::types::RunResult;

/// Stride between per-run seed substreams (odd, from the 64-bit golden
/// ratio), so neighboring master seeds never share substreams.
const RUN_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Derives the independent RNG seed for `run` from the master seed.
pub fn run_seed(master_seed: u64, run: usize) -> u64 {
    master_seed.wrapping_add((run as u64).wrapping_mul(RUN_SEED_STRIDE))
}

/// Executes one fully self-contained run: seed, parameter draw, population,
/// 30 simulated years.
pub fn simulate_run(config: &ScenarioConfig, run: usize) -> Result<RunResult, SamplingError> {
    let mut rng = StdRng::seed_from_u64(run_seed(config.simulation.master_seed, run));
    let sample = params::draw_sample(&config.parameters, run, &mut rng)?;
    let simulator = RunSimulator::new(config, sample, run, rng)?;
    Ok(simulator.run())
}

/// Executes the whole batch in parallel, collecting runs in index order.
///
/// # Errors
///
/// Fails fast on an invalid configuration and propagates the first sampling
/// failure from any run.
pub fn run_ensemble(config: &ScenarioConfig) -> Result<Vec<RunResult>, SimError> {
    let abort = AtomicBool::new(false);
    run_ensemble_with_abort(config, &abort)
}

/// Like [`run_ensemble`], but checks `abort` before starting each run.
///
/// Once the flag is set, no new run starts; runs already in flight finish
/// and the batch resolves to [`SimError::Cancelled`] with the completed
/// count. A cancelled batch never yields a partial ensemble.
pub fn run_ensemble_with_abort(
    config: &ScenarioConfig,
    abort: &AtomicBool,
) -> Result<Vec<RunResult>, SimError> {
    validate(config)?;
    let requested = config.simulation.runs;
    let outcomes: Vec<Option<RunResult>> = (0..requested)
        .into_par_iter()
        .map(|run| {
            if abort.load(Ordering::Acquire) {
                return Ok(None);
            }
            simulate_run(config, run).map(Some)
        })
        .collect::<Result<_, SamplingError>>()?;

    let completed = outcomes.iter().filter(|o| o.is_some()).count();
    if completed < requested {
        return Err(SimError::Cancelled {
            completed,
            requested,
        });
    }
    Ok(outcomes.into_iter().flatten().collect())
}

/// Executes the whole batch on the calling thread, in run order.
///
/// Exists for callers that want predictable single-thread behavior; the
/// results are bit-identical to [`run_ensemble`] by construction.
pub fn run_ensemble_sequential(config: &ScenarioConfig) -> Result<Vec<RunResult>, SimError> {
    validate(config)?;
    let mut results = Vec::with_capacity(config.simulation.runs);
    for run in 0..config.simulation.runs {
        results.push(simulate_run(config, run)?);
    }
    Ok(results)
}

fn validate(config: &ScenarioConfig) -> Result<(), SimError> {
    if let Some(error) = config.validate().into_iter().next() {
        return Err(error.into());
    }
    Ok(())
}
