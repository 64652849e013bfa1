//! Ensemble statistics: mean trajectories and confidence bands per tracked
//! variable.
//!
//! Computed post-hoc from a completed batch so the summary always agrees
//! with the per-run records. The spread is the population standard deviation
//! over runs; bands are mean plus or minus two of those, clipped to each
//! variable's physical range.

use std::fmt;

use crate::error::AggregationError;

use super::climate::TEMPERATURE_BASELINE_C;
use super::types::{GlobalState, RunResult};

/// Half-width of the confidence band, in standard deviations.
const BAND_SIGMA: f64 = 2.0;

/// Mean and clipped band edges for one variable in one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Band {
    fn from_values(values: &[f64], lo: f64, hi: f64) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|v| {
                let d = v - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let sigma = variance.sqrt();
        Self {
            mean,
            lower: (mean - BAND_SIGMA * sigma).clamp(lo, hi),
            upper: (mean + BAND_SIGMA * sigma).clamp(lo, hi),
        }
    }
}

/// Cross-run summary of every tracked variable for one simulated year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearSummary {
    pub year: u16,
    /// Band clipped to [0, 1].
    pub adoption_fraction: Band,
    /// Band clipped to non-negative values.
    pub annual_emissions: Band,
    /// Band clipped to non-negative values.
    pub cumulative_emissions: Band,
    /// Band clipped to stay at or above the warming baseline.
    pub temperature_anomaly: Band,
    /// Band clipped to non-negative values.
    pub carbon_price: Band,
}

impl fmt::Display for YearSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {:>6.3} [{:>6.3}, {:>6.3}]  {:>6.3} [{:>6.3}, {:>6.3}]  {:>7.2} [{:>7.2}, {:>7.2}]",
            self.year,
            self.adoption_fraction.mean,
            self.adoption_fraction.lower,
            self.adoption_fraction.upper,
            self.temperature_anomaly.mean,
            self.temperature_anomaly.lower,
            self.temperature_anomaly.upper,
            self.carbon_price.mean,
            self.carbon_price.lower,
            self.carbon_price.upper,
        )
    }
}

/// Uncertainty summary over a completed ensemble, one row per year.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleSummary {
    /// Number of runs reduced into this summary.
    pub runs: usize,
    /// Per-year summaries in chronological order.
    pub years: Vec<YearSummary>,
}

impl EnsembleSummary {
    /// Reduces a completed ensemble.
    ///
    /// # Errors
    ///
    /// Needs at least two runs, and every run must cover exactly the year
    /// sequence of the first run.
    pub fn from_runs(runs: &[RunResult]) -> Result<Self, AggregationError> {
        let reference = match runs {
            [] => return Err(AggregationError::EmptyEnsemble),
            [_] => return Err(AggregationError::SingleRun),
            [first, ..] => first,
        };
        for run in &runs[1..] {
            if run.years.len() != reference.years.len() {
                return Err(AggregationError::LengthMismatch {
                    run: run.run,
                    expected: reference.years.len(),
                    found: run.years.len(),
                });
            }
            for (position, (expected, found)) in
                reference.years.iter().zip(&run.years).enumerate()
            {
                if expected.year != found.year {
                    return Err(AggregationError::YearMismatch {
                        run: run.run,
                        position,
                        expected: expected.year,
                        found: found.year,
                    });
                }
            }
        }

        let years = reference
            .years
            .iter()
            .enumerate()
            .map(|(position, base)| YearSummary {
                year: base.year,
                adoption_fraction: band_over(runs, position, 0.0, 1.0, |s| s.adoption_fraction),
                annual_emissions: band_over(runs, position, 0.0, f64::INFINITY, |s| {
                    s.annual_emissions
                }),
                cumulative_emissions: band_over(runs, position, 0.0, f64::INFINITY, |s| {
                    s.cumulative_emissions
                }),
                temperature_anomaly: band_over(
                    runs,
                    position,
                    TEMPERATURE_BASELINE_C,
                    f64::INFINITY,
                    |s| s.temperature_anomaly,
                ),
                carbon_price: band_over(runs, position, 0.0, f64::INFINITY, |s| s.carbon_price),
            })
            .collect();

        Ok(Self {
            runs: runs.len(),
            years,
        })
    }
}

fn band_over(
    runs: &[RunResult],
    position: usize,
    lo: f64,
    hi: f64,
    field: impl Fn(&GlobalState) -> f64,
) -> Band {
    let values: Vec<f64> = runs.iter().map(|r| field(&r.years[position])).collect();
    Band::from_values(&values, lo, hi)
}

impl fmt::Display for EnsembleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (first, last) = match (self.years.first(), self.years.last()) {
            (Some(a), Some(b)) => (a.year, b.year),
            _ => (0, 0),
        };
        writeln!(
            f,
            "--- Ensemble Summary ({} runs, {first}-{last}) ---",
            self.runs
        )?;
        writeln!(
            f,
            "year  {:>24}  {:>24}  {:>27}",
            "adoption [lo, hi]", "temperature C [lo, hi]", "carbon price [lo, hi]"
        )?;
        let mut rows = self.years.iter().peekable();
        while let Some(year) = rows.next() {
            if rows.peek().is_some() {
                writeln!(f, "{year}")?;
            } else {
                write!(f, "{year}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterSample;

    fn sample() -> ParameterSample {
        ParameterSample {
            learning_rate: 0.15,
            awareness_alpha: 2.0,
            awareness_beta: 5.0,
            household_wealth_mu: 11.0,
            temperature_sensitivity: 1.5e-6,
            social_influence: 0.3,
            carbon_price_base: 30.0,
            carbon_price_slope: 20.0,
        }
    }

    fn state(year: u16, adoption: f64, t: f64, price: f64) -> GlobalState {
        GlobalState {
            year,
            technology_cost: 100.0,
            annual_emissions: price,
            cumulative_emissions: price,
            temperature_anomaly: t,
            carbon_price: price,
            adoption_fraction: adoption,
        }
    }

    fn run_with(run: usize, years: Vec<GlobalState>) -> RunResult {
        RunResult {
            run,
            sample: sample(),
            years,
        }
    }

    #[test]
    fn empty_ensemble_is_rejected() {
        assert_eq!(
            EnsembleSummary::from_runs(&[]),
            Err(AggregationError::EmptyEnsemble)
        );
    }

    #[test]
    fn single_run_is_rejected() {
        let runs = vec![run_with(0, vec![state(2024, 0.0, 1.0, 30.0)])];
        assert_eq!(
            EnsembleSummary::from_runs(&runs),
            Err(AggregationError::SingleRun)
        );
    }

    #[test]
    fn length_mismatch_names_the_offending_run() {
        let runs = vec![
            run_with(
                0,
                vec![state(2024, 0.0, 1.0, 30.0), state(2025, 0.1, 1.1, 32.0)],
            ),
            run_with(7, vec![state(2024, 0.0, 1.0, 30.0)]),
        ];
        assert_eq!(
            EnsembleSummary::from_runs(&runs),
            Err(AggregationError::LengthMismatch {
                run: 7,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn year_mismatch_names_run_and_position() {
        let runs = vec![
            run_with(0, vec![state(2024, 0.0, 1.0, 30.0)]),
            run_with(3, vec![state(2025, 0.0, 1.0, 30.0)]),
        ];
        assert_eq!(
            EnsembleSummary::from_runs(&runs),
            Err(AggregationError::YearMismatch {
                run: 3,
                position: 0,
                expected: 2024,
                found: 2025,
            })
        );
    }

    #[test]
    fn band_uses_the_population_standard_deviation() {
        // Carbon prices 1, 2, 3: mean 2, population sigma sqrt(2/3).
        let runs = vec![
            run_with(0, vec![state(2024, 0.5, 1.0, 1.0)]),
            run_with(1, vec![state(2024, 0.5, 1.0, 2.0)]),
            run_with(2, vec![state(2024, 0.5, 1.0, 3.0)]),
        ];
        let summary = EnsembleSummary::from_runs(&runs).unwrap();
        let band = summary.years[0].carbon_price;
        let sigma = (2.0_f64 / 3.0).sqrt();
        assert!((band.mean - 2.0).abs() < 1.0e-12);
        assert!((band.lower - (2.0 - 2.0 * sigma)).abs() < 1.0e-12);
        assert!((band.upper - (2.0 + 2.0 * sigma)).abs() < 1.0e-12);
    }

    #[test]
    fn two_constant_runs_collapse_to_the_shared_value() {
        let runs = vec![
            run_with(0, vec![state(2024, 0.25, 1.2, 40.0)]),
            run_with(1, vec![state(2024, 0.25, 1.2, 40.0)]),
        ];
        let summary = EnsembleSummary::from_runs(&runs).unwrap();
        let band = summary.years[0].adoption_fraction;
        assert_eq!((band.mean, band.lower, band.upper), (0.25, 0.25, 0.25));
    }

    #[test]
    fn adoption_band_clips_to_the_unit_interval() {
        // Mean 0.97, sigma 0.02: the raw upper edge 1.01 must clip to 1.
        let runs = vec![
            run_with(0, vec![state(2024, 0.95, 1.0, 30.0)]),
            run_with(1, vec![state(2024, 0.99, 1.0, 30.0)]),
        ];
        let summary = EnsembleSummary::from_runs(&runs).unwrap();
        let band = summary.years[0].adoption_fraction;
        assert_eq!(band.upper, 1.0);
        assert!((band.lower - 0.93).abs() < 1.0e-12);
    }

    #[test]
    fn temperature_band_never_dips_below_the_baseline() {
        // Mean 1.01, sigma 0.01: the raw lower edge 0.99 must clip to 1.
        let runs = vec![
            run_with(0, vec![state(2024, 0.0, 1.00, 30.0)]),
            run_with(1, vec![state(2024, 0.0, 1.02, 30.0)]),
        ];
        let summary = EnsembleSummary::from_runs(&runs).unwrap();
        let band = summary.years[0].temperature_anomaly;
        assert_eq!(band.lower, TEMPERATURE_BASELINE_C);
        assert!(band.upper > TEMPERATURE_BASELINE_C);
    }

    #[test]
    fn summary_preserves_the_year_sequence() {
        let trajectory = |offset: f64| {
            vec![
                state(2024, 0.0 + offset, 1.0, 30.0),
                state(2025, 0.1 + offset, 1.1, 31.0),
                state(2026, 0.2 + offset, 1.2, 32.0),
            ]
        };
        let runs = vec![run_with(0, trajectory(0.0)), run_with(1, trajectory(0.05))];
        let summary = EnsembleSummary::from_runs(&runs).unwrap();
        assert_eq!(summary.runs, 2);
        let years: Vec<u16> = summary.years.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2024, 2025, 2026]);
    }

    #[test]
    fn display_renders_one_row_per_year() {
        let runs = vec![
            run_with(0, vec![state(2024, 0.0, 1.0, 30.0), state(2025, 0.1, 1.1, 31.0)]),
            run_with(1, vec![state(2024, 0.0, 1.0, 30.0), state(2025, 0.2, 1.2, 33.0)]),
        ];
        let summary = EnsembleSummary::from_runs(&runs).unwrap();
        let text = format!("{summary}");
        assert!(text.contains("2 runs"));
        assert!(text.contains("2024"));
        assert!(text.contains("2025"));
    }
}
