//! Core simulation types: horizon, yearly global state, and run output.

use std::fmt;

use crate::params::ParameterSample;

/// Simulated year range, inclusive on both ends.
///
/// # Examples
///
/// ```
/// use transition_sim::sim::types::Horizon;
///
/// let horizon = Horizon::new(2024, 30);
/// assert_eq!(horizon.end_year(), 2053);
/// assert_eq!(horizon.years().count(), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    /// First simulated year, recorded as the initial snapshot.
    pub start_year: u16,
    /// Number of yearly snapshots including the initial year.
    pub len: u16,
}

impl Horizon {
    /// Creates a horizon of `len` years starting at `start_year`.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero.
    pub fn new(start_year: u16, len: u16) -> Self {
        assert!(len > 0, "horizon must cover at least one year");
        Self { start_year, len }
    }

    /// Last simulated year, inclusive.
    pub fn end_year(&self) -> u16 {
        self.start_year + (self.len - 1)
    }

    /// Iterates every simulated year in order.
    pub fn years(&self) -> impl Iterator<Item = u16> {
        self.start_year..=self.end_year()
    }
}

/// Snapshot of the coupled climate-economy state at the end of one simulated
/// year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalState {
    /// Simulated year this snapshot closes.
    pub year: u16,
    /// Technology cost after the learning-curve decline (per unit).
    pub technology_cost: f64,
    /// Emissions released during this year (tonnes CO2).
    pub annual_emissions: f64,
    /// Emissions accumulated since the start year (tonnes CO2).
    pub cumulative_emissions: f64,
    /// Warming above pre-industrial (degrees C), never below the baseline.
    pub temperature_anomaly: f64,
    /// Carbon price (per tonne CO2).
    pub carbon_price: f64,
    /// Fraction of all agents that have adopted, in [0, 1].
    pub adoption_fraction: f64,
}

impl fmt::Display for GlobalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | adoption={:>5.1}%  cost={:>6.2} | emissions={:>9.1} t  \
             cum={:>11.1} t | T={:>5.3} C  price={:>6.2}",
            self.year,
            self.adoption_fraction * 100.0,
            self.technology_cost,
            self.annual_emissions,
            self.cumulative_emissions,
            self.temperature_anomaly,
            self.carbon_price,
        )
    }
}

/// Complete output of one Monte Carlo run: the sampled parameters and one
/// [`GlobalState`] per simulated year, first entry being the initial year.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Zero-based run index within the batch.
    pub run: usize,
    /// Parameters this run was simulated under.
    pub sample: ParameterSample,
    /// Yearly snapshots in chronological order.
    pub years: Vec<GlobalState>,
}
