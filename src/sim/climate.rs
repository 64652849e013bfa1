//! Climate-economy coupling: learning curve, emissions, temperature, and
//! carbon price.
//!
//! The coupler closes the loop once per simulated year, after all agent
//! decisions: adoption pushes the technology cost down its learning curve and
//! cuts emissions, cumulative emissions push the temperature anomaly up, and
//! the anomaly pushes the carbon price up, which feeds next year's decisions.

use crate::agents::population::Population;
use crate::agents::types::AgentKind;
use crate::config::EconomyConfig;
use crate::params::ParameterSample;
use crate::sim::types::GlobalState;

/// Warming already locked in at the start of the horizon (degrees C).
pub const TEMPERATURE_BASELINE_C: f64 = 1.0;

/// Year-invariant coupler for one run: economy constants plus the run's
/// sampled climate and cost parameters.
#[derive(Debug, Clone)]
pub struct ClimateEconomy {
    start_year: u16,
    base_technology_cost: f64,
    abatement_factor: f64,
    background_growth: f64,
    household_emissions_t: f64,
    firm_emissions_t: f64,
    learning_rate: f64,
    temperature_sensitivity: f64,
    carbon_price_base: f64,
    carbon_price_slope: f64,
}

impl ClimateEconomy {
    pub fn new(economy: &EconomyConfig, sample: &ParameterSample, start_year: u16) -> Self {
        Self {
            start_year,
            base_technology_cost: economy.base_technology_cost,
            abatement_factor: economy.abatement_factor,
            background_growth: economy.background_growth,
            household_emissions_t: economy.household_emissions_t,
            firm_emissions_t: economy.firm_emissions_t,
            learning_rate: sample.learning_rate,
            temperature_sensitivity: sample.temperature_sensitivity,
            carbon_price_base: sample.carbon_price_base,
            carbon_price_slope: sample.carbon_price_slope,
        }
    }

    /// State recorded for the start year, before any decision or emission.
    pub fn initial_state(&self, population: &Population) -> GlobalState {
        GlobalState {
            year: self.start_year,
            technology_cost: self.technology_cost(population.adopted_count()),
            annual_emissions: 0.0,
            cumulative_emissions: 0.0,
            temperature_anomaly: TEMPERATURE_BASELINE_C,
            carbon_price: self.carbon_price_base,
            adoption_fraction: population.adoption_fraction(),
        }
    }

    /// Technology cost after `adopted` cumulative adoptions, following the
    /// learning curve `base * (adopted + 1)^-learning_rate`.
    pub fn technology_cost(&self, adopted: usize) -> f64 {
        self.base_technology_cost * (adopted as f64 + 1.0).powf(-self.learning_rate)
    }

    fn emission_rate(&self, kind: AgentKind) -> f64 {
        match kind {
            AgentKind::Household => self.household_emissions_t,
            AgentKind::Firm => self.firm_emissions_t,
        }
    }

    /// Closes year `year` given the population after this year's decisions.
    ///
    /// Adopters emit at `abatement_factor` of their base rate from the year
    /// they adopt; background growth scales the whole flow with elapsed time.
    pub fn transition(&self, prev: &GlobalState, population: &Population, year: u16) -> GlobalState {
        let adopted = population.adopted_count();
        let technology_cost = self.technology_cost(adopted);

        let elapsed = i32::from(year - self.start_year);
        let growth = (1.0 + self.background_growth).powi(elapsed);
        let base_flow: f64 = population
            .agents()
            .iter()
            .map(|agent| {
                let rate = self.emission_rate(agent.kind);
                if agent.adopted() {
                    rate * self.abatement_factor
                } else {
                    rate
                }
            })
            .sum();
        let annual_emissions = growth * base_flow;
        let cumulative_emissions = prev.cumulative_emissions + annual_emissions;

        let temperature_anomaly =
            TEMPERATURE_BASELINE_C + self.temperature_sensitivity * cumulative_emissions;
        let carbon_price = self.carbon_price_base
            + self.carbon_price_slope * (temperature_anomaly - TEMPERATURE_BASELINE_C);

        GlobalState {
            year,
            technology_cost,
            annual_emissions,
            cumulative_emissions,
            temperature_anomaly,
            carbon_price,
            adoption_fraction: population.adoption_fraction(),
        }
    }
}
