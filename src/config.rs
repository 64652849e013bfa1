//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::params::ParameterConfig;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Batch size, seeding, and simulated horizon.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Household and firm population parameters.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Costs, emissions, and policy parameters.
    #[serde(default)]
    pub economy: EconomyConfig,
    /// Adoption driver weights per agent kind.
    #[serde(default)]
    pub drivers: DriversConfig,
    /// Distributions of the uncertain parameters, drawn once per run.
    #[serde(default)]
    pub parameters: ParameterConfig,
}

/// Batch size, seeding, and simulated horizon.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of Monte Carlo runs (must be >= 2 for confidence bands).
    pub runs: usize,
    /// Master random seed; every run derives its own substream from it.
    pub master_seed: u64,
    /// First simulated year, recorded as the initial snapshot.
    pub start_year: u16,
    /// Number of yearly snapshots including the initial year.
    pub years: u16,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: 100,
            master_seed: 42,
            start_year: 2024,
            years: 30,
        }
    }
}

/// Household and firm population parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopulationConfig {
    /// Number of household agents.
    pub households: usize,
    /// Number of firm agents.
    pub firms: usize,
    /// Standard deviation of household scatter around its city centroid.
    pub location_jitter: f64,
    /// Neighbors per agent in the k-nearest social graph.
    pub network_k: usize,
    /// Log-scale standard deviation of household wealth.
    pub household_wealth_sigma: f64,
    /// Log-scale mean of firm wealth.
    pub firm_wealth_mu: f64,
    /// Log-scale standard deviation of firm wealth.
    pub firm_wealth_sigma: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            households: 1000,
            firms: 100,
            location_jitter: 10.0,
            network_k: 10,
            household_wealth_sigma: 1.0,
            firm_wealth_mu: 13.0,
            firm_wealth_sigma: 1.5,
        }
    }
}

/// Costs, emissions, and policy parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomyConfig {
    /// Technology cost before any adoption drives it down the learning curve.
    pub base_technology_cost: f64,
    /// Annual fossil energy cost every non-adopter keeps paying.
    pub fossil_cost: f64,
    /// Years an adopter spreads the technology cost over.
    pub financing_years: u32,
    /// Fraction of an agent's emissions remaining after adoption.
    pub abatement_factor: f64,
    /// Annual growth rate of baseline emissions.
    pub background_growth: f64,
    /// Temperature anomaly (degrees C) above which subsidies start.
    pub incentive_threshold: f64,
    /// Subsidy per degree of warming above the threshold.
    pub incentive_rate: f64,
    /// Annual household emissions before abatement (tonnes CO2).
    pub household_emissions_t: f64,
    /// Annual firm emissions before abatement (tonnes CO2).
    pub firm_emissions_t: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_technology_cost: 100.0,
            fossil_cost: 80.0,
            financing_years: 10,
            abatement_factor: 0.1,
            background_growth: 0.01,
            incentive_threshold: 1.5,
            incentive_rate: 20.0,
            household_emissions_t: 20.0,
            firm_emissions_t: 200.0,
        }
    }
}

/// Driver weights and logistic shape for one agent kind.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverWeights {
    /// Weight of the economic driver (payback pressure).
    pub economic: f64,
    /// Weight of the social driver (adopted-neighbor fraction).
    pub social: f64,
    /// Weight of the environmental driver (awareness times climate stress).
    pub environmental: f64,
    /// Slope of the logistic squash.
    pub steepness: f64,
    /// Combined score at which the squash crosses one half.
    pub midpoint: f64,
    /// Lower clamp on the yearly adoption probability.
    pub probability_floor: f64,
    /// Upper clamp on the yearly adoption probability.
    pub probability_ceiling: f64,
}

impl Default for DriverWeights {
    fn default() -> Self {
        Self {
            economic: 1.0,
            social: 1.0,
            environmental: 1.0,
            steepness: 2.5,
            midpoint: 2.2,
            probability_floor: 0.002,
            probability_ceiling: 0.98,
        }
    }
}

impl DriverWeights {
    /// Firm defaults: the economic driver dominates, the softer drivers
    /// weigh half as much.
    pub fn firm_default() -> Self {
        Self {
            economic: 1.5,
            social: 0.5,
            environmental: 0.5,
            ..Self::default()
        }
    }
}

/// Adoption driver weights per agent kind.
///
/// Fields missing from a partial `[drivers.firms]` table fall back to the
/// household-shaped [`DriverWeights::default`], not to the firm defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriversConfig {
    pub households: DriverWeights,
    pub firms: DriverWeights,
}

impl Default for DriversConfig {
    fn default() -> Self {
        Self {
            households: DriverWeights::default(),
            firms: DriverWeights::firm_default(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            population: PopulationConfig::default(),
            economy: EconomyConfig::default(),
            drivers: DriversConfig::default(),
            parameters: ParameterConfig::default(),
        }
    }

    /// Returns the no-social preset: the neighbor channel is switched off,
    /// so agents decide independently of the social graph.
    pub fn no_social() -> Self {
        let mut cfg = Self::baseline();
        cfg.drivers.households.social = 0.0;
        cfg.drivers.firms.social = 0.0;
        cfg.parameters.social_influence = crate::params::Dist::Normal {
            mean: 0.0,
            std: 0.0,
        };
        cfg
    }

    /// Returns the rapid-learning preset: the technology cost declines twice
    /// as fast with cumulative adoption.
    pub fn rapid_learning() -> Self {
        let mut cfg = Self::baseline();
        cfg.parameters.learning_rate = crate::params::Dist::Normal {
            mean: 0.3,
            std: 0.03,
        };
        cfg
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "no_social", "rapid_learning"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "no_social" => Ok(Self::no_social()),
            "rapid_learning" => Ok(Self::rapid_learning()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.runs < 2 {
            errors.push(ConfigError::new(
                "simulation.runs",
                "must be >= 2; confidence bands need at least two runs",
            ));
        }
        if s.years == 0 {
            errors.push(ConfigError::new("simulation.years", "must be > 0"));
        } else if u32::from(s.start_year) + u32::from(s.years) - 1 > u32::from(u16::MAX) {
            errors.push(ConfigError::new(
                "simulation.years",
                "horizon pushes the end year past 65535",
            ));
        }

        let p = &self.population;
        if p.households == 0 {
            errors.push(ConfigError::new("population.households", "must be > 0"));
        }
        if p.households + p.firms < 2 {
            errors.push(ConfigError::new(
                "population.firms",
                "households + firms must be >= 2",
            ));
        }
        if p.network_k == 0 {
            errors.push(ConfigError::new("population.network_k", "must be > 0"));
        }
        if !p.location_jitter.is_finite() || p.location_jitter < 0.0 {
            errors.push(ConfigError::new(
                "population.location_jitter",
                "must be finite and >= 0",
            ));
        }
        if !p.household_wealth_sigma.is_finite() || p.household_wealth_sigma < 0.0 {
            errors.push(ConfigError::new(
                "population.household_wealth_sigma",
                "must be finite and >= 0",
            ));
        }
        if !p.firm_wealth_mu.is_finite() {
            errors.push(ConfigError::new("population.firm_wealth_mu", "must be finite"));
        }
        if !p.firm_wealth_sigma.is_finite() || p.firm_wealth_sigma < 0.0 {
            errors.push(ConfigError::new(
                "population.firm_wealth_sigma",
                "must be finite and >= 0",
            ));
        }

        let e = &self.economy;
        if !(e.base_technology_cost > 0.0) {
            errors.push(ConfigError::new("economy.base_technology_cost", "must be > 0"));
        }
        if !(e.fossil_cost > 0.0) {
            errors.push(ConfigError::new("economy.fossil_cost", "must be > 0"));
        }
        if e.financing_years == 0 {
            errors.push(ConfigError::new("economy.financing_years", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&e.abatement_factor) {
            errors.push(ConfigError::new(
                "economy.abatement_factor",
                "must be in [0.0, 1.0]",
            ));
        }
        if !e.background_growth.is_finite() || e.background_growth <= -1.0 {
            errors.push(ConfigError::new(
                "economy.background_growth",
                "must be finite and > -1.0",
            ));
        }
        if !e.incentive_threshold.is_finite() {
            errors.push(ConfigError::new("economy.incentive_threshold", "must be finite"));
        }
        if !e.incentive_rate.is_finite() || e.incentive_rate < 0.0 {
            errors.push(ConfigError::new(
                "economy.incentive_rate",
                "must be finite and >= 0",
            ));
        }
        if !e.household_emissions_t.is_finite() || e.household_emissions_t < 0.0 {
            errors.push(ConfigError::new(
                "economy.household_emissions_t",
                "must be finite and >= 0",
            ));
        }
        if !e.firm_emissions_t.is_finite() || e.firm_emissions_t < 0.0 {
            errors.push(ConfigError::new(
                "economy.firm_emissions_t",
                "must be finite and >= 0",
            ));
        }

        validate_driver_weights("drivers.households", &self.drivers.households, &mut errors);
        validate_driver_weights("drivers.firms", &self.drivers.firms, &mut errors);

        errors.extend(self.parameters.validate());

        errors
    }
}

fn validate_driver_weights(prefix: &str, w: &DriverWeights, errors: &mut Vec<ConfigError>) {
    for (name, value) in [
        ("economic", w.economic),
        ("social", w.social),
        ("environmental", w.environmental),
    ] {
        if !value.is_finite() || value < 0.0 {
            errors.push(ConfigError::new(
                format!("{prefix}.{name}"),
                "must be finite and >= 0",
            ));
        }
    }
    if !w.steepness.is_finite() || !(w.steepness > 0.0) {
        errors.push(ConfigError::new(
            format!("{prefix}.steepness"),
            "must be finite and > 0",
        ));
    }
    if !w.midpoint.is_finite() {
        errors.push(ConfigError::new(format!("{prefix}.midpoint"), "must be finite"));
    }
    if !(0.0..1.0).contains(&w.probability_floor) {
        errors.push(ConfigError::new(
            format!("{prefix}.probability_floor"),
            "must be in [0.0, 1.0)",
        ));
    }
    if !(w.probability_ceiling > w.probability_floor) || w.probability_ceiling > 1.0 {
        errors.push(ConfigError::new(
            format!("{prefix}.probability_ceiling"),
            "must be in (probability_floor, 1.0]",
        ));
    }
}
