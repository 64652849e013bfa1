//! Single-run simulation engine driving agents against the coupled
//! climate-economy state.

use rand::rngs::StdRng;
use rand::Rng;

use crate::agents::adoption::{AdoptionModel, YearContext};
use crate::agents::network::SocialNetwork;
use crate::agents::population::Population;
use crate::agents::types::AgentId;
use crate::config::ScenarioConfig;
use crate::error::SamplingError;
use crate::params::ParameterSample;

use super::climate::ClimateEconomy;
use super::types::{Horizon, RunResult};

/// Simulation engine for one Monte Carlo run, owning the population, the
/// social graph, the decision model, and the coupler.
///
/// The yearly cycle is fixed: agents decide against last year's global state
/// and a frozen start-of-year adoption snapshot, then the coupler closes the
/// year. The initial year records the untouched baseline, so a horizon of 30
/// years yields 30 snapshots driven by 29 decision rounds.
pub struct RunSimulator {
    run: usize,
    sample: ParameterSample,
    horizon: Horizon,
    population: Population,
    network: SocialNetwork,
    adoption: AdoptionModel,
    climate: ClimateEconomy,
    rng: StdRng,
}

impl RunSimulator {
    /// Generates the run's population and builds all models.
    ///
    /// The RNG must already have consumed the run's parameter draws; the
    /// engine continues on the same stream for population generation and
    /// yearly decisions.
    pub fn new(
        config: &ScenarioConfig,
        sample: ParameterSample,
        run: usize,
        mut rng: StdRng,
    ) -> Result<Self, SamplingError> {
        let population = Population::generate(&config.population, &sample, run, &mut rng)?;
        Ok(Self::with_population(config, sample, run, population, rng))
    }

    fn with_population(
        config: &ScenarioConfig,
        sample: ParameterSample,
        run: usize,
        population: Population,
        rng: StdRng,
    ) -> Self {
        let horizon = Horizon::new(config.simulation.start_year, config.simulation.years);
        let network = SocialNetwork::build(&population, config.population.network_k);
        let adoption = AdoptionModel::new(&config.drivers, &config.economy, &sample);
        let climate = ClimateEconomy::new(&config.economy, &sample, horizon.start_year);
        Self {
            run,
            sample,
            horizon,
            population,
            network,
            adoption,
            climate,
            rng,
        }
    }

    /// Executes all simulated years and returns the completed trajectory.
    pub fn run(mut self) -> RunResult {
        let mut years = Vec::with_capacity(usize::from(self.horizon.len));

        // 1. Record the untouched initial year.
        let mut state = self.climate.initial_state(&self.population);
        years.push(state);

        for offset in 1..self.horizon.len {
            let year = self.horizon.start_year + offset;
            // 2. Agents decide against last year's global state.
            let ctx = YearContext {
                technology_cost: state.technology_cost,
                carbon_price: state.carbon_price,
                temperature_anomaly: state.temperature_anomaly,
            };
            self.step(year, &ctx);

            // 3. The coupler closes the year with the updated population.
            state = self.climate.transition(&state, &self.population, year);
            years.push(state);
        }

        RunResult {
            run: self.run,
            sample: self.sample,
            years,
        }
    }

    /// One decision round: every non-adopter gets a Bernoulli draw against
    /// the frozen start-of-year adoption snapshot, in agent id order.
    ///
    /// Reading the snapshot instead of the live flags makes the round
    /// independent of iteration order; an agent adopting this year is not
    /// visible to its neighbors until next year.
    fn step(&mut self, year: u16, ctx: &YearContext) {
        let flags = self.population.adoption_flags();
        for (index, adopted) in flags.iter().enumerate() {
            if *adopted {
                continue;
            }
            let id = AgentId(index);
            let fraction = self.network.adopted_neighbor_fraction(id, &flags);
            let p = self
                .adoption
                .probability(self.population.agent(id), fraction, ctx);
            if self.rng.random::<f64>() < p {
                self.population.mark_adopted(id, year);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::types::{Agent, AgentKind, Point};
    use rand::SeedableRng;

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

    fn small_config() -> ScenarioConfig {
        let mut cfg = ScenarioConfig::baseline();
        cfg.population.households = 60;
        cfg.population.firms = 6;
        cfg.population.network_k = 5;
        cfg
    }

    fn simulate(config: &ScenarioConfig, seed: u64) -> RunResult {
        let rng = StdRng::seed_from_u64(seed);
        RunSimulator::new(config, sample(), 0, rng)
            .expect("engine builds")
            .run()
    }

    #[test]
    fn produces_one_snapshot_per_year() {
        let result = simulate(&small_config(), 5);
        assert_eq!(result.years.len(), 30);
        assert_eq!(result.years[0].year, 2024);
        assert_eq!(result.years[29].year, 2053);
        for (offset, state) in result.years.iter().enumerate() {
            assert_eq!(state.year, 2024 + offset as u16);
        }
    }

    #[test]
    fn initial_year_is_the_untouched_baseline() {
        let result = simulate(&small_config(), 5);
        let first = &result.years[0];
        assert_eq!(first.adoption_fraction, 0.0);
        assert_eq!(first.annual_emissions, 0.0);
        assert_eq!(first.cumulative_emissions, 0.0);
        assert_eq!(first.temperature_anomaly, 1.0);
    }

    #[test]
    fn trajectories_respect_the_one_way_couplings() {
        let result = simulate(&small_config(), 9);
        for pair in result.years.windows(2) {
            assert!(
                pair[1].adoption_fraction >= pair[0].adoption_fraction,
                "adoption can never revert"
            );
            assert!(pair[1].cumulative_emissions >= pair[0].cumulative_emissions);
            assert!(pair[1].temperature_anomaly >= pair[0].temperature_anomaly);
            assert!(pair[1].technology_cost <= pair[0].technology_cost);
        }
        for state in &result.years {
            assert!((0.0..=1.0).contains(&state.adoption_fraction));
            assert!(state.annual_emissions >= 0.0);
            assert!(state.carbon_price >= 0.0);
        }
    }

    #[test]
    fn same_seed_reproduces_the_trajectory() {
        let cfg = small_config();
        let a = simulate(&cfg, 123);
        let b = simulate(&cfg, 123);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let cfg = small_config();
        let a = simulate(&cfg, 1);
        let b = simulate(&cfg, 2);
        assert_ne!(a.years, b.years);
    }

    #[test]
    fn single_year_horizon_records_only_the_baseline() {
        let mut cfg = small_config();
        cfg.simulation.years = 1;
        let result = simulate(&cfg, 3);
        assert_eq!(result.years.len(), 1);
        assert_eq!(result.years[0].year, 2024);
    }

    #[test]
    fn decisions_read_the_frozen_start_of_year_snapshot() {
        // Three agents on a line with k = 1: B's neighbor is A, C's neighbor
        // is B. A saturating social-only score makes every decision
        // deterministic: an adopted neighbor forces adoption, a non-adopted
        // neighbor forbids it.
        let mut cfg = ScenarioConfig::baseline();
        cfg.population.network_k = 1;
        for weights in [&mut cfg.drivers.households, &mut cfg.drivers.firms] {
            weights.economic = 0.0;
            weights.social = 1000.0;
            weights.environmental = 0.0;
            weights.steepness = 1.0e6;
            weights.probability_floor = 0.0;
            weights.probability_ceiling = 1.0;
        }
        let run_sample = ParameterSample {
            social_influence: 1.0,
            ..sample()
        };
        let agent = |id, x| {
            Agent::new(
                AgentId(id),
                AgentKind::Household,
                50_000.0,
                0.0,
                Point::new(x, 0.0),
            )
        };
        let population =
            Population::from_agents(vec![agent(0, 0.0), agent(1, 1.0), agent(2, 2.0)]);
        let rng = StdRng::seed_from_u64(0);
        let mut sim = RunSimulator::with_population(&cfg, run_sample, 0, population, rng);
        sim.population.mark_adopted(AgentId(0), 2024);

        let ctx = YearContext {
            technology_cost: 100.0,
            carbon_price: 30.0,
            temperature_anomaly: 1.0,
        };
        sim.step(2025, &ctx);

        // B saw adopted A and adopted; C saw the frozen non-adopted B and
        // must not have, even though B flipped earlier in the same round.
        assert!(sim.population.agent(AgentId(1)).adopted());
        assert!(!sim.population.agent(AgentId(2)).adopted());
    }
}
