//! Population generation: households clustered around city centroids, firms
//! scattered across the whole plane.

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Beta, Distribution, LogNormal, Normal};

use crate::agents::types::{Agent, AgentId, AgentKind, Point};
use crate::config::PopulationConfig;
use crate::error::SamplingError;
use crate::params::ParameterSample;

/// Fixed city centroids households cluster around.
pub const CITY_CENTROIDS: [Point; 3] = [
    Point { x: 30.0, y: 30.0 },
    Point { x: -30.0, y: 30.0 },
    Point { x: 0.0, y: -30.0 },
];

/// Half-width of the settlement plane; firms land uniformly inside it.
pub const SETTLEMENT_HALF_EXTENT: f64 = 90.0;

/// The agent arena for one run: households first, then firms, ids dense.
#[derive(Debug, Clone)]
pub struct Population {
    agents: Vec<Agent>,
    households: usize,
}

impl Population {
    /// Generates the full population for one run.
    ///
    /// Draw order is fixed (per household: centroid, x jitter, y jitter,
    /// wealth, awareness; per firm: x, y, wealth, awareness) so a seeded RNG
    /// reproduces the same population bit for bit.
    pub fn generate(
        config: &PopulationConfig,
        sample: &ParameterSample,
        run: usize,
        rng: &mut StdRng,
    ) -> Result<Self, SamplingError> {
        let awareness = Beta::new(sample.awareness_alpha, sample.awareness_beta)
            .map_err(|e| invalid("awareness", run, e))?;
        let household_wealth =
            LogNormal::new(sample.household_wealth_mu, config.household_wealth_sigma)
                .map_err(|e| invalid("household_wealth", run, e))?;
        let firm_wealth = LogNormal::new(config.firm_wealth_mu, config.firm_wealth_sigma)
            .map_err(|e| invalid("firm_wealth", run, e))?;
        let jitter = Normal::new(0.0, config.location_jitter)
            .map_err(|e| invalid("location_jitter", run, e))?;

        let mut agents = Vec::with_capacity(config.households + config.firms);
        for i in 0..config.households {
            let centroid = CITY_CENTROIDS[rng.random_range(0..CITY_CENTROIDS.len())];
            let location = Point::new(
                centroid.x + jitter.sample(rng),
                centroid.y + jitter.sample(rng),
            );
            let wealth = household_wealth.sample(rng);
            let aware = awareness.sample(rng);
            agents.push(Agent::new(
                AgentId(i),
                AgentKind::Household,
                wealth,
                aware,
                location,
            ));
        }
        for i in 0..config.firms {
            let location = Point::new(
                rng.random_range(-SETTLEMENT_HALF_EXTENT..SETTLEMENT_HALF_EXTENT),
                rng.random_range(-SETTLEMENT_HALF_EXTENT..SETTLEMENT_HALF_EXTENT),
            );
            let wealth = firm_wealth.sample(rng);
            let aware = awareness.sample(rng);
            agents.push(Agent::new(
                AgentId(config.households + i),
                AgentKind::Firm,
                wealth,
                aware,
                location,
            ));
        }

        Ok(Self {
            agents,
            households: config.households,
        })
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn households(&self) -> usize {
        self.households
    }

    pub fn firms(&self) -> usize {
        self.agents.len() - self.households
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id.0]
    }

    pub(crate) fn mark_adopted(&mut self, id: AgentId, year: u16) {
        self.agents[id.0].mark_adopted(year);
    }

    /// Number of agents that have adopted so far.
    pub fn adopted_count(&self) -> usize {
        self.agents.iter().filter(|a| a.adopted()).count()
    }

    /// Fraction of all agents that have adopted so far.
    pub fn adoption_fraction(&self) -> f64 {
        self.adopted_count() as f64 / self.agents.len() as f64
    }

    /// Start-of-year adoption snapshot, indexed by agent id. Decisions within
    /// a year read this frozen view, never the live flags.
    pub fn adoption_flags(&self) -> Vec<bool> {
        self.agents.iter().map(|a| a.adopted()).collect()
    }

    /// Builds a population from hand-placed agents, for graph and engine tests.
    #[cfg(test)]
    pub(crate) fn from_agents(agents: Vec<Agent>) -> Self {
        let households = agents
            .iter()
            .filter(|a| a.kind == AgentKind::Household)
            .count();
        Self { agents, households }
    }
}

fn invalid(parameter: &'static str, run: usize, e: impl ToString) -> SamplingError {
    SamplingError::InvalidDistribution {
        parameter,
        run,
        reason: e.to_string(),
    }
}
