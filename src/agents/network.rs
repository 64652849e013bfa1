//! k-nearest-neighbor social graph over agent locations.

use crate::agents::population::Population;
use crate::agents::types::AgentId;

/// Immutable neighbor lists, one per agent, built once per run.
///
/// Edges are directed: `a` lists its k nearest agents by Euclidean distance,
/// whether or not they list `a` back. Distance ties break toward the lower
/// agent id, so the graph is a pure function of the population.
#[derive(Debug, Clone)]
pub struct SocialNetwork {
    k: usize,
    neighbors: Vec<Vec<AgentId>>,
}

impl SocialNetwork {
    /// Builds the graph with a brute-force distance scan over all pairs.
    pub fn build(population: &Population, k: usize) -> Self {
        let agents = population.agents();
        let mut neighbors = Vec::with_capacity(agents.len());
        for agent in agents {
            let mut by_distance: Vec<(f64, AgentId)> = agents
                .iter()
                .filter(|other| other.id != agent.id)
                .map(|other| (agent.location.distance(&other.location), other.id))
                .collect();
            by_distance.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            by_distance.truncate(k);
            neighbors.push(by_distance.into_iter().map(|(_, id)| id).collect());
        }
        Self { k, neighbors }
    }

    /// The requested neighbor count; agents in a small population may hold
    /// fewer.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn neighbors_of(&self, id: AgentId) -> &[AgentId] {
        &self.neighbors[id.0]
    }

    /// Fraction of `id`'s neighbors marked adopted in `flags`. An agent with
    /// no neighbors sees zero social signal.
    pub fn adopted_neighbor_fraction(&self, id: AgentId, flags: &[bool]) -> f64 {
        let neighbors = &self.neighbors[id.0];
        if neighbors.is_empty() {
            return 0.0;
        }
        let adopted = neighbors.iter().filter(|n| flags[n.0]).count();
        adopted as f64 / neighbors.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::types::{Agent, AgentKind, Point};
    use crate::config::PopulationConfig;
    use crate::params::ParameterSample;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn agent_at(id: usize, x: f64, y: f64) -> Agent {
        Agent::new(
            AgentId(id),
            AgentKind::Household,
            50_000.0,
            0.3,
            Point::new(x, y),
        )
    }

    fn generated_population(households: usize, firms: usize) -> Population {
        let config = PopulationConfig {
            households,
            firms,
            ..PopulationConfig::default()
        };
        let sample = ParameterSample {
            learning_rate: 0.15,
            awareness_alpha: 2.0,
            awareness_beta: 5.0,
            household_wealth_mu: 11.0,
            temperature_sensitivity: 1.5e-6,
            social_influence: 0.3,
            carbon_price_base: 30.0,
            carbon_price_slope: 20.0,
        };
        let mut rng = StdRng::seed_from_u64(21);
        Population::generate(&config, &sample, 0, &mut rng).unwrap()
    }

    #[test]
    fn every_agent_gets_k_distinct_neighbors_without_self() {
        let pop = generated_population(30, 3);
        let net = SocialNetwork::build(&pop, 5);
        for agent in pop.agents() {
            let neighbors = net.neighbors_of(agent.id);
            assert_eq!(neighbors.len(), 5);
            assert!(!neighbors.contains(&agent.id), "no self loops");
            let mut seen = neighbors.to_vec();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), 5, "no duplicate neighbors");
        }
    }

    #[test]
    fn population_of_k_plus_one_connects_everyone() {
        let pop = generated_population(11, 0);
        let net = SocialNetwork::build(&pop, 10);
        for agent in pop.agents() {
            assert_eq!(net.neighbors_of(agent.id).len(), 10);
        }
    }

    #[test]
    fn small_population_caps_neighbor_lists() {
        let pop = generated_population(6, 0);
        let net = SocialNetwork::build(&pop, 10);
        for agent in pop.agents() {
            assert_eq!(net.neighbors_of(agent.id).len(), 5);
        }
    }

    #[test]
    fn equidistant_ties_break_toward_lower_id() {
        // Agents 1, 2, 3 all sit exactly 10 away from agent 0; agent 4 sits
        // closer. With k = 2 agent 0 must pick agent 4 and then agent 1.
        let pop = Population::from_agents(vec![
            agent_at(0, 0.0, 0.0),
            agent_at(1, 10.0, 0.0),
            agent_at(2, 0.0, 10.0),
            agent_at(3, -10.0, 0.0),
            agent_at(4, 5.0, 0.0),
        ]);
        let net = SocialNetwork::build(&pop, 2);
        assert_eq!(net.neighbors_of(AgentId(0)), &[AgentId(4), AgentId(1)]);
    }

    #[test]
    fn adopted_neighbor_fraction_counts_only_neighbors() {
        let pop = Population::from_agents(vec![
            agent_at(0, 0.0, 0.0),
            agent_at(1, 1.0, 0.0),
            agent_at(2, 2.0, 0.0),
            agent_at(3, 50.0, 0.0),
        ]);
        let net = SocialNetwork::build(&pop, 2);
        // Agent 0's neighbors are 1 and 2; agent 3 is too far to matter.
        let flags = vec![false, true, false, true];
        assert_eq!(net.adopted_neighbor_fraction(AgentId(0), &flags), 0.5);
    }

    #[test]
    fn lone_agent_sees_zero_social_signal() {
        let pop = Population::from_agents(vec![agent_at(0, 0.0, 0.0)]);
        let net = SocialNetwork::build(&pop, 10);
        assert!(net.neighbors_of(AgentId(0)).is_empty());
        assert_eq!(net.adopted_neighbor_fraction(AgentId(0), &[false]), 0.0);
    }
}
