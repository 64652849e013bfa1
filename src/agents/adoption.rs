//! Per-agent adoption decisions from economic, social, and environmental
//! drivers.
//!
//! Each non-adopter gets one yearly Bernoulli draw. The probability combines
//! three drivers through a logistic squash and is clamped to a configured
//! floor and ceiling, so no agent is ever certain to adopt or certain to
//! refuse.

use crate::agents::types::{Agent, AgentKind};
use crate::config::{DriverWeights, DriversConfig, EconomyConfig};
use crate::params::ParameterSample;

/// Probability multiplier for agents that cannot plausibly finance the
/// purchase.
const CREDIT_CONSTRAINED_FACTOR: f64 = 0.1;

/// How strongly perceived climate stress grows toward the plane's edge.
const LATITUDE_STRESS_GAIN: f64 = 0.2;

/// Half-width of the settlement plane used to normalize latitude.
const LATITUDE_EXTENT: f64 = 90.0;

/// Slice of the previous year's global state an agent sees when deciding.
#[derive(Debug, Clone, Copy)]
pub struct YearContext {
    pub technology_cost: f64,
    pub carbon_price: f64,
    pub temperature_anomaly: f64,
}

/// Year-invariant decision model for one run: driver weights per agent kind,
/// economy constants, and the run's sampled social influence.
#[derive(Debug, Clone)]
pub struct AdoptionModel {
    household_weights: DriverWeights,
    firm_weights: DriverWeights,
    fossil_cost: f64,
    financing_years: u32,
    incentive_threshold: f64,
    incentive_rate: f64,
    social_influence: f64,
}

impl AdoptionModel {
    pub fn new(drivers: &DriversConfig, economy: &EconomyConfig, sample: &ParameterSample) -> Self {
        Self {
            household_weights: drivers.households,
            firm_weights: drivers.firms,
            fossil_cost: economy.fossil_cost,
            financing_years: economy.financing_years,
            incentive_threshold: economy.incentive_threshold,
            incentive_rate: economy.incentive_rate,
            social_influence: sample.social_influence,
        }
    }

    /// Yearly adoption probability for `agent` given the frozen
    /// start-of-year neighbor fraction and last year's global state.
    pub fn probability(&self, agent: &Agent, neighbor_fraction: f64, ctx: &YearContext) -> f64 {
        let weights = match agent.kind {
            AgentKind::Household => &self.household_weights,
            AgentKind::Firm => &self.firm_weights,
        };

        let effective_fossil = self.fossil_cost + ctx.carbon_price;
        let incentive = self.policy_incentive(ctx.temperature_anomaly);
        let economic = (effective_fossil - ctx.technology_cost + incentive) / self.fossil_cost;

        let social = self.social_influence * neighbor_fraction;

        let stress = ctx.temperature_anomaly
            * (1.0 + LATITUDE_STRESS_GAIN * agent.location.y.abs() / LATITUDE_EXTENT);
        let environmental = agent.awareness * stress;

        let score = weights.economic * economic
            + weights.social * social
            + weights.environmental * environmental;

        let mut p = logistic(weights.steepness * (score - weights.midpoint));
        if self.credit_constrained(agent, ctx.technology_cost) {
            p *= CREDIT_CONSTRAINED_FACTOR;
        }
        p.clamp(weights.probability_floor, weights.probability_ceiling)
    }

    /// Subsidy per unit cost once warming passes the policy threshold.
    fn policy_incentive(&self, temperature_anomaly: f64) -> f64 {
        ((temperature_anomaly - self.incentive_threshold) * self.incentive_rate).max(0.0)
    }

    /// An agent is credit constrained when it can neither buy outright nor
    /// cover twice the annual financing payment.
    fn credit_constrained(&self, agent: &Agent, technology_cost: f64) -> bool {
        let annual_payment = technology_cost / f64::from(self.financing_years);
        agent.wealth < technology_cost && agent.wealth < 2.0 * annual_payment
    }
}

/// Standard logistic, `1 / (1 + e^-x)`.
fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
