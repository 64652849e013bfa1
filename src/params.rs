//! Uncertain model parameters and the per-run Monte Carlo sample.
//!
//! Each run of the batch draws one [`ParameterSample`] from the configured
//! distributions before any agent exists. Every parameter carries a hard
//! physical bound with a fixed out-of-bounds policy: `Resample` redraws until
//! the value lands inside the bound (capped at [`MAX_RESAMPLE_ATTEMPTS`]),
//! `Clamp` pins the value to the nearest bound edge.

use rand::rngs::StdRng;
use rand_distr::{Beta, Distribution, LogNormal, Normal};
use serde::Deserialize;

use crate::error::{ConfigError, SamplingError};

/// Upper limit on redraws for `Resample`-policy parameters before the run
/// fails with [`SamplingError::OutOfBounds`].
pub const MAX_RESAMPLE_ATTEMPTS: u32 = 100;

/// A univariate distribution a parameter may be drawn from.
///
/// Spelled in TOML as an inline table, e.g.
/// `learning_rate = { family = "normal", mean = 0.15, std = 0.03 }`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Dist {
    Normal { mean: f64, std: f64 },
    LogNormal { mu: f64, sigma: f64 },
    Beta { alpha: f64, beta: f64 },
}

impl Dist {
    /// Checks the shape parameters, returning the constraint that failed.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Dist::Normal { mean, std } => {
                if !mean.is_finite() {
                    return Err(format!("mean must be finite, got {mean}"));
                }
                if !std.is_finite() || std < 0.0 {
                    return Err(format!("std must be finite and >= 0, got {std}"));
                }
                Ok(())
            }
            Dist::LogNormal { mu, sigma } => {
                if !mu.is_finite() {
                    return Err(format!("mu must be finite, got {mu}"));
                }
                if !sigma.is_finite() || sigma < 0.0 {
                    return Err(format!("sigma must be finite and >= 0, got {sigma}"));
                }
                Ok(())
            }
            Dist::Beta { alpha, beta } => {
                if !alpha.is_finite() || alpha <= 0.0 {
                    return Err(format!("alpha must be finite and > 0, got {alpha}"));
                }
                if !beta.is_finite() || beta <= 0.0 {
                    return Err(format!("beta must be finite and > 0, got {beta}"));
                }
                Ok(())
            }
        }
    }

    /// Draws one value, or the reason the shape parameters are invalid.
    pub(crate) fn try_sample(&self, rng: &mut StdRng) -> Result<f64, String> {
        match *self {
            Dist::Normal { mean, std } => Normal::new(mean, std)
                .map(|d| d.sample(rng))
                .map_err(|e| e.to_string()),
            Dist::LogNormal { mu, sigma } => LogNormal::new(mu, sigma)
                .map(|d| d.sample(rng))
                .map_err(|e| e.to_string()),
            Dist::Beta { alpha, beta } => Beta::new(alpha, beta)
                .map(|d| d.sample(rng))
                .map_err(|e| e.to_string()),
        }
    }
}

/// What happens when a draw falls outside the parameter's hard bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundPolicy {
    /// Redraw, up to [`MAX_RESAMPLE_ATTEMPTS`] times.
    Resample,
    /// Pin to the nearest bound edge.
    Clamp,
}

/// Hard physical bound for one named parameter. Bounds and policies are fixed
/// per parameter; only the distributions are configurable.
#[derive(Debug, Clone, Copy)]
struct Bound {
    name: &'static str,
    lo: f64,
    hi: f64,
    policy: BoundPolicy,
}

const LEARNING_RATE: Bound = Bound {
    name: "learning_rate",
    lo: 0.0,
    hi: 0.5,
    policy: BoundPolicy::Resample,
};
const AWARENESS_ALPHA: Bound = Bound {
    name: "awareness_alpha",
    lo: 0.1,
    hi: 10.0,
    policy: BoundPolicy::Resample,
};
const AWARENESS_BETA: Bound = Bound {
    name: "awareness_beta",
    lo: 0.1,
    hi: 20.0,
    policy: BoundPolicy::Resample,
};
const HOUSEHOLD_WEALTH_MU: Bound = Bound {
    name: "household_wealth_mu",
    lo: 8.0,
    hi: 14.0,
    policy: BoundPolicy::Clamp,
};
const TEMPERATURE_SENSITIVITY: Bound = Bound {
    name: "temperature_sensitivity",
    lo: 0.0,
    hi: 5.0e-6,
    policy: BoundPolicy::Resample,
};
const SOCIAL_INFLUENCE: Bound = Bound {
    name: "social_influence",
    lo: 0.0,
    hi: 1.0,
    policy: BoundPolicy::Clamp,
};
const CARBON_PRICE_BASE: Bound = Bound {
    name: "carbon_price_base",
    lo: 0.0,
    hi: 200.0,
    policy: BoundPolicy::Clamp,
};
const CARBON_PRICE_SLOPE: Bound = Bound {
    name: "carbon_price_slope",
    lo: 0.0,
    hi: 100.0,
    policy: BoundPolicy::Clamp,
};

/// Distribution for every uncertain parameter, one draw per run.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterConfig {
    /// Learning-curve exponent for the technology cost decline.
    pub learning_rate: Dist,
    /// Alpha shape of the per-agent awareness Beta distribution.
    pub awareness_alpha: Dist,
    /// Beta shape of the per-agent awareness Beta distribution.
    pub awareness_beta: Dist,
    /// Log-scale mean of household wealth.
    pub household_wealth_mu: Dist,
    /// Degrees of warming per tonne of cumulative emissions.
    pub temperature_sensitivity: Dist,
    /// Weight of the adopted-neighbor fraction in the social driver.
    pub social_influence: Dist,
    /// Carbon price at the baseline temperature anomaly.
    pub carbon_price_base: Dist,
    /// Carbon price increase per degree of warming above baseline.
    pub carbon_price_slope: Dist,
}

impl Default for ParameterConfig {
    fn default() -> Self {
        Self {
            learning_rate: Dist::Normal {
                mean: 0.15,
                std: 0.03,
            },
            awareness_alpha: Dist::Normal {
                mean: 2.0,
                std: 0.4,
            },
            awareness_beta: Dist::Normal {
                mean: 5.0,
                std: 1.0,
            },
            household_wealth_mu: Dist::Normal {
                mean: 11.0,
                std: 1.0,
            },
            temperature_sensitivity: Dist::Normal {
                mean: 1.5e-6,
                std: 3.0e-7,
            },
            social_influence: Dist::Normal {
                mean: 0.3,
                std: 0.06,
            },
            carbon_price_base: Dist::Normal {
                mean: 30.0,
                std: 6.0,
            },
            carbon_price_slope: Dist::Normal {
                mean: 20.0,
                std: 4.0,
            },
        }
    }
}

impl ParameterConfig {
    /// Checks every distribution, reporting dotted field paths.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let fields = [
            ("parameters.learning_rate", &self.learning_rate),
            ("parameters.awareness_alpha", &self.awareness_alpha),
            ("parameters.awareness_beta", &self.awareness_beta),
            ("parameters.household_wealth_mu", &self.household_wealth_mu),
            (
                "parameters.temperature_sensitivity",
                &self.temperature_sensitivity,
            ),
            ("parameters.social_influence", &self.social_influence),
            ("parameters.carbon_price_base", &self.carbon_price_base),
            ("parameters.carbon_price_slope", &self.carbon_price_slope),
        ];
        for (field, dist) in fields {
            if let Err(message) = dist.validate() {
                errors.push(ConfigError::new(field, message));
            }
        }
        errors
    }
}

/// One run's worth of uncertain parameters, drawn up front and held fixed for
/// all 30 simulated years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSample {
    pub learning_rate: f64,
    pub awareness_alpha: f64,
    pub awareness_beta: f64,
    pub household_wealth_mu: f64,
    pub temperature_sensitivity: f64,
    pub social_influence: f64,
    pub carbon_price_base: f64,
    pub carbon_price_slope: f64,
}

/// Draws the full parameter sample for `run`. Field order is fixed so the
/// stream of RNG draws, and therefore the whole run, is reproducible.
pub fn draw_sample(
    config: &ParameterConfig,
    run: usize,
    rng: &mut StdRng,
) -> Result<ParameterSample, SamplingError> {
    Ok(ParameterSample {
        learning_rate: draw(&config.learning_rate, LEARNING_RATE, run, rng)?,
        awareness_alpha: draw(&config.awareness_alpha, AWARENESS_ALPHA, run, rng)?,
        awareness_beta: draw(&config.awareness_beta, AWARENESS_BETA, run, rng)?,
        household_wealth_mu: draw(&config.household_wealth_mu, HOUSEHOLD_WEALTH_MU, run, rng)?,
        temperature_sensitivity: draw(
            &config.temperature_sensitivity,
            TEMPERATURE_SENSITIVITY,
            run,
            rng,
        )?,
        social_influence: draw(&config.social_influence, SOCIAL_INFLUENCE, run, rng)?,
        carbon_price_base: draw(&config.carbon_price_base, CARBON_PRICE_BASE, run, rng)?,
        carbon_price_slope: draw(&config.carbon_price_slope, CARBON_PRICE_SLOPE, run, rng)?,
    })
}

fn draw(dist: &Dist, bound: Bound, run: usize, rng: &mut StdRng) -> Result<f64, SamplingError> {
    match bound.policy {
        BoundPolicy::Clamp => {
            let value = try_sample(dist, bound, run, rng)?;
            Ok(value.clamp(bound.lo, bound.hi))
        }
        BoundPolicy::Resample => {
            for _ in 0..MAX_RESAMPLE_ATTEMPTS {
                let value = try_sample(dist, bound, run, rng)?;
                if value >= bound.lo && value <= bound.hi {
                    return Ok(value);
                }
            }
            Err(SamplingError::OutOfBounds {
                parameter: bound.name,
                run,
                lo: bound.lo,
                hi: bound.hi,
                attempts: MAX_RESAMPLE_ATTEMPTS,
            })
        }
    }
}

fn try_sample(
    dist: &Dist,
    bound: Bound,
    run: usize,
    rng: &mut StdRng,
) -> Result<f64, SamplingError> {
    dist.try_sample(rng)
        .map_err(|reason| SamplingError::InvalidDistribution {
            parameter: bound.name,
            run,
            reason,
        })
}
