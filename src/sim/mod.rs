/// Climate-economy feedback loop shared by every agent decision.
pub mod climate;
pub mod engine;
/// Cross-run reduction into mean trajectories and confidence bands.
pub mod ensemble;
pub mod monte_carlo;
pub mod types;
