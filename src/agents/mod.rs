//! Agent population, social graph, and adoption decision model.

pub mod adoption;
pub mod network;
pub mod population;
pub mod types;

pub use adoption::{AdoptionModel, YearContext};
pub use network::SocialNetwork;
pub use population::{Population, CITY_CENTROIDS};
pub use types::{Agent, AgentId, AgentKind, Point};
