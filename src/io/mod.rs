/// CSV writers for summaries and raw trajectories.
pub mod export;
