//! Domain models for the tier simulator

pub mod group;
pub mod population;

// Re-exports
pub use group::Group;
pub use population::{Population, PopulationError, CAPITAL_MAX, CAPITAL_MIN};
