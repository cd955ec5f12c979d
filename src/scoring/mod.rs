pub mod config;
pub mod engine;
pub mod factors;
pub mod tables;
pub mod tier;
pub mod validation;

pub use config::*;
pub use engine::{DimensionContribution, QualityScorer, ScoredProject, SubScores};
pub use tables::{ReferenceTables, TypeRisk};
pub use tier::QualityTier;
pub use validation::validate_scoring;
