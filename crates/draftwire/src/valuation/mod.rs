// Valuation engine: candidate pool, min-max normalization, weighted scoring,
// waiver targets.

pub mod candidates;
pub mod normalize;
pub mod scoring;
pub mod targets;
