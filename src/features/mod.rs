//! Features Module - Feature Extraction Engine
//!
//! Turns a raw telemetry sequence into the fixed 10-field vector the
//! rest of the pipeline consumes. Layout is versioned (see `layout.rs`);
//! extraction is a pure, deterministic function.

pub mod extract;
pub mod layout;
pub mod spectral;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use extract::extract;
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::{FeatureVector, SpectralFeatures, StatisticalFeatures, TemporalFeatures};
