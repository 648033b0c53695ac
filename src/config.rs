//! Tunable parameters for the analysis engine.
//!
//! Configuration can be loaded from a JSON file or constructed in code. Every
//! field falls back to its default when absent from the file:
//!
//! ```no_run
//! use tonal::AnalyzerConfig;
//! use std::path::Path;
//!
//! let config = AnalyzerConfig::from_json_file(Path::new("tonal.json"))?;
//! # Ok::<(), tonal::TonalError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TonalError};
use crate::pipeline::extract::MAX_CLUSTERS;

/// Default number of dominant colors extracted from an image.
pub const DEFAULT_N_COLORS: usize = 5;
/// Images are downscaled to fit within this many pixels per side.
pub const DEFAULT_MAX_DIMENSION: u32 = 256;
/// Fixed k-means seed; keeps extraction reproducible.
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
/// Centroid movement threshold in sRGB [0, 1] units.
pub const DEFAULT_CONVERGENCE: f32 = 0.0025;
pub const DEFAULT_BACKGROUND_SENSITIVITY: f32 = 0.3;

/// Parameters for dominant-color extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Number of clusters (dominant colors) extracted by
    /// [`Analyzer::analyze_file`](crate::Analyzer::analyze_file)
    pub n_colors: usize,

    /// Longest image side after downscaling
    pub max_dimension: u32,

    /// Drop near-black, near-white and background pixels before clustering
    pub remove_background: bool,

    /// Background mask aggressiveness in [0, 1]
    pub background_sensitivity: f32,

    /// Seed for k-means++ initialization
    pub seed: u64,

    /// K-means iteration cap
    pub max_iterations: usize,

    /// K-means convergence threshold
    pub convergence: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            n_colors: DEFAULT_N_COLORS,
            max_dimension: DEFAULT_MAX_DIMENSION,
            remove_background: true,
            background_sensitivity: DEFAULT_BACKGROUND_SENSITIVITY,
            seed: DEFAULT_SEED,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence: DEFAULT_CONVERGENCE,
        }
    }
}

impl AnalyzerConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TonalError::io(path, e))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the extractor cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CLUSTERS).contains(&self.n_colors) {
            return Err(TonalError::invalid_parameter(
                "n_colors",
                self.n_colors,
                format!("must be within [1, {MAX_CLUSTERS}]"),
            ));
        }
        if self.max_dimension == 0 {
            return Err(TonalError::invalid_parameter(
                "max_dimension",
                self.max_dimension,
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.background_sensitivity) {
            return Err(TonalError::invalid_parameter(
                "background_sensitivity",
                self.background_sensitivity,
                "must be within [0, 1]",
            ));
        }
        if self.max_iterations == 0 {
            return Err(TonalError::invalid_parameter(
                "max_iterations",
                self.max_iterations,
                "must be at least 1",
            ));
        }
        if self.convergence.is_nan() || self.convergence < 0.0 {
            return Err(TonalError::invalid_parameter(
                "convergence",
                self.convergence,
                "must be non-negative",
            ));
        }
        Ok(())
    }
}
