// src/bsp/config.rs
use serde::{Deserialize, Serialize};

use crate::bsp::error::{BspError, Result};
use crate::bsp::{BSP_DEPTH_LIMIT, DEFAULT_SPLIT_COST_FACTOR, DIST_EPSILON, MAX_CANDIDATES};

/// Tuning for partition selection and the numeric tolerances of the build.
///
/// The partition cost is
/// `split_penalty * split_cost_factor * splits + balance_penalty * |front - back|`,
/// less `twin_bonus` when both sides of the candidate's wall are in the set.
/// Raising the split weight trades balance for fewer split half-edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BspConfig {
    pub split_cost_factor: f64,
    pub split_penalty: f64,
    pub balance_penalty: f64,
    pub twin_bonus: f64,
    /// Number of valid candidates scored per set before settling.
    pub max_candidates: usize,
    pub depth_limit: usize,
    /// Distance (map units) under which a point counts as on a line.
    pub epsilon: f64,
}

impl Default for BspConfig {
    fn default() -> Self {
        BspConfig {
            split_cost_factor: DEFAULT_SPLIT_COST_FACTOR,
            split_penalty: 1.0,
            balance_penalty: 1.0,
            twin_bonus: 1.0,
            max_candidates: MAX_CANDIDATES,
            depth_limit: BSP_DEPTH_LIMIT,
            epsilon: DIST_EPSILON,
        }
    }
}

impl BspConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BspConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("split_cost_factor", self.split_cost_factor),
            ("split_penalty", self.split_penalty),
            ("balance_penalty", self.balance_penalty),
            ("twin_bonus", self.twin_bonus),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(BspError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(BspError::InvalidConfig(format!(
                "epsilon must be positive (got {})",
                self.epsilon
            )));
        }
        if self.max_candidates == 0 {
            return Err(BspError::InvalidConfig("max_candidates must be at least 1".into()));
        }
        if self.depth_limit == 0 {
            return Err(BspError::InvalidConfig("depth_limit must be at least 1".into()));
        }
        Ok(())
    }

    /// Cost of a single split, after applying the external factor.
    pub fn split_weight(&self) -> f64 {
        self.split_penalty * self.split_cost_factor
    }
}
