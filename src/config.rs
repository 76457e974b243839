//! Planner configuration, loadable from TOML.
//!
//! Every section is optional; missing keys fall back to their defaults.
//!
//! ```toml
//! [pathfinder]
//! step = 1.0
//!
//! [optimizer]
//! population_size = 80
//! seed = 42
//!
//! [optimizer.weights]
//! no_fly_penalty = 500.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PlannerError};
use crate::optimizer::OptimizerConfig;
use crate::pathfinder::PathfinderConfig;
use crate::solver::AssignOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub pathfinder: PathfinderConfig,
    pub assignment: AssignOptions,
    pub optimizer: OptimizerConfig,
}

impl PlannerConfig {
    /// Defaults for every section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Fixes the optimizer seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.optimizer.seed = Some(seed);
        self
    }

    /// Checks every section, reporting the first bad value.
    pub fn validate(&self) -> Result<(), PlannerError> {
        let pathfinder = &self.pathfinder;
        if !(pathfinder.step > 0.0 && pathfinder.step.is_finite()) {
            return Err(PlannerError::InvalidConfig(format!(
                "pathfinder.step must be positive, got {}",
                pathfinder.step
            )));
        }
        if pathfinder.goal_tolerance < 0.0 {
            return Err(PlannerError::InvalidConfig(format!(
                "pathfinder.goal_tolerance must not be negative, got {}",
                pathfinder.goal_tolerance
            )));
        }
        let bounds = &pathfinder.bounds;
        if bounds.min.x > bounds.max.x || bounds.min.y > bounds.max.y {
            return Err(PlannerError::InvalidConfig("pathfinder.bounds min exceeds max".to_string()));
        }
        if self.assignment.weight_penalty_factor < 0.0 {
            return Err(PlannerError::InvalidConfig(
                "assignment.weight_penalty_factor must not be negative".to_string(),
            ));
        }
        self.optimizer.validate()
    }
}
