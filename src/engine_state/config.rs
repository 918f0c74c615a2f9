//! Session configuration, loadable from JSON. Every field has a default, so an empty
//! object is a valid configuration.

use std::fs;
use std::path::Path;

use cgmath::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dimension::Dimension;
use super::voxels::generation::FeatureOdds;
use super::voxels::streaming::{DEFAULT_RENDER_DISTANCE, MAX_RENDER_DISTANCE};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed; drawn at random when absent.
    pub seed: Option<u64>,
    /// Chebyshev radius of the resident neighbourhood, in chunks.
    pub render_distance: i32,
    /// Chunks farther than this are evicted. `None` keeps everything.
    pub keep_alive_distance: Option<i32>,
    /// Background generation workers; 0 streams synchronously.
    pub worker_count: usize,
    /// Where the observer lands after a dimension transition.
    pub spawn_point: [f32; 3],
    pub initial_observer: [f32; 3],
    pub initial_dimension: Dimension,
    /// Draw fresh feature randomness on every generation instead of deriving it from
    /// the seed.
    pub reroll_features: bool,
    pub feature_odds: FeatureOdds,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            seed: None,
            render_distance: DEFAULT_RENDER_DISTANCE,
            keep_alive_distance: None,
            worker_count: 4,
            spawn_point: [0.0, 40.0, 0.0],
            initial_observer: [0.0, 35.0, 0.0],
            initial_dimension: Dimension::Overworld,
            reroll_features: false,
            feature_odds: FeatureOdds::default(),
        }
    }
}

impl WorldConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::info!("Loading world configuration from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Checks the cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=MAX_RENDER_DISTANCE).contains(&self.render_distance) {
            return Err(ConfigError::Invalid(format!(
                "render_distance must be within [0, {MAX_RENDER_DISTANCE}], got {}",
                self.render_distance
            )));
        }
        if let Some(keep_alive) = self.keep_alive_distance {
            if keep_alive < self.render_distance {
                return Err(ConfigError::Invalid(format!(
                    "keep_alive_distance {} is smaller than render_distance {}",
                    keep_alive, self.render_distance
                )));
            }
        }

        let odds = &self.feature_odds;
        let probabilities = [
            ("diamond_ore", odds.diamond_ore),
            ("iron_ore", odds.iron_ore),
            ("coal_ore", odds.coal_ore),
            ("tree", odds.tree),
            ("hut", odds.hut),
            ("soul_sand", odds.soul_sand),
            ("glowstone", odds.glowstone),
            ("magma", odds.magma),
            ("purpur_pillar", odds.purpur_pillar),
        ];
        for (name, probability) in probabilities {
            if !(0.0..=1.0).contains(&probability) {
                return Err(ConfigError::Invalid(format!(
                    "feature_odds.{name} must be within [0, 1], got {probability}"
                )));
            }
        }

        Ok(())
    }

    pub fn spawn_point(&self) -> Point3<f32> {
        Point3::from(self.spawn_point)
    }

    pub fn initial_observer(&self) -> Point3<f32> {
        Point3::from(self.initial_observer)
    }
}
