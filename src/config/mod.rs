//! Tunable simulation constants, loaded from a RON file at startup.
//!
//! Every field has a default, so a config file only needs to list the values
//! it overrides. A missing file means "all defaults"; a malformed one is fatal.

use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;

use crate::data::DataError;
use crate::shared::probability;

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Probability that a new day is rainy.
    pub rain_chance: f64,
    /// Player speed in world units per second.
    pub player_speed: f32,
    pub tool_use_secs: f32,
    pub tool_switch_secs: f32,
    pub seed_use_secs: f32,
    pub seed_switch_secs: f32,
    /// Player animation frames per second.
    pub animation_fps: f32,
    pub water_fps: f32,
    /// Axe hits a tree takes before it is felled.
    pub tree_health: u8,
    pub tree_wood_yield: u32,
    /// Chance that each apple anchor carries an apple after a day-advance.
    pub apple_chance: f64,
    /// Day-transition brightness change per second (1.0 = full fade in one second).
    pub transition_speed: f32,
    /// Sky tint decrease per second, on the 0–255 colour scale.
    pub sky_fade_rate: f32,
    pub starting_money: u32,
    pub starting_seeds: u32,
    /// Fixed seed for the simulation RNG; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rain_chance: 0.3,
            player_speed: 200.0,
            tool_use_secs: 0.35,
            tool_switch_secs: 0.2,
            seed_use_secs: 0.35,
            seed_switch_secs: 0.2,
            animation_fps: 4.0,
            water_fps: 5.0,
            tree_health: 3,
            tree_wood_yield: 1,
            apple_chance: 0.2,
            transition_speed: 1.0,
            sky_fade_rate: 2.0,
            starting_money: 200,
            starting_seeds: 5,
            rng_seed: None,
        }
    }
}

impl SimConfig {
    pub fn from_ron(text: &str) -> Result<Self, DataError> {
        let config: SimConfig = ron::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Read the config at `path`, falling back to defaults if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("[Config] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    /// Clamp values that would break the simulation back into range.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        for (name, chance) in [
            ("rain_chance", &mut self.rain_chance),
            ("apple_chance", &mut self.apple_chance),
        ] {
            if !(0.0..=1.0).contains(chance) {
                warn!("[Config] {name} {chance} outside 0..=1, clamping");
                *chance = probability(*chance);
            }
        }

        for (name, value, fallback) in [
            ("player_speed", &mut self.player_speed, defaults.player_speed),
            ("tool_use_secs", &mut self.tool_use_secs, defaults.tool_use_secs),
            ("tool_switch_secs", &mut self.tool_switch_secs, defaults.tool_switch_secs),
            ("seed_use_secs", &mut self.seed_use_secs, defaults.seed_use_secs),
            ("seed_switch_secs", &mut self.seed_switch_secs, defaults.seed_switch_secs),
            ("animation_fps", &mut self.animation_fps, defaults.animation_fps),
            ("water_fps", &mut self.water_fps, defaults.water_fps),
            ("transition_speed", &mut self.transition_speed, defaults.transition_speed),
        ] {
            if !(*value > 0.0) {
                warn!("[Config] {name} must be positive, using {fallback}");
                *value = fallback;
            }
        }

        if self.tree_health == 0 {
            warn!("[Config] tree_health must be at least 1");
            self.tree_health = 1;
        }
        if self.sky_fade_rate < 0.0 {
            self.sky_fade_rate = 0.0;
        }
        self
    }
}
