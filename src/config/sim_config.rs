use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::constants;
use crate::error::{FreePlayError, Result};
use crate::math::Real;

/// Parameters for the voice-reactive ball field.
///
/// Every field is optional in a TOML file; missing keys keep their defaults.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Height of the resting surface above the container's bottom edge.
    pub ground_offset: Real,

    /// Per-frame vertical velocity delta (negative pulls down).
    pub gravity: Real,

    /// Vertical velocity retained on a floor bounce (0.0 to 1.0)
    pub bounce_damping: Real,

    /// Horizontal velocity retained on a wall bounce (0.0 to 1.0)
    pub wall_damping: Real,

    /// Upward velocity given at the quietest gated volume.
    pub impulse_min: Real,

    /// Upward velocity given at full volume.
    pub impulse_max: Real,

    /// Raw loudness that maps to normalized 0.
    pub volume_threshold_min: Real,

    /// Raw loudness that maps to normalized 1.
    pub volume_threshold_max: Real,

    /// Smallest ball diameter.
    pub ball_size_min: Real,

    /// Largest ball diameter.
    pub ball_size_max: Real,

    pub ball_count: usize,

    /// Random extra height above the ground for freshly spawned balls.
    pub spawn_height_variation: Real,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ground_offset: constants::GROUND_OFFSET,
            gravity: constants::GRAVITY,
            bounce_damping: constants::BOUNCE_DAMPING,
            wall_damping: constants::WALL_DAMPING,
            impulse_min: constants::IMPULSE_MIN,
            impulse_max: constants::IMPULSE_MAX,
            volume_threshold_min: constants::VOLUME_THRESHOLD_MIN,
            volume_threshold_max: constants::VOLUME_THRESHOLD_MAX,
            ball_size_min: constants::BALL_SIZE_MIN,
            ball_size_max: constants::BALL_SIZE_MAX,
            ball_count: constants::BALL_COUNT,
            spawn_height_variation: constants::SPAWN_HEIGHT_VARIATION,
        }
    }
}

impl SimulationConfig {
    /// Parse a TOML overlay and validate the result.
    ///
    /// # Errors
    ///
    /// `ConfigParse` on malformed TOML, `InvalidConfig` when an invariant fails.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| FreePlayError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML configuration file.
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded simulation config");
        Ok(config)
    }

    /// Check every parameter invariant.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        let reals = [
            ("ground_offset", self.ground_offset),
            ("gravity", self.gravity),
            ("bounce_damping", self.bounce_damping),
            ("wall_damping", self.wall_damping),
            ("impulse_min", self.impulse_min),
            ("impulse_max", self.impulse_max),
            ("volume_threshold_min", self.volume_threshold_min),
            ("volume_threshold_max", self.volume_threshold_max),
            ("ball_size_min", self.ball_size_min),
            ("ball_size_max", self.ball_size_max),
            ("spawn_height_variation", self.spawn_height_variation),
        ];
        if let Some((name, _)) = reals.iter().find(|(_, value)| !value.is_finite()) {
            return Err(invalid(format!("{name} must be finite")));
        }

        if self.impulse_min > self.impulse_max {
            return Err(invalid(format!(
                "impulse_min ({}) exceeds impulse_max ({})",
                self.impulse_min, self.impulse_max
            )));
        }
        if self.volume_threshold_min >= self.volume_threshold_max {
            return Err(invalid(format!(
                "volume_threshold_min ({}) must be below volume_threshold_max ({})",
                self.volume_threshold_min, self.volume_threshold_max
            )));
        }
        for (name, damping) in [
            ("bounce_damping", self.bounce_damping),
            ("wall_damping", self.wall_damping),
        ] {
            if !(0.0..=1.0).contains(&damping) {
                return Err(invalid(format!("{name} ({damping}) must lie in [0, 1]")));
            }
        }
        if self.gravity > 0.0 {
            return Err(invalid(format!("gravity ({}) must not point up", self.gravity)));
        }
        if self.ball_size_min <= 0.0 || self.ball_size_min > self.ball_size_max {
            return Err(invalid(format!(
                "ball sizes must satisfy 0 < min ({}) <= max ({})",
                self.ball_size_min, self.ball_size_max
            )));
        }
        if !(1..=constants::MAX_BALL_COUNT).contains(&self.ball_count) {
            return Err(invalid(format!(
                "ball_count ({}) must lie in [1, {}]",
                self.ball_count,
                constants::MAX_BALL_COUNT
            )));
        }
        if self.spawn_height_variation < 0.0 {
            return Err(invalid("spawn_height_variation must not be negative".to_string()));
        }
        Ok(())
    }

    pub fn with_ball_count(mut self, count: usize) -> Self {
        self.ball_count = count;
        self
    }

    pub fn with_impulse_range(mut self, min: Real, max: Real) -> Self {
        self.impulse_min = min;
        self.impulse_max = max;
        self
    }

    pub fn with_volume_thresholds(mut self, min: Real, max: Real) -> Self {
        self.volume_threshold_min = min;
        self.volume_threshold_max = max;
        self
    }

    pub fn with_damping(mut self, bounce: Real, wall: Real) -> Self {
        self.bounce_damping = bounce;
        self.wall_damping = wall;
        self
    }
}

fn invalid(message: String) -> FreePlayError {
    FreePlayError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_impulse_range_is_rejected() {
        let config = SimulationConfig::default().with_impulse_range(50.0, 10.0);
        assert!(matches!(
            config.validate(),
            Err(FreePlayError::InvalidConfig(_))
        ));
    }

    #[test]
    fn equal_volume_thresholds_are_rejected() {
        let config = SimulationConfig::default().with_volume_thresholds(40.0, 40.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn damping_outside_unit_interval_is_rejected() {
        let config = SimulationConfig::default().with_damping(0.8, 1.2);
        assert_eq!(config.wall_damping, 1.2);
        assert!(config.validate().is_err());
        assert!(SimulationConfig::default().with_damping(-0.1, 0.9).validate().is_err());
        assert!(SimulationConfig::default().with_damping(0.0, 1.0).validate().is_ok());
    }

    #[test]
    fn zero_balls_is_rejected() {
        assert!(SimulationConfig::default().with_ball_count(0).validate().is_err());
    }

    #[test]
    fn ball_count_above_limit_is_rejected() {
        let at_limit = SimulationConfig::default().with_ball_count(constants::MAX_BALL_COUNT);
        assert!(at_limit.validate().is_ok());

        for count in [constants::MAX_BALL_COUNT + 1, usize::MAX] {
            let config = SimulationConfig::default().with_ball_count(count);
            assert!(matches!(
                config.validate(),
                Err(FreePlayError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn upward_gravity_is_rejected() {
        let config = SimulationConfig {
            gravity: 0.5,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());

        let weightless = SimulationConfig {
            gravity: 0.0,
            ..SimulationConfig::default()
        };
        assert!(weightless.validate().is_ok());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        for source in ["gravity = nan", "impulse_max = inf", "ground_offset = -inf"] {
            let result = SimulationConfig::from_toml_str(source);
            assert!(
                matches!(result, Err(FreePlayError::InvalidConfig(_))),
                "{source} accepted"
            );
        }
    }

    #[test]
    fn ball_sizes_must_be_positive_and_ordered() {
        let zero = SimulationConfig {
            ball_size_min: 0.0,
            ..SimulationConfig::default()
        };
        assert!(zero.validate().is_err());

        let inverted = SimulationConfig {
            ball_size_min: 60.0,
            ball_size_max: 30.0,
            ..SimulationConfig::default()
        };
        assert!(inverted.validate().is_err());

        let uniform = SimulationConfig {
            ball_size_min: 40.0,
            ball_size_max: 40.0,
            ..SimulationConfig::default()
        };
        assert!(uniform.validate().is_ok());
    }

    #[test]
    fn negative_spawn_height_variation_is_rejected() {
        let config = SimulationConfig {
            spawn_height_variation: -1.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let path = std::env::temp_dir().join("voicebounce-no-such-config.toml");
        let result = SimulationConfig::from_toml_file(&path);
        assert!(matches!(result, Err(FreePlayError::Io(_))));
    }

    #[test]
    fn toml_overlay_keeps_unspecified_defaults() {
        let config = SimulationConfig::from_toml_str("ball_count = 12\ngravity = -0.5\n").unwrap();
        assert_eq!(config.ball_count, 12);
        assert_eq!(config.gravity, -0.5);
        assert_eq!(config.impulse_max, constants::IMPULSE_MAX);
    }

    #[test]
    fn toml_with_invalid_values_is_rejected() {
        let result = SimulationConfig::from_toml_str("impulse_min = 60.0\n");
        assert!(matches!(result, Err(FreePlayError::InvalidConfig(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = SimulationConfig::from_toml_str("ball_count = \"many\"");
        assert!(matches!(result, Err(FreePlayError::ConfigParse(_))));
    }
}
