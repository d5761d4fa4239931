//! World dimensions and physics tuning
//!
//! Loaded from JSON; every field falls back to the built-in default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === World ===
    /// Screen width (pixels)
    pub width: f32,
    /// Screen height (pixels), ground included
    pub height: f32,
    /// Ground strip height
    pub ground_height: f32,

    // === Pipes ===
    /// Vertical clearance inside a pipe pair
    pub gap_size: f32,
    /// Pipe shaft width
    pub pipe_width: f32,
    /// Spawn decorative caps on the gap-facing end of each pipe
    pub pipe_caps: bool,

    // === Player ===
    pub pug_width: f32,
    pub pug_height: f32,

    // === Physics ===
    /// Gravity after the first flap (pixels/s²)
    pub gravity: f32,
    /// Vertical velocity applied by a flap (pixels/s, negative is up)
    pub flap_velocity: f32,
    /// Horizontal scroll per frame (pixels)
    pub scroll_speed: f32,

    /// Seed for pipe generation
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            ground_height: GROUND_HEIGHT,

            gap_size: GAP_SIZE,
            pipe_width: PIPE_WIDTH,
            pipe_caps: true,

            pug_width: PUG_WIDTH,
            pug_height: PUG_HEIGHT,

            gravity: GRAVITY,
            flap_velocity: FLAP_VELOCITY,
            scroll_speed: SCROLL_SPEED,

            seed: 0x5EED,
        }
    }
}

impl GameConfig {
    /// Config for a screen of the given size, defaults elsewhere
    pub fn with_screen(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values the simulation cannot work with.
    ///
    /// Short screens are accepted: the pipe generator clamps its range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("ground_height", self.ground_height),
            ("gap_size", self.gap_size),
            ("pipe_width", self.pipe_width),
            ("pug_width", self.pug_width),
            ("pug_height", self.pug_height),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be a positive number, got {value}"),
                ));
            }
        }

        for (field, value) in [
            ("gravity", self.gravity),
            ("flap_velocity", self.flap_velocity),
            ("scroll_speed", self.scroll_speed),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::invalid(field, "must be finite"));
            }
        }

        if self.ground_height >= self.height {
            return Err(ConfigError::invalid(
                "ground_height",
                format!("must be below screen height {}", self.height),
            ));
        }

        if self.gap_size >= self.playfield_height() {
            return Err(ConfigError::invalid(
                "gap_size",
                format!(
                    "must be smaller than the playfield height {}",
                    self.playfield_height()
                ),
            ));
        }

        if self.playfield_height() / 2.0 - MIN_SEGMENT_HEIGHT <= MIN_SEGMENT_HEIGHT {
            log::warn!(
                "Playfield height {} is too short for varied pipes, gap position will be fixed",
                self.playfield_height()
            );
        }

        Ok(())
    }

    /// Space above the ground that pipe pairs tile
    pub fn playfield_height(&self) -> f32 {
        self.height - self.ground_height
    }

    /// Where the player starts (screen centre)
    pub fn pug_start(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Spawn x for the pipe pair `slots_ahead` screens to the right
    pub fn pipe_spawn_x(&self, slots_ahead: u32) -> f32 {
        self.width * slots_ahead as f32 - self.pipe_width / 2.0
    }

    /// Pipes at or left of this x are off screen
    pub fn pipe_despawn_x(&self) -> f32 {
        -(self.pipe_width / 2.0)
    }

    /// Cap dimensions (width, height)
    pub fn pipe_cap_size(&self) -> (f32, f32) {
        let width = self.pipe_width + PIPE_CAP_MARGIN;
        (width, width * PIPE_CAP_ASPECT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = GameConfig::from_json(r#"{ "width": 360, "scroll_speed": 1 }"#).unwrap();
        assert_eq!(config.width, 360.0);
        assert_eq!(config.scroll_speed, 1.0);
        assert_eq!(config.gap_size, GAP_SIZE);
        assert!(config.pipe_caps);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = GameConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let err = GameConfig::from_json(r#"{ "height": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "height", .. }));

        let err = GameConfig::from_json(r#"{ "pipe_width": -5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pipe_width", .. }));
    }

    #[test]
    fn test_rejects_ground_taller_than_screen() {
        let config = GameConfig {
            ground_height: 900.0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "ground_height", .. })
        ));
    }

    #[test]
    fn test_rejects_gap_that_fills_playfield() {
        // Playfield 190 cannot hold a 200 gap
        let config = GameConfig::with_screen(400.0, 240.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "gap_size", .. })
        ));

        let err = GameConfig::from_json(r#"{ "height": 800, "ground_height": 50, "gap_size": 750 }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "gap_size", .. }));
    }

    #[test]
    fn test_smallest_valid_playfield_gives_positive_pipes() {
        use crate::sim::generate_gap;
        use rand::SeedableRng;
        use rand_pcg::Pcg32;

        let config = GameConfig::with_screen(400.0, 251.0);
        assert!(config.validate().is_ok());
        let mut rng = Pcg32::seed_from_u64(5);
        let (a, b) = generate_gap(&mut rng, config.playfield_height(), config.gap_size);
        assert!(a > 0.0 && b > 0.0, "segments {a} / {b}");
    }

    #[test]
    fn test_short_screen_is_accepted() {
        assert!(GameConfig::with_screen(400.0, 300.0).validate().is_ok());
    }

    #[test]
    fn test_spawn_positions() {
        let config = GameConfig::with_screen(400.0, 800.0);
        assert_eq!(config.pipe_spawn_x(2), 750.0);
        assert_eq!(config.pipe_spawn_x(3), 1150.0);
        assert_eq!(config.pipe_despawn_x(), -50.0);
        let (cap_w, cap_h) = config.pipe_cap_size();
        assert_eq!(cap_w, 120.0);
        assert!((cap_h - 120.0 * 95.0 / 205.0).abs() < 1e-4);
    }
}
