//! Simulation parameters
//!
//! Owned by whoever drives the config panel; the kernel only ever sees a
//! validated copy (see `World::apply_config_change`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Reasons a config is refused by the kernel
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("arena half-extent must be positive, got {0}")]
    NonPositiveArena(f32),
    #[error("body radius must be positive, got {0}")]
    NonPositiveRadius(f32),
    #[error("body speed must not be negative, got {0}")]
    NegativeSpeed(f32),
    #[error("body radius {radius} does not fit inside arena half-extent {half_extent}")]
    RadiusTooLarge { radius: f32, half_extent: f32 },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Mutable simulation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Half the edge length of the square arena, centered on the origin
    pub arena_half_extent: f32,
    /// Radius shared by every body
    pub body_radius: f32,
    /// Speed every body moves at
    pub body_speed: f32,
    /// Whether the renderer should receive instances
    pub render_enabled: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena_half_extent: DEFAULT_ARENA_HALF_EXTENT,
            body_radius: DEFAULT_BODY_RADIUS,
            body_speed: DEFAULT_BODY_SPEED,
            render_enabled: true,
        }
    }
}

impl SimConfig {
    /// Check the invariants the kernel relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("arena_half_extent", self.arena_half_extent),
            ("body_radius", self.body_radius),
            ("body_speed", self.body_speed),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        if self.arena_half_extent <= 0.0 {
            return Err(ConfigError::NonPositiveArena(self.arena_half_extent));
        }
        if self.body_radius <= 0.0 {
            return Err(ConfigError::NonPositiveRadius(self.body_radius));
        }
        if self.body_speed < 0.0 {
            return Err(ConfigError::NegativeSpeed(self.body_speed));
        }
        if self.body_radius >= self.arena_half_extent {
            return Err(ConfigError::RadiusTooLarge {
                radius: self.body_radius,
                half_extent: self.arena_half_extent,
            });
        }
        Ok(())
    }

    /// Clamp every field into its panel range, then pull the radius just
    /// under the half-extent if it would not fit inside the arena
    ///
    /// Non-finite inputs fall back to the defaults. A config that already
    /// validates comes back unchanged.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let clamp = |value: f32, (lo, hi): (f32, f32), fallback: f32| {
            if value.is_finite() {
                value.clamp(lo, hi)
            } else {
                fallback
            }
        };

        let arena_half_extent = clamp(
            self.arena_half_extent,
            ARENA_HALF_EXTENT_RANGE,
            defaults.arena_half_extent,
        );
        let mut body_radius = clamp(self.body_radius, BODY_RADIUS_RANGE, defaults.body_radius);
        if body_radius >= arena_half_extent {
            body_radius = arena_half_extent * (1.0 - f32::EPSILON);
        }
        let body_speed = clamp(self.body_speed, BODY_SPEED_RANGE, defaults.body_speed);

        Self {
            arena_half_extent,
            body_radius,
            body_speed,
            render_enabled: self.render_enabled,
        }
    }

    /// Edge length of one spatial grid cell
    #[inline]
    pub fn cell_size(&self) -> f32 {
        (self.body_radius * 2.0).max(MIN_CELL_SIZE)
    }

    /// Distance below which two bodies overlap
    #[inline]
    pub fn contact_distance(&self) -> f32 {
        self.body_radius * 2.0
    }

    /// Innermost coordinate a body center may occupy on either axis
    #[inline]
    pub fn inner_limit(&self) -> f32 {
        self.arena_half_extent - self.body_radius
    }

    /// Parse a (possibly partial) JSON document; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
