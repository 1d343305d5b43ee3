//! Simulation tunables
//!
//! Every constant the physics, the clock and the viewport depend on lives in
//! [`LayoutConfig`], passed to the engine at construction. Two engines built
//! from different configs never interfere with each other.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default numerator of the `k / d²` repulsion
pub const DEFAULT_REPULSION: f32 = 30_000.0;

/// Default Hooke constant for edge springs
pub const DEFAULT_SPRING: f32 = 0.08;

/// Default spring rest length
pub const DEFAULT_REST_LENGTH: f32 = 200.0;

/// Default grid cell size, which is also the repulsion cutoff radius
pub const DEFAULT_CELL_SIZE: f32 = 400.0;

/// Configuration for a layout engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Repulsion strength: force magnitude is `repulsion_constant / distance²`
    pub repulsion_constant: f32,
    /// Spring strength along edges
    pub spring_constant: f32,
    /// Edge length at which the spring force is zero
    pub rest_length: f32,
    /// Fraction of the offset to `center` applied to each unpinned node per tick
    pub gravity: f32,
    /// World point the gravity pulls toward
    pub center: Vec2,
    /// Spatial grid cell size; pairs farther apart than this do not repel
    pub cell_size: f32,
    /// Velocity multiplier applied every tick
    pub damping: f32,
    /// Per-component velocity clamp
    pub max_velocity: f32,
    /// Multiplicative temperature decay per active tick
    pub temperature_decay: f32,
    /// Temperature below which the clock goes idle
    pub idle_temperature: f32,
    /// Max node speed below which the layout counts as settled
    pub settle_speed: f32,
    /// Temperature floor applied when the user pans or zooms
    pub interaction_bump: f32,
    /// Half-extent of the square around `center` where new nodes spawn
    pub spawn_radius: f32,
    /// Smallest viewport scale
    pub min_scale: f32,
    /// Largest viewport scale
    pub max_scale: f32,
    /// Screen-space margin beyond the surface before elements are flagged as culled
    pub cull_margin: f32,
    /// Display radius for primary nodes
    pub primary_radius: f32,
    /// Display radius for secondary nodes
    pub secondary_radius: f32,
    /// Seed for spawn positions (None = seeded from entropy)
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            repulsion_constant: DEFAULT_REPULSION,
            spring_constant: DEFAULT_SPRING,
            rest_length: DEFAULT_REST_LENGTH,
            gravity: 0.002,
            center: Vec2::ZERO,
            cell_size: DEFAULT_CELL_SIZE,
            damping: 0.9,
            max_velocity: 40.0,
            temperature_decay: 0.985,
            idle_temperature: 0.005,
            settle_speed: 0.05,
            interaction_bump: 0.3,
            spawn_radius: 300.0,
            min_scale: 0.1,
            max_scale: 10.0,
            cull_margin: 64.0,
            primary_radius: 12.0,
            secondary_radius: 8.0,
            seed: None,
        }
    }
}

impl LayoutConfig {
    /// Use a fixed seed for spawn positions
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load a configuration file, dispatching on its extension
    ///
    /// Supports `.json`, `.yaml` and `.yml`. Missing fields take their
    /// defaults. The result is validated before it is returned.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let config: Self = match ext.as_str() {
            "json" => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            "yaml" | "yml" => {
                let content = std::fs::read_to_string(path)?;
                serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("repulsion_constant", self.repulsion_constant),
            ("spring_constant", self.spring_constant),
            ("rest_length", self.rest_length),
            ("cell_size", self.cell_size),
            ("max_velocity", self.max_velocity),
            ("idle_temperature", self.idle_temperature),
            ("settle_speed", self.settle_speed),
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
            ("primary_radius", self.primary_radius),
            ("secondary_radius", self.secondary_radius),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, format!("must be finite and > 0, got {value}")));
            }
        }

        let non_negative = [
            ("gravity", self.gravity),
            ("spawn_radius", self.spawn_radius),
            ("cull_margin", self.cull_margin),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("must be finite and >= 0, got {value}")));
            }
        }

        let unit = [
            ("damping", self.damping),
            ("temperature_decay", self.temperature_decay),
        ];
        for (field, value) in unit {
            if !(value > 0.0 && value <= 1.0) {
                return Err(invalid(field, format!("must be in (0, 1], got {value}")));
            }
        }

        if !(0.0..=1.0).contains(&self.interaction_bump) {
            return Err(invalid(
                "interaction_bump",
                format!("must be in [0, 1], got {}", self.interaction_bump),
            ));
        }

        if !self.center.is_finite() {
            return Err(invalid("center", "must be finite".to_string()));
        }

        if !(self.center.abs() + Vec2::splat(self.spawn_radius)).is_finite() {
            return Err(invalid(
                "spawn_radius",
                format!("spawn area around center overflows, got {}", self.spawn_radius),
            ));
        }

        if self.min_scale > self.max_scale {
            return Err(invalid(
                "min_scale",
                format!(
                    "must not exceed max_scale ({} > {})",
                    self.min_scale, self.max_scale
                ),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidValue { field, reason }
}
