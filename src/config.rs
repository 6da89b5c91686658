//! Simulation configuration
//!
//! Values the core takes as parameters instead of hardcoding. Every field is
//! validated up front and out-of-range values are rejected, never clamped.
//! Configs can be loaded from JSON; missing fields fall back to the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::CollisionModel;

/// Errors raised while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("seed count {0} is not in range (1-{max})", max = SEED_MAX_COUNT)]
    SeedCountOutOfRange(usize),
    #[error("seed radius {0} is not in range ({min}-{max})", min = SEED_MIN_RADIUS, max = SEED_MAX_RADIUS)]
    RadiusOutOfRange(i32),
    #[error("bubble radius range {min}..={max} is invalid")]
    InvalidRadiusRange { min: i32, max: i32 },
    #[error("substeps per frame must be at least 1")]
    InvalidSubSteps,
    #[error("grid cell size {0} must be positive and finite")]
    InvalidCellSize(f32),
    #[error("grid bucket count must be non-zero")]
    InvalidBucketCount,
    #[error("viewport {width}x{height} must be positive and finite")]
    InvalidViewport { width: f32, height: f32 },
    #[error("gravity must be finite")]
    InvalidGravity,
    #[error("manual time step {0} must be positive and finite")]
    InvalidTimeStep(f32),
    #[error("bubble overlap {0} must be at least 1")]
    InvalidOverlap(f32),
    #[error("unknown mode '{0}' (expected voronoi, atoms, bubbles or 1-3)")]
    UnknownMode(String),
    #[error("unknown collision model '{0}' (expected impulse or normal_tangent)")]
    UnknownCollisionModel(String),
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulation mode: which generator, gravity and collision pass are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Small fixed-radius seeds, colored by nearest seed on the GPU
    #[default]
    Voronoi,
    /// Voronoi physics drawn as atoms
    Atoms,
    /// Few large bubbles under gravity
    Bubbles,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Voronoi, Mode::Atoms, Mode::Bubbles];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Voronoi => "Voronoi",
            Mode::Atoms => "Atoms",
            Mode::Bubbles => "Bubbles",
        }
    }

    /// Parse a mode name or its 1-based number
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "voronoi" | "1" => Ok(Mode::Voronoi),
            "atoms" | "2" => Ok(Mode::Atoms),
            "bubbles" | "3" => Ok(Mode::Bubbles),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }

    /// Constant downward pull applied every substep
    pub fn has_gravity(&self) -> bool {
        matches!(self, Mode::Bubbles)
    }

    /// Pointer drag is resolved in this mode
    pub fn has_drag(&self) -> bool {
        matches!(self, Mode::Voronoi | Mode::Atoms)
    }

    /// Collisions go through the spatial grid (otherwise all pairs)
    pub fn uses_grid(&self) -> bool {
        matches!(self, Mode::Voronoi | Mode::Atoms)
    }

    /// Collision formula used when the config does not override it
    pub fn default_collision_model(&self) -> CollisionModel {
        match self {
            Mode::Voronoi => CollisionModel::Impulse,
            Mode::Atoms | Mode::Bubbles => CollisionModel::NormalTangent,
        }
    }
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub mode: Mode,
    /// Number of seeds, fixed for the lifetime of a world
    pub seed_count: usize,
    /// Radius of voronoi/atoms seeds
    pub seed_radius: i32,
    /// Inclusive radius range for bubbles
    pub bubble_radius: (i32, i32),
    /// Bubbles touch at (r1 + r2) / bubble_overlap
    pub bubble_overlap: f32,
    /// Physics substeps per rendered frame
    pub substeps: u32,
    pub gravity: Vec2,
    pub grid_cell_size: f32,
    pub grid_buckets: usize,
    /// Overrides the mode's collision formula
    pub collision_model: Option<CollisionModel>,
    /// RNG seed for reproducible runs (random when absent)
    pub rng_seed: Option<u64>,
    pub width: f32,
    pub height: f32,
    /// Frame delta of one manual step while paused
    pub manual_time_step: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Voronoi,
            seed_count: DEFAULT_SEED_COUNT,
            seed_radius: DEFAULT_SEED_RADIUS,
            bubble_radius: (BUBBLE_MIN_RADIUS, BUBBLE_MAX_RADIUS),
            bubble_overlap: BUBBLE_OVERLAP,
            substeps: SUB_STEPS,
            gravity: GRAVITY,
            grid_cell_size: GRID_CELL_SIZE,
            grid_buckets: GRID_BUCKETS,
            collision_model: None,
            rng_seed: None,
            width: DEFAULT_SCREEN_WIDTH,
            height: DEFAULT_SCREEN_HEIGHT,
            manual_time_step: MANUAL_TIME_STEP,
        }
    }
}

impl SimConfig {
    /// Default config for a mode
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Collision formula in effect
    pub fn effective_collision_model(&self) -> CollisionModel {
        self.collision_model
            .unwrap_or_else(|| self.mode.default_collision_model())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=SEED_MAX_COUNT).contains(&self.seed_count) {
            return Err(ConfigError::SeedCountOutOfRange(self.seed_count));
        }
        if !(SEED_MIN_RADIUS..=SEED_MAX_RADIUS).contains(&self.seed_radius) {
            return Err(ConfigError::RadiusOutOfRange(self.seed_radius));
        }
        let (min, max) = self.bubble_radius;
        if min <= 0 || min > max {
            return Err(ConfigError::InvalidRadiusRange { min, max });
        }
        if !(self.bubble_overlap.is_finite() && self.bubble_overlap >= 1.0) {
            return Err(ConfigError::InvalidOverlap(self.bubble_overlap));
        }
        if self.substeps == 0 {
            return Err(ConfigError::InvalidSubSteps);
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::InvalidGravity);
        }
        if !(self.grid_cell_size.is_finite() && self.grid_cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.grid_cell_size));
        }
        if self.grid_buckets == 0 {
            return Err(ConfigError::InvalidBucketCount);
        }
        let viewport_ok = |v: f32| v.is_finite() && v > 0.0;
        if !viewport_ok(self.width) || !viewport_ok(self.height) {
            return Err(ConfigError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.manual_time_step.is_finite() && self.manual_time_step > 0.0) {
            return Err(ConfigError::InvalidTimeStep(self.manual_time_step));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
