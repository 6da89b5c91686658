//! Seedsim - Voronoi seeds and bubbles in a 2D box
//!
//! Core modules:
//! - `sim`: Deterministic simulation (vector math, collisions, spatial grid, stepper)
//! - `config`: Validated simulation parameters
//! - `driver`: Fixed-substep frame loop around the stepper
//! - `renderer`: Flat per-seed buffer handed to the external GPU renderer

pub mod config;
pub mod driver;
pub mod renderer;
pub mod sim;

pub use config::{ConfigError, Mode, SimConfig};
pub use driver::{FrameDriver, FrameInput, FrameOutput, StepDirection};
pub use sim::{SimulationWorld, StepInput, step};

/// Simulation configuration constants
pub mod consts {
    use glam::Vec2;

    /// Window defaults (the viewport also bounds the walls)
    pub const DEFAULT_SCREEN_WIDTH: f32 = 1920.0;
    pub const DEFAULT_SCREEN_HEIGHT: f32 = 1080.0;

    /// Frame delta used for one manual step while paused (seconds)
    pub const MANUAL_TIME_STEP: f32 = 0.05;
    /// Largest frame delta fed to the stepper, prevents huge jumps after a stall
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Physics substeps per rendered frame
    pub const SUB_STEPS: u32 = 10;

    /// Seed count bounds
    pub const DEFAULT_SEED_COUNT: usize = 20;
    pub const SEED_MAX_COUNT: usize = 200;

    /// Seed radius bounds (pixels)
    pub const DEFAULT_SEED_RADIUS: i32 = 15;
    pub const SEED_MIN_RADIUS: i32 = 5;
    pub const SEED_MAX_RADIUS: i32 = 150;

    /// Bubble radii are drawn from this range (pixels, inclusive)
    pub const BUBBLE_MIN_RADIUS: i32 = SEED_MIN_RADIUS + 20;
    pub const BUBBLE_MAX_RADIUS: i32 = SEED_MAX_RADIUS + 40;
    /// Bubbles touch at (r1 + r2) / overlap, letting them visibly merge
    pub const BUBBLE_OVERLAP: f32 = 1.5;

    /// Downward pull in bubbles mode (y points up)
    pub const GRAVITY: Vec2 = Vec2::new(0.0, -20.0);

    /// Spatial grid defaults
    pub const GRID_CELL_SIZE: f32 = 32.0;
    pub const GRID_BUCKETS: usize = 32 * 32;

    /// Seeds spawn in a square of this half-size around the viewport center
    pub const SPAWN_HALF_EXTENT: f32 = 50.0;

    /// Initial speed ranges (pixels/s)
    pub const SEED_SPEED_RANGE: (f32, f32) = (100.0, 300.0);
    pub const BUBBLE_SPEED_RANGE: (f32, f32) = (100.0, 150.0);

    /// Neighbor query radius as a multiple of the seed radius
    pub const NEIGHBOR_QUERY_FACTOR: f32 = 3.0;
}

/// Linear interpolation between `start` and `end`
#[inline]
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(100.0, 300.0, 0.0), 100.0);
        assert_eq!(lerp(100.0, 300.0, 1.0), 300.0);
        assert!((lerp(100.0, 300.0, 0.5) - 200.0).abs() < 1e-4);
    }
}
