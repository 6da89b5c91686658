//! Seed store and simulation world
//!
//! `SimulationWorld` owns every piece of mutable simulation state: the seed
//! array, the spatial grid indexing it, drag state and the RNG used to spawn.
//! Seed count is fixed once the world is built; changing it means a new world.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{CollisionModel, Mass};
use super::grid::SpatialGrid;
use super::math::Vec2Ext;
use crate::config::{ConfigError, Mode, SimConfig};
use crate::consts::*;
use crate::lerp;
use crate::renderer::SeedInstance;

/// A simulated seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Acceleration accumulator, cleared after every integration
    pub acc: Vec2,
    /// Collision and render radius, doubles as mass
    pub radius: i32,
    /// RGBA, cosmetic
    pub color: [f32; 4],
}

impl Seed {
    pub fn new(pos: Vec2, vel: Vec2, radius: i32, color: [f32; 4]) -> Self {
        assert!(radius > 0, "seed radius must be positive, got {radius}");
        Self {
            pos,
            vel,
            acc: Vec2::ZERO,
            radius,
            color,
        }
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.radius as f32
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass() * self.vel.length_squared()
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance(point) < self.radius as f32
    }
}

/// Pointer drag gesture
#[derive(Debug, Clone, Default)]
pub struct DragState {
    /// Seed currently held by the pointer
    pub grabbed: Option<usize>,
    /// Pointer position seen on the previous step (world coordinates)
    pub last_pointer: Vec2,
}

impl DragState {
    pub fn is_grabbed(&self, index: usize) -> bool {
        self.grabbed == Some(index)
    }

    pub fn release(&mut self, pointer: Vec2) {
        self.grabbed = None;
        self.last_pointer = pointer;
    }
}

/// RNG state wrapper for reproducible spawning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Use the configured seed, or draw a fresh one
    pub fn from_config(seed: Option<u64>) -> Self {
        Self::new(seed.unwrap_or_else(rand::random))
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// All mutable simulation state for one mode
#[derive(Debug, Clone)]
pub struct SimulationWorld {
    pub mode: Mode,
    pub collision_model: CollisionModel,
    pub seeds: Vec<Seed>,
    pub grid: SpatialGrid,
    pub drag: DragState,
    /// Wall bounds: seeds live in [0, width] x [0, height], y up
    pub bounds: Vec2,
    pub gravity: Vec2,
    /// Bubbles touch at (r1 + r2) / overlap
    pub bubble_overlap: f32,
    pub rng_state: RngState,
    /// Simulated substeps since creation
    pub steps: u64,
}

impl SimulationWorld {
    /// Validate the config and spawn a fresh world
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = Self::empty(config);
        world.generate_seeds(config);

        log::info!(
            "Running '{}' mode: {} seeds, {} collisions, rng seed {}",
            world.mode.as_str(),
            world.seeds.len(),
            world.collision_model.as_str(),
            world.rng_state.seed
        );
        Ok(world)
    }

    /// Build a world around caller-provided seeds (scenarios and tests)
    pub fn with_seeds(config: &SimConfig, seeds: Vec<Seed>) -> Result<Self, ConfigError> {
        config.validate()?;
        if !(1..=SEED_MAX_COUNT).contains(&seeds.len()) {
            return Err(ConfigError::SeedCountOutOfRange(seeds.len()));
        }
        let mut world = Self::empty(config);
        world.seeds = seeds;
        world.grid.rebuild(&world.seeds);
        Ok(world)
    }

    fn empty(config: &SimConfig) -> Self {
        Self {
            mode: config.mode,
            collision_model: config.effective_collision_model(),
            seeds: Vec::new(),
            grid: SpatialGrid::new(config.grid_cell_size, config.grid_buckets),
            drag: DragState::default(),
            bounds: Vec2::new(config.width, config.height),
            gravity: config.gravity,
            bubble_overlap: config.bubble_overlap,
            rng_state: RngState::from_config(config.rng_seed),
            steps: 0,
        }
    }

    /// Spawn `seed_count` seeds for the configured mode and index them
    fn generate_seeds(&mut self, config: &SimConfig) {
        let mut rng = self.rng_state.to_rng();
        let center = self.bounds / 2.0;

        self.seeds = (0..config.seed_count)
            .map(|_| match self.mode {
                Mode::Voronoi | Mode::Atoms => {
                    let speed = lerp(SEED_SPEED_RANGE.0, SEED_SPEED_RANGE.1, rng.random());
                    spawn_seed(&mut rng, center, config.seed_radius, speed, Vec2::ZERO)
                }
                Mode::Bubbles => {
                    let (min, max) = config.bubble_radius;
                    let radius = rng.random_range(min..=max);
                    let speed = lerp(BUBBLE_SPEED_RANGE.0, BUBBLE_SPEED_RANGE.1, rng.random());
                    spawn_seed(&mut rng, center, radius, speed, self.gravity)
                }
            })
            .collect();

        self.grid.rebuild(&self.seeds);
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    /// Write a seed position and keep the grid in sync
    pub fn move_seed(&mut self, index: usize, pos: Vec2) {
        self.seeds[index].pos = pos;
        self.grid.relocate(index, pos);
    }

    /// Effective collision mass: the held seed is pinned while it sits still
    pub fn mass_of(&self, index: usize) -> Mass {
        let seed = &self.seeds[index];
        if self.drag.is_grabbed(index) && seed.vel.is_zero() {
            Mass::Pinned
        } else {
            Mass::Finite(seed.mass())
        }
    }

    /// Viewport resize: walls follow the window
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        if self.bounds != Vec2::new(width, height) {
            log::debug!("Wall bounds {}x{} -> {}x{}", self.bounds.x, self.bounds.y, width, height);
            self.bounds = Vec2::new(width, height);
        }
    }

    pub fn total_momentum(&self) -> Vec2 {
        self.seeds.iter().map(|s| s.vel * s.mass()).sum()
    }

    pub fn total_kinetic_energy(&self) -> f32 {
        self.seeds.iter().map(Seed::kinetic_energy).sum()
    }

    /// Per-seed records for the renderer, in seed order
    pub fn fill_instances(&self, out: &mut Vec<SeedInstance>) {
        out.clear();
        out.extend(self.seeds.iter().map(SeedInstance::from));
    }
}

/// Random seed near `center` moving in a random direction at `speed`
fn spawn_seed(rng: &mut Pcg32, center: Vec2, radius: i32, speed: f32, acc: Vec2) -> Seed {
    let offset = Vec2::new(
        rng.random_range(-SPAWN_HALF_EXTENT..SPAWN_HALF_EXTENT),
        rng.random_range(-SPAWN_HALF_EXTENT..SPAWN_HALF_EXTENT),
    );
    let color = [rng.random(), rng.random(), rng.random(), 1.0];
    let angle = rng.random_range(0.0..std::f32::consts::TAU);

    let mut seed = Seed::new(center + offset, Vec2::from_angle(angle) * speed, radius, color);
    seed.acc = acc;
    seed
}
