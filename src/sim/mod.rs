//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (seed array order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod grid;
pub mod math;
pub mod state;
pub mod tick;

pub use collision::{Body, CollisionModel, Mass, separate};
pub use grid::SpatialGrid;
pub use math::Vec2Ext;
pub use state::{DragState, RngState, Seed, SimulationWorld};
pub use tick::{
    StepInput, apply_gravity, apply_wall_constraints, integrate_positions,
    resolve_collisions_all_pairs, resolve_collisions_grid, resolve_drag, step,
};
