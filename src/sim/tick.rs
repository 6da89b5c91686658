//! Fixed substep simulation pipeline
//!
//! One call to `step` advances the world by `dt`:
//! walls -> gravity (bubbles) -> drag (voronoi/atoms) -> collisions -> integrate.
//! The frame driver calls it `substeps` times per rendered frame.

use glam::Vec2;

use super::collision::{Body, separate};
use super::state::SimulationWorld;
use crate::consts::NEIGHBOR_QUERY_FACTOR;

/// Pointer state for a single substep (world coordinates, y up)
#[derive(Debug, Clone, Copy, Default)]
pub struct StepInput {
    pub pointer: Vec2,
    /// Pointer button held
    pub dragging: bool,
}

/// Advance the world by one substep
pub fn step(world: &mut SimulationWorld, input: &StepInput, dt: f32) {
    apply_wall_constraints(world);
    if world.mode.has_gravity() {
        apply_gravity(world);
    }
    if world.mode.has_drag() {
        resolve_drag(world, input, dt);
    }
    if world.mode.uses_grid() {
        resolve_collisions_grid(world);
    } else {
        resolve_collisions_all_pairs(world);
    }
    integrate_positions(world, dt);

    world.steps += 1;
}

/// Reflect velocity off the viewport walls
///
/// An axis bounces only when the seed is already outside on that axis and
/// still heading out, judged on the position and velocity before this step's
/// integration. Positions are never clamped.
pub fn apply_wall_constraints(world: &mut SimulationWorld) {
    let bounds = world.bounds;
    for seed in &mut world.seeds {
        if (seed.pos.x < 0.0 && seed.vel.x < 0.0) || (seed.pos.x > bounds.x && seed.vel.x > 0.0) {
            seed.vel *= Vec2::new(-1.0, 1.0);
        }
        if (seed.pos.y < 0.0 && seed.vel.y < 0.0) || (seed.pos.y > bounds.y && seed.vel.y > 0.0) {
            seed.vel *= Vec2::new(1.0, -1.0);
        }
    }
}

pub fn apply_gravity(world: &mut SimulationWorld) {
    let gravity = world.gravity;
    for seed in &mut world.seeds {
        seed.acc += gravity;
    }
}

/// Pointer grab, hold and throw
///
/// The grab happens on the first step with the button held: the nearest seed
/// containing the pointer is taken and starts at rest. While held, the seed follows the pointer
/// and its velocity is the pointer displacement over `2 * dt`, so letting go
/// throws it. Releasing clears the grab.
pub fn resolve_drag(world: &mut SimulationWorld, input: &StepInput, dt: f32) {
    let pointer = input.pointer;

    if !input.dragging {
        if let Some(index) = world.drag.grabbed {
            log::debug!("Released seed {} at {}", index, pointer);
        }
        world.drag.release(pointer);
        return;
    }

    if world.drag.grabbed.is_none() {
        world.drag.grabbed = world
            .seeds
            .iter()
            .enumerate()
            .filter(|(_, s)| s.contains(pointer))
            .min_by(|(_, a), (_, b)| {
                a.pos
                    .distance_squared(pointer)
                    .total_cmp(&b.pos.distance_squared(pointer))
            })
            .map(|(i, _)| i);

        if let Some(index) = world.drag.grabbed {
            log::debug!("Grabbed seed {} at {}", index, pointer);
            // No displacement yet: the first held step leaves the seed at rest
            world.drag.last_pointer = pointer;
        }
    }

    if let Some(index) = world.drag.grabbed {
        world.move_seed(index, pointer);
        if dt != 0.0 {
            world.seeds[index].vel = (pointer - world.drag.last_pointer) / (dt * 2.0);
        }
        world.drag.last_pointer = pointer;
    }
}

/// Grid-accelerated collision pass (voronoi/atoms)
///
/// Seeds are visited in array order. Each one is lifted out of the grid,
/// queries neighbors within `3 * radius`, resolves every overlapping candidate
/// and goes back in at its corrected position. A pair may be resolved again
/// when the partner's turn comes; that only adds a second corrective push.
pub fn resolve_collisions_grid(world: &mut SimulationWorld) {
    let mut candidates = Vec::new();

    for i in 0..world.seeds.len() {
        world.grid.remove(i);

        let query_radius = NEIGHBOR_QUERY_FACTOR * world.seeds[i].radius as f32;
        world
            .grid
            .query_neighbors(&world.seeds, world.seeds[i].pos, query_radius, &mut candidates);

        for &j in &candidates {
            let s1 = &world.seeds[i];
            let s2 = &world.seeds[j];
            let radii_sum = (s1.radius + s2.radius) as f32;
            if s1.pos.distance(s2.pos) >= radii_sum {
                continue;
            }
            resolve_pair(world, i, j, radii_sum);
            world.grid.relocate(j, world.seeds[j].pos);
        }

        world.grid.insert(i, world.seeds[i].pos);
    }
}

/// All-pairs collision pass (bubbles, few large seeds)
///
/// Contact distance is `(r1 + r2) / bubble_overlap`. The grid is brought back
/// in sync once the pass is done.
pub fn resolve_collisions_all_pairs(world: &mut SimulationWorld) {
    let n = world.seeds.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let s1 = &world.seeds[i];
            let s2 = &world.seeds[j];
            let contact = (s1.radius + s2.radius) as f32 / world.bubble_overlap;
            if s1.pos.distance(s2.pos) >= contact {
                continue;
            }
            resolve_pair(world, i, j, contact);
        }
    }

    for (idx, seed) in world.seeds.iter().enumerate() {
        world.grid.relocate(idx, seed.pos);
    }
}

/// Exchange velocities and push a touching pair `contact` apart
///
/// Only writes the seed array; callers own the grid bookkeeping.
fn resolve_pair(world: &mut SimulationWorld, i: usize, j: usize, contact: f32) {
    let a = Body::new(world.seeds[i].pos, world.seeds[i].vel, world.mass_of(i));
    let b = Body::new(world.seeds[j].pos, world.seeds[j].vel, world.mass_of(j));

    let (va, vb) = world.collision_model.resolve(&a, &b);
    let (pa, pb) = separate(a.pos, b.pos, contact, a.mass.is_pinned(), b.mass.is_pinned());

    let s1 = &mut world.seeds[i];
    s1.vel = va;
    s1.pos = pa;
    let s2 = &mut world.seeds[j];
    s2.vel = vb;
    s2.pos = pb;
}

/// Semi-implicit Euler, skipping the held seed
pub fn integrate_positions(world: &mut SimulationWorld, dt: f32) {
    for idx in 0..world.seeds.len() {
        if world.drag.is_grabbed(idx) {
            continue;
        }
        let seed = &mut world.seeds[idx];
        seed.vel += seed.acc * dt;
        let pos = seed.pos + seed.vel * dt;
        seed.acc = Vec2::ZERO;
        world.move_seed(idx, pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Mode, SimConfig};
    use crate::sim::collision::CollisionModel;
    use crate::sim::math::Vec2Ext;
    use crate::sim::state::Seed;

    fn world_with(mode: Mode, seeds: Vec<Seed>) -> SimulationWorld {
        SimulationWorld::with_seeds(&SimConfig::for_mode(mode), seeds).unwrap()
    }

    fn seed(pos: (f32, f32), vel: (f32, f32), radius: i32) -> Seed {
        Seed::new(Vec2::from(pos), Vec2::from(vel), radius, [0.5, 0.5, 0.5, 1.0])
    }

    #[test]
    fn test_walls_leave_inside_seed_alone() {
        let mut world = world_with(Mode::Voronoi, vec![seed((500.0, 500.0), (-30.0, 40.0), 10)]);
        apply_wall_constraints(&mut world);
        assert_eq!(world.seeds[0].vel, Vec2::new(-30.0, 40.0));
    }

    #[test]
    fn test_walls_flip_outward_axis_once() {
        let mut world = world_with(
            Mode::Voronoi,
            vec![
                seed((-2.0, 500.0), (-30.0, 40.0), 10),
                seed((2000.0, 1100.0), (10.0, 5.0), 10),
            ],
        );
        apply_wall_constraints(&mut world);
        assert_eq!(world.seeds[0].vel, Vec2::new(30.0, 40.0));
        assert_eq!(world.seeds[1].vel, Vec2::new(-10.0, -5.0));

        // Outside but already heading back in: untouched
        apply_wall_constraints(&mut world);
        assert_eq!(world.seeds[0].vel, Vec2::new(30.0, 40.0));
        assert_eq!(world.seeds[1].vel, Vec2::new(-10.0, -5.0));
    }

    #[test]
    fn test_walls_follow_bounds() {
        let mut world = world_with(Mode::Voronoi, vec![seed((700.0, 100.0), (10.0, 0.0), 10)]);
        world.set_bounds(640.0, 480.0);
        apply_wall_constraints(&mut world);
        assert_eq!(world.seeds[0].vel, Vec2::new(-10.0, 0.0));
    }

    #[test]
    fn test_integrate_exact_step() {
        let mut world = world_with(Mode::Voronoi, vec![seed((100.0, 100.0), (10.0, 0.0), 10)]);
        integrate_positions(&mut world, 0.1);
        assert!((world.seeds[0].pos - Vec2::new(101.0, 100.0)).length() < 1e-5);
        assert!(world.grid.is_consistent(&world.seeds));
    }

    #[test]
    fn test_integrate_applies_and_clears_acceleration() {
        let mut world = world_with(Mode::Bubbles, vec![seed((100.0, 100.0), (0.0, 0.0), 30)]);
        apply_gravity(&mut world);
        assert_eq!(world.seeds[0].acc, Vec2::new(0.0, -20.0));

        integrate_positions(&mut world, 0.5);
        assert_eq!(world.seeds[0].vel, Vec2::new(0.0, -10.0));
        assert_eq!(world.seeds[0].pos, Vec2::new(100.0, 95.0));
        assert!(world.seeds[0].acc.is_zero());
    }

    #[test]
    fn test_grid_collision_head_on() {
        let mut world = world_with(
            Mode::Voronoi,
            vec![seed((0.0, 0.0), (5.0, 0.0), 10), seed((15.0, 0.0), (-5.0, 0.0), 10)],
        );
        resolve_collisions_grid(&mut world);

        let (s1, s2) = (&world.seeds[0], &world.seeds[1]);
        assert!(s1.pos.distance(s2.pos) >= 20.0 - 1e-4);
        assert!(s1.vel.x < 0.0 && s2.vel.x > 0.0);
        assert!(world.grid.is_consistent(&world.seeds));
    }

    #[test]
    fn test_grid_collision_ignores_distant_seeds() {
        let mut world = world_with(
            Mode::Atoms,
            vec![seed((100.0, 100.0), (5.0, 0.0), 10), seed((125.0, 100.0), (-5.0, 0.0), 10)],
        );
        resolve_collisions_grid(&mut world);
        assert_eq!(world.seeds[0].vel, Vec2::new(5.0, 0.0));
        assert_eq!(world.seeds[1].pos, Vec2::new(125.0, 100.0));
    }

    #[test]
    fn test_all_pairs_uses_overlap_factor() {
        // 60 apart: inside r1 + r2 = 80 but outside 80 / 1.5
        let mut world = world_with(
            Mode::Bubbles,
            vec![seed((100.0, 100.0), (5.0, 0.0), 40), seed((160.0, 100.0), (-5.0, 0.0), 40)],
        );
        resolve_collisions_all_pairs(&mut world);
        assert_eq!(world.seeds[0].vel, Vec2::new(5.0, 0.0));

        world.move_seed(1, Vec2::new(140.0, 100.0));
        resolve_collisions_all_pairs(&mut world);
        let contact = 80.0 / 1.5;
        assert!(world.seeds[0].pos.distance(world.seeds[1].pos) >= contact - 1e-3);
        assert!(world.seeds[0].vel.x < 0.0 && world.seeds[1].vel.x > 0.0);
        assert!(world.grid.is_consistent(&world.seeds));
    }

    #[test]
    fn test_drag_grabs_nearest_and_derives_velocity() {
        let mut world = world_with(
            Mode::Voronoi,
            vec![seed((100.0, 100.0), (0.0, 0.0), 15), seed((112.0, 100.0), (0.0, 0.0), 15)],
        );

        let idle = StepInput {
            pointer: Vec2::new(100.0, 100.0),
            dragging: false,
        };
        resolve_drag(&mut world, &idle, 0.05);
        assert_eq!(world.drag.grabbed, None);

        let grab = StepInput {
            pointer: Vec2::new(110.0, 100.0),
            dragging: true,
        };
        resolve_drag(&mut world, &grab, 0.05);
        assert_eq!(world.drag.grabbed, Some(1));
        assert_eq!(world.seeds[1].pos, Vec2::new(110.0, 100.0));
        // The grab step itself carries no displacement
        assert!(world.seeds[1].vel.is_zero());
        assert!(world.mass_of(1).is_pinned());
        assert!(world.grid.is_consistent(&world.seeds));

        let drag = StepInput {
            pointer: Vec2::new(115.0, 100.0),
            dragging: true,
        };
        resolve_drag(&mut world, &drag, 0.05);
        assert_eq!(world.seeds[1].pos, Vec2::new(115.0, 100.0));
        assert!((world.seeds[1].vel - Vec2::new(50.0, 0.0)).length() < 1e-3);
        assert!(world.grid.is_consistent(&world.seeds));

        // Holding still: velocity drops to zero, the seed becomes pinned
        resolve_drag(&mut world, &drag, 0.05);
        assert!(world.seeds[1].vel.length() < 1e-6);
        assert!(world.mass_of(1).is_pinned());

        resolve_drag(&mut world, &StepInput { dragging: false, ..drag }, 0.05);
        assert_eq!(world.drag.grabbed, None);
    }

    #[test]
    fn test_grab_ignores_stale_pointer() {
        let mut world = world_with(Mode::Voronoi, vec![seed((960.0, 540.0), (0.0, 0.0), 15)]);
        assert_eq!(world.drag.last_pointer, Vec2::ZERO);

        let grab = StepInput {
            pointer: Vec2::new(960.0, 540.0),
            dragging: true,
        };
        resolve_drag(&mut world, &grab, 0.005);
        assert_eq!(world.drag.grabbed, Some(0));
        assert!(world.seeds[0].vel.is_zero());
    }

    #[test]
    fn test_drag_on_empty_space_grabs_nothing() {
        let mut world = world_with(Mode::Voronoi, vec![seed((100.0, 100.0), (1.0, 0.0), 15)]);
        let input = StepInput {
            pointer: Vec2::new(400.0, 400.0),
            dragging: true,
        };
        resolve_drag(&mut world, &input, 0.05);
        assert_eq!(world.drag.grabbed, None);
        assert_eq!(world.seeds[0].vel, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_pinned_seed_pushes_other_away() {
        let mut world = world_with(
            Mode::Voronoi,
            vec![seed((100.0, 100.0), (0.0, 0.0), 10), seed((115.0, 100.0), (-5.0, 0.0), 10)],
        );
        world.drag.grabbed = Some(0);
        world.drag.last_pointer = Vec2::new(100.0, 100.0);

        resolve_collisions_grid(&mut world);
        assert_eq!(world.seeds[0].pos, Vec2::new(100.0, 100.0));
        assert!(world.seeds[0].vel.is_zero());
        assert!((world.seeds[1].pos - Vec2::new(120.0, 100.0)).length() < 1e-4);
        assert!((world.seeds[1].vel - Vec2::new(5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_integrate_skips_grabbed_seed() {
        let mut world = world_with(
            Mode::Voronoi,
            vec![seed((100.0, 100.0), (50.0, 0.0), 10), seed((300.0, 100.0), (50.0, 0.0), 10)],
        );
        world.drag.grabbed = Some(0);
        integrate_positions(&mut world, 0.1);
        assert_eq!(world.seeds[0].pos, Vec2::new(100.0, 100.0));
        assert_eq!(world.seeds[1].pos, Vec2::new(305.0, 100.0));
    }

    #[test]
    fn test_step_counts_and_keeps_grid() {
        let config = SimConfig {
            rng_seed: Some(2024),
            collision_model: Some(CollisionModel::Impulse),
            ..SimConfig::for_mode(Mode::Atoms)
        };
        let mut world = SimulationWorld::new(&config).unwrap();
        let input = StepInput::default();
        for _ in 0..200 {
            step(&mut world, &input, 1.0 / 600.0);
            assert!(world.grid.is_consistent(&world.seeds));
        }
        assert_eq!(world.steps, 200);
        assert!(world.seeds.iter().all(|s| s.pos.is_finite() && s.vel.is_finite()));
    }
}
