//! Elastic collision response between two circular seeds
//!
//! Two interchangeable formulations are provided. Both are exact for perfectly
//! elastic collisions of circles; they differ only in how the algebra is laid
//! out, which matters for rounding and for reading the code against the textbook:
//! - `Impulse`: subtract the relative velocity projected on the center line
//! - `NormalTangent`: split into normal/tangent components, solve 1-D on the normal
//!
//! Seed radii double as masses. A body grabbed by the pointer and held still
//! is passed as `Mass::Pinned` so it behaves as immovable in the exchange.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::math::Vec2Ext;
use crate::config::ConfigError;

/// Mass of a colliding body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mass {
    /// Regular body, mass must be positive
    Finite(f32),
    /// Immovable body (infinite mass limit)
    Pinned,
}

impl Mass {
    pub fn is_pinned(&self) -> bool {
        matches!(self, Mass::Pinned)
    }

    /// `2 * m_other / (m_own + m_other)`, the share of the relative velocity
    /// a body gives up along the contact normal
    fn exchange_share(own: Mass, other: Mass) -> f32 {
        match (own, other) {
            (Mass::Pinned, _) => 0.0,
            (Mass::Finite(_), Mass::Pinned) => 2.0,
            (Mass::Finite(m1), Mass::Finite(m2)) => {
                assert!(m1 > 0.0 && m2 > 0.0, "masses must be positive ({m1}, {m2})");
                2.0 * m2 / (m1 + m2)
            }
        }
    }
}

/// One side of a collision
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub mass: Mass,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2, mass: Mass) -> Self {
        Self { pos, vel, mass }
    }
}

/// Elastic collision formula used by a simulation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionModel {
    /// Impulse along the line between centers
    Impulse,
    /// Normal/tangent velocity decomposition
    #[default]
    NormalTangent,
}

impl CollisionModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionModel::Impulse => "impulse",
            CollisionModel::NormalTangent => "normal_tangent",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "impulse" => Ok(CollisionModel::Impulse),
            "normal_tangent" | "normal-tangent" | "decomposition" => {
                Ok(CollisionModel::NormalTangent)
            }
            _ => Err(ConfigError::UnknownCollisionModel(s.to_string())),
        }
    }

    /// Resolve the velocities of two touching bodies
    ///
    /// Returns the new `(a.vel, b.vel)`. Panics if the centers coincide.
    pub fn resolve(&self, a: &Body, b: &Body) -> (Vec2, Vec2) {
        assert!(
            a.pos.distance_squared(b.pos) > 0.0,
            "collision between coincident bodies at {}",
            a.pos
        );

        match self {
            CollisionModel::Impulse => resolve_impulse(a, b),
            CollisionModel::NormalTangent => resolve_normal_tangent(a, b),
        }
    }
}

/// v1' = v1 - 2 m2/(m1+m2) * <v1-v2, p1-p2>/|p1-p2|² * (p1-p2)
fn resolve_impulse(a: &Body, b: &Body) -> (Vec2, Vec2) {
    let share_a = Mass::exchange_share(a.mass, b.mass);
    let share_b = Mass::exchange_share(b.mass, a.mass);

    let pos_diff_a = a.pos - b.pos;
    let pos_diff_b = b.pos - a.pos;
    let dist_sq = pos_diff_a.length_squared();

    let mag_a = share_a * (a.vel - b.vel).dot(pos_diff_a) / dist_sq;
    let mag_b = share_b * (b.vel - a.vel).dot(pos_diff_b) / dist_sq;

    (a.vel - pos_diff_a * mag_a, b.vel - pos_diff_b * mag_b)
}

/// 1-D elastic collision on the normal axis, tangents untouched
fn resolve_normal_tangent(a: &Body, b: &Body) -> (Vec2, Vec2) {
    let un = Vec2::unit_normal(a.pos, b.pos);
    let ut = Vec2::unit_tangent(a.pos, b.pos);

    let v1n = a.vel.dot(un);
    let v1t = a.vel.dot(ut);
    let v2n = b.vel.dot(un);
    let v2t = b.vel.dot(ut);

    // (v1n(m1-m2) + 2 m2 v2n)/(m1+m2) == v1n - 2 m2/(m1+m2) (v1n - v2n)
    let v1n_new = v1n - Mass::exchange_share(a.mass, b.mass) * (v1n - v2n);
    let v2n_new = v2n - Mass::exchange_share(b.mass, a.mass) * (v2n - v1n);

    (un * v1n_new + ut * v1t, un * v2n_new + ut * v2t)
}

/// Push two overlapping bodies apart so their centers end up `target` apart
///
/// The correction is split evenly unless one side is pinned, in which case
/// the other side takes all of it. Returns the new `(p1, p2)`.
pub fn separate(p1: Vec2, p2: Vec2, target: f32, pinned1: bool, pinned2: bool) -> (Vec2, Vec2) {
    let dist = p1.distance(p2);
    let overlap = target - dist;
    if overlap <= 0.0 {
        return (p1, p2);
    }

    // Unit vector from p2 towards p1
    let n = (p1 - p2).div_scalar(dist);
    let (share1, share2) = match (pinned1, pinned2) {
        (false, false) => (0.5, 0.5),
        (true, false) => (0.0, 1.0),
        (false, true) => (1.0, 0.0),
        (true, true) => (0.0, 0.0),
    };

    (p1 + n * overlap * share1, p2 - n * overlap * share2)
}
