//! 2D vector helpers on top of `glam::Vec2`
//!
//! glam already covers the arithmetic (add, sub, component-wise mul, scale,
//! dot, length, distance). The collision code additionally needs checked
//! division, normal/tangent frames between two points and an exact zero test.
//! The checked variants panic: a zero divisor here means a logic error upstream.

use glam::Vec2;

pub trait Vec2Ext {
    /// Divide by a scalar, panicking on a zero divisor
    fn div_scalar(self, s: f32) -> Vec2;

    /// Normalize, panicking when the magnitude is zero
    fn normalize_checked(self) -> Vec2;

    /// Unit vector pointing from `p1` to `p2`
    fn unit_normal(p1: Vec2, p2: Vec2) -> Vec2;

    /// Unit normal rotated a quarter turn counter-clockwise
    fn unit_tangent(p1: Vec2, p2: Vec2) -> Vec2;

    /// Exactly zero on both components
    fn is_zero(self) -> bool;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn div_scalar(self, s: f32) -> Vec2 {
        assert!(s != 0.0, "division of {} by zero", self);
        self / s
    }

    #[inline]
    fn normalize_checked(self) -> Vec2 {
        let mag = self.length();
        assert!(mag != 0.0, "cannot normalize a zero-length vector");
        self / mag
    }

    #[inline]
    fn unit_normal(p1: Vec2, p2: Vec2) -> Vec2 {
        (p2 - p1).div_scalar(p1.distance(p2))
    }

    #[inline]
    fn unit_tangent(p1: Vec2, p2: Vec2) -> Vec2 {
        Vec2::unit_normal(p1, p2).perp()
    }

    #[inline]
    fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}
