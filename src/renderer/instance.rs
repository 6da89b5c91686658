//! Per-seed instance record for the instanced quad pass

use bytemuck::{Pod, Zeroable};

use crate::sim::Seed;

/// One seed as the vertex shader sees it: position, color, radius
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SeedInstance {
    pub pos: [f32; 2],
    pub color: [f32; 4],
    pub radius: i32,
}

impl SeedInstance {
    /// Byte stride between consecutive instances
    pub const STRIDE: usize = std::mem::size_of::<SeedInstance>();

    /// Byte offsets of (pos, color, radius) for vertex attribute setup
    pub const OFFSETS: [usize; 3] = [
        std::mem::offset_of!(SeedInstance, pos),
        std::mem::offset_of!(SeedInstance, color),
        std::mem::offset_of!(SeedInstance, radius),
    ];

    pub const fn new(x: f32, y: f32, color: [f32; 4], radius: i32) -> Self {
        Self {
            pos: [x, y],
            color,
            radius,
        }
    }

    /// View a slice of instances as raw bytes for upload
    pub fn as_bytes(instances: &[SeedInstance]) -> &[u8] {
        bytemuck::cast_slice(instances)
    }
}

impl From<&Seed> for SeedInstance {
    fn from(seed: &Seed) -> Self {
        Self::new(seed.pos.x, seed.pos.y, seed.color, seed.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_tightly_packed() {
        assert_eq!(SeedInstance::STRIDE, 28);
        assert_eq!(SeedInstance::OFFSETS, [0, 8, 24]);
    }

    #[test]
    fn test_as_bytes() {
        let instances = [
            SeedInstance::new(1.0, 2.0, [0.1, 0.2, 0.3, 1.0], 15),
            SeedInstance::new(3.0, 4.0, [0.0, 0.0, 0.0, 1.0], 7),
        ];
        let bytes = SeedInstance::as_bytes(&instances);
        assert_eq!(bytes.len(), 2 * SeedInstance::STRIDE);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
        assert_eq!(&bytes[24..28], &15i32.to_ne_bytes());
        assert_eq!(&bytes[28 + 24..], &7i32.to_ne_bytes());
    }
}
