//! Uniform grid hash for neighbor queries
//!
//! Cells are `cell_size` wide and are folded into `bucket_count` buckets with
//! a simple additive hash: `(floor(x / cell) + floor(y / cell)) mod buckets`.
//! Distinct cells regularly share a bucket. That is fine for correctness
//! because every query scans a visited bucket in full and filters candidates
//! by their true distance.
//!
//! Buckets hold indices into the seed array owned by `SimulationWorld`. The
//! grid also remembers which bucket each seed sits in, so removal never has to
//! trust a position that may already have been overwritten.

use glam::Vec2;

use super::state::Seed;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    buckets: Vec<Vec<usize>>,
    /// Bucket currently holding each seed (indexed by seed index)
    slots: Vec<Option<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, bucket_count: usize) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be positive and finite"
        );
        assert!(bucket_count > 0, "bucket_count must be non-zero");
        Self {
            cell_size,
            buckets: vec![Vec::new(); bucket_count],
            slots: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of indexed seeds
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Integer cell coordinates containing `pos`
    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> (i64, i64) {
        (
            (pos.x / self.cell_size).floor() as i64,
            (pos.y / self.cell_size).floor() as i64,
        )
    }

    #[inline]
    fn bucket_of_cell(&self, cx: i64, cy: i64) -> usize {
        (cx + cy).rem_euclid(self.buckets.len() as i64) as usize
    }

    /// Bucket a seed at `pos` belongs to
    #[inline]
    pub fn bucket_for(&self, pos: Vec2) -> usize {
        let (cx, cy) = self.cell_of(pos);
        self.bucket_of_cell(cx, cy)
    }

    /// Bucket currently holding seed `index`, if indexed
    pub fn slot(&self, index: usize) -> Option<usize> {
        self.slots.get(index).copied().flatten()
    }

    /// Index seed `index` at `pos`
    ///
    /// Panics if the seed is already indexed: a double insert means some
    /// position write skipped the matching `remove`.
    pub fn insert(&mut self, index: usize, pos: Vec2) {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        assert!(
            self.slots[index].is_none(),
            "seed {index} inserted twice into the grid"
        );

        let bucket = self.bucket_for(pos);
        self.buckets[bucket].push(index);
        self.slots[index] = Some(bucket);
    }

    /// Drop seed `index` from the grid
    ///
    /// Panics if the seed is not indexed.
    pub fn remove(&mut self, index: usize) {
        let bucket = self
            .slot(index)
            .unwrap_or_else(|| panic!("seed {index} is not in the grid"));

        let entries = &mut self.buckets[bucket];
        let at = entries
            .iter()
            .position(|&i| i == index)
            .unwrap_or_else(|| panic!("seed {index} missing from bucket {bucket}"));
        entries.remove(at);
        self.slots[index] = None;
    }

    /// Move seed `index` to the bucket for `pos` (no-op when the bucket is unchanged)
    pub fn relocate(&mut self, index: usize, pos: Vec2) {
        if self.slot(index) == Some(self.bucket_for(pos)) {
            return;
        }
        self.remove(index);
        self.insert(index, pos);
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.slots.clear();
    }

    /// Re-index every seed from scratch
    pub fn rebuild(&mut self, seeds: &[Seed]) {
        self.clear();
        self.slots.reserve(seeds.len());
        for (idx, seed) in seeds.iter().enumerate() {
            self.insert(idx, seed.pos);
        }
    }

    /// Collect indexed seeds strictly closer than `radius` to `pos`
    ///
    /// Walks every cell overlapping `[pos - radius, pos + radius]` and scans
    /// each bucket once. When the window spans at least as many cells as
    /// there are buckets, every bucket is scanned directly. `out` is cleared
    /// first; results are in bucket order.
    pub fn query_neighbors(&self, seeds: &[Seed], pos: Vec2, radius: f32, out: &mut Vec<usize>) {
        out.clear();

        let near = |i: &usize| seeds[*i].pos.distance(pos) < radius;

        let (min_x, min_y) = self.cell_of(pos - Vec2::splat(radius));
        let (max_x, max_y) = self.cell_of(pos + Vec2::splat(radius));
        let span_x = max_x.saturating_sub(min_x).saturating_add(1) as u64;
        let span_y = max_y.saturating_sub(min_y).saturating_add(1) as u64;

        if span_x.saturating_mul(span_y) >= self.buckets.len() as u64 {
            for bucket in &self.buckets {
                out.extend(bucket.iter().copied().filter(near));
            }
            return;
        }

        let mut visited = vec![false; self.buckets.len()];
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                let bucket = self.bucket_of_cell(cx, cy);
                if visited[bucket] {
                    continue;
                }
                visited[bucket] = true;

                out.extend(self.buckets[bucket].iter().copied().filter(near));
            }
        }
    }

    /// Every seed is indexed exactly once, in the bucket of its current position
    pub fn is_consistent(&self, seeds: &[Seed]) -> bool {
        if self.slots.len() > seeds.len() {
            return false;
        }
        let entries: usize = self.buckets.iter().map(Vec::len).sum();
        if entries != seeds.len() {
            return false;
        }
        seeds.iter().enumerate().all(|(idx, seed)| {
            let bucket = self.bucket_for(seed.pos);
            self.slot(idx) == Some(bucket) && self.buckets[bucket].contains(&idx)
        })
    }
}
