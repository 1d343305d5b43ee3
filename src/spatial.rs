//! Uniform spatial hash grid for near-neighbor queries
//!
//! Nodes are bucketed by `(floor(x / cell_size), floor(y / cell_size))`.
//! A neighbor query visits the node's own bucket plus the 8 surrounding ones,
//! so every pair closer than `cell_size` shows up as a candidate. Candidates
//! farther than that are left for the caller's own distance check.
//!
//! The grid is derived state: it is rebuilt from current positions every tick
//! and never consulted for anything authoritative.

use std::collections::HashMap;

use glam::Vec2;

/// Bucket key in cell coordinates
pub type CellKey = (i32, i32);

const NEIGHBOR_OFFSETS: [CellKey; 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Spatial hash over node indices
#[derive(Debug, Default)]
pub struct SpatialHashGrid {
    inv_cell_size: f32,
    buckets: HashMap<CellKey, Vec<usize>>,
    cells: Vec<CellKey>,
}

impl SpatialHashGrid {
    /// Build a grid over `positions` (index `i` is node `i`)
    pub fn build(positions: &[Vec2], cell_size: f32) -> Self {
        let mut grid = Self::default();
        grid.rebuild(positions, cell_size);
        grid
    }

    /// Re-bucket all nodes, reusing the existing allocations
    pub fn rebuild(&mut self, positions: &[Vec2], cell_size: f32) {
        self.inv_cell_size = 1.0 / cell_size.max(f32::EPSILON);
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
        self.cells.clear();
        self.cells.reserve(positions.len());

        for (index, &position) in positions.iter().enumerate() {
            let key = self.cell_key(position);
            self.cells.push(key);
            self.buckets.entry(key).or_default().push(index);
        }

        self.buckets.retain(|_, bucket| !bucket.is_empty());
    }

    /// Cell a world position falls into
    pub fn cell_key(&self, position: Vec2) -> CellKey {
        (
            (position.x * self.inv_cell_size).floor() as i32,
            (position.y * self.inv_cell_size).floor() as i32,
        )
    }

    /// Number of indexed nodes
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no nodes are indexed
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of non-empty buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Candidate neighbors of node `index`: every node in its own bucket and
    /// the 8 surrounding buckets, including `index` itself
    ///
    /// Yields nothing for an index that was not part of the last rebuild.
    pub fn neighbors_of(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let center = self.cells.get(index).copied();
        NEIGHBOR_OFFSETS
            .into_iter()
            .filter_map(move |(dx, dy)| {
                let (cx, cy) = center?;
                self.buckets
                    .get(&(cx.saturating_add(dx), cy.saturating_add(dy)))
            })
            .flatten()
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn buckets_by_floor_division() {
        let grid = SpatialHashGrid::build(
            &[
                Vec2::new(5.0, 5.0),
                Vec2::new(-5.0, 5.0),
                Vec2::new(150.0, -0.1),
            ],
            100.0,
        );

        assert_eq!(grid.cell_key(Vec2::new(5.0, 5.0)), (0, 0));
        assert_eq!(grid.cell_key(Vec2::new(-5.0, 5.0)), (-1, 0));
        assert_eq!(grid.cell_key(Vec2::new(150.0, -0.1)), (1, -1));
        assert_eq!(grid.bucket_count(), 3);
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn neighbors_include_adjacent_cells_only() {
        let positions = [
            Vec2::new(10.0, 10.0),
            Vec2::new(110.0, 110.0),
            Vec2::new(-90.0, 10.0),
            Vec2::new(250.0, 10.0),
        ];
        let grid = SpatialHashGrid::build(&positions, 100.0);

        let neighbors: HashSet<usize> = grid.neighbors_of(0).collect();

        assert_eq!(neighbors, HashSet::from([0, 1, 2]));
    }

    #[test]
    fn unknown_index_has_no_neighbors() {
        let grid = SpatialHashGrid::build(&[Vec2::ZERO], 10.0);
        assert_eq!(grid.neighbors_of(5).count(), 0);
    }

    #[test]
    fn rebuild_drops_stale_buckets() {
        let mut grid = SpatialHashGrid::build(&[Vec2::new(0.0, 0.0), Vec2::new(500.0, 0.0)], 100.0);
        assert_eq!(grid.bucket_count(), 2);

        grid.rebuild(&[Vec2::new(1.0, 1.0)], 100.0);

        assert_eq!(grid.bucket_count(), 1);
        assert_eq!(grid.neighbors_of(0).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn no_false_negatives_against_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let radius = 75.0;

        for _ in 0..20 {
            let positions: Vec<Vec2> = (0..150)
                .map(|_| Vec2::new(rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0)))
                .collect();
            let grid = SpatialHashGrid::build(&positions, radius);

            for i in 0..positions.len() {
                let candidates: HashSet<usize> = grid.neighbors_of(i).collect();
                for j in 0..positions.len() {
                    if positions[i].distance(positions[j]) < radius {
                        assert!(
                            candidates.contains(&j),
                            "node {j} within range of {i} but not a candidate"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn coincident_nodes_share_a_bucket() {
        let grid = SpatialHashGrid::build(&[Vec2::new(3.0, 3.0); 4], 50.0);
        assert_eq!(grid.bucket_count(), 1);
        assert_eq!(grid.neighbors_of(2).count(), 4);
    }
}
