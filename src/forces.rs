//! Force model: repulsion, edge springs and center gravity
//!
//! All three contributions are plain functions of positions and the config.
//! Pairwise forces are computed once per pair and applied with opposite
//! signs, so the force on `i` from `j` is always the exact negation of the
//! force on `j` from `i`.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::config::LayoutConfig;
use crate::graph::{Edge, Node};
use crate::spatial::SpatialHashGrid;

/// Squared distance below which two points count as coincident
const COINCIDENT_DISTANCE_SQ: f32 = 1e-8;

/// Repulsion distances are floored at this value
const MIN_REPULSION_DISTANCE: f32 = 1.0;

/// Unit vector pointing from `other` to `point`, and the distance between them
///
/// Coincident points get a deterministic direction derived from the two
/// indices, negated when the indices are swapped.
pub fn separation(point: Vec2, other: Vec2, index: usize, other_index: usize) -> (Vec2, f32) {
    let delta = point - other;
    let distance_sq = delta.length_squared();
    if distance_sq > COINCIDENT_DISTANCE_SQ {
        let distance = distance_sq.sqrt();
        return (delta / distance, distance);
    }

    let (low, high) = (index.min(other_index), index.max(other_index));
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214 + 0.37) * TAU;
    let direction = Vec2::new(angle.cos(), angle.sin());
    if index < other_index {
        (direction, 0.0)
    } else {
        (-direction, 0.0)
    }
}

/// Repulsive force on `index` from `other_index`
///
/// Magnitude is `repulsion_constant / distance²` with the distance floored at
/// 1.0. Pairs farther apart than `cell_size` contribute nothing.
pub fn repulsion(
    point: Vec2,
    other: Vec2,
    index: usize,
    other_index: usize,
    config: &LayoutConfig,
) -> Vec2 {
    if point.distance_squared(other) > config.cell_size * config.cell_size {
        return Vec2::ZERO;
    }

    let (direction, distance) = separation(point, other, index, other_index);
    let distance = distance.max(MIN_REPULSION_DISTANCE);
    direction * (config.repulsion_constant / (distance * distance))
}

/// Spring force on `index` along an edge to `other_index`
///
/// Hooke's law with a non-zero rest length: positive stretch pulls the node
/// toward its neighbor, compression pushes it away.
pub fn spring(
    point: Vec2,
    other: Vec2,
    index: usize,
    other_index: usize,
    config: &LayoutConfig,
) -> Vec2 {
    let (outward, distance) = separation(other, point, other_index, index);
    outward * ((distance - config.rest_length) * config.spring_constant)
}

/// Pull toward the configured center
pub fn gravity(point: Vec2, config: &LayoutConfig) -> Vec2 {
    (config.center - point) * config.gravity
}

/// Sum all contributions into `forces` (resized to `nodes.len()`)
///
/// `grid` must have been rebuilt from the current node positions. Pinned
/// nodes still push and pull their neighbors but receive no gravity.
pub fn accumulate(
    nodes: &[Node],
    edges: &[Edge],
    grid: &SpatialHashGrid,
    config: &LayoutConfig,
    forces: &mut Vec<Vec2>,
) {
    forces.clear();
    forces.resize(nodes.len(), Vec2::ZERO);

    for i in 0..nodes.len() {
        for j in grid.neighbors_of(i) {
            if j <= i {
                continue;
            }
            let force = repulsion(nodes[i].position, nodes[j].position, i, j, config);
            forces[i] += force;
            forces[j] -= force;
        }
    }

    for edge in edges {
        let (a, b) = (edge.source, edge.target);
        let force = spring(nodes[a].position, nodes[b].position, a, b, config);
        forces[a] += force;
        forces[b] -= force;
    }

    for (node, force) in nodes.iter().zip(forces.iter_mut()) {
        if !node.pinned {
            *force += gravity(node.position, config);
        }
    }
}
