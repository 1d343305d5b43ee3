//! Damped semi-implicit integration and simulation temperature
//!
//! Velocity is updated from the accumulated force first, then position from
//! the new velocity. Temperature scales every velocity update, so a cooled
//! simulation freezes in place and the clock can stop scheduling work.

use glam::Vec2;

use crate::config::LayoutConfig;
use crate::graph::{Node, NodeId};

/// Mutable simulation state shared by the integrator, the clock and the
/// interaction controller
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Kinetic-energy proxy in `[0, 1]`; 0 means fully idle
    pub temperature: f32,
    /// Node currently held by a drag gesture
    pub dragging_node: Option<NodeId>,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            dragging_node: None,
        }
    }
}

impl SimulationState {
    /// Reset temperature to 1 after a structural change or interaction
    pub fn wake(&mut self) {
        self.temperature = 1.0;
    }

    /// Raise temperature to at least `floor`
    pub fn bump(&mut self, floor: f32) {
        self.temperature = self.temperature.max(floor.clamp(0.0, 1.0));
    }

    /// Force the simulation to rest
    pub fn freeze(&mut self) {
        self.temperature = 0.0;
    }

    /// Apply one tick of geometric decay, or a hard stop once the layout has settled
    pub fn cool(&mut self, report: &IntegrationReport, config: &LayoutConfig) {
        self.temperature *= config.temperature_decay;
        if report.max_speed < config.settle_speed {
            self.freeze();
        }
    }
}

/// Outcome of one integration step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntegrationReport {
    /// Largest speed over all unpinned nodes
    pub max_speed: f32,
    /// Number of unpinned nodes that were integrated
    pub integrated: usize,
}

/// Advance velocities and positions by one tick
///
/// Unpinned nodes get `velocity = (velocity + force) * damping * temperature`
/// clamped per component to `max_velocity`, then `position += velocity`.
/// Pinned nodes have their velocity zeroed and their position left alone.
pub fn integrate(
    nodes: &mut [Node],
    forces: &[Vec2],
    temperature: f32,
    config: &LayoutConfig,
) -> IntegrationReport {
    let mut report = IntegrationReport::default();
    let scale = config.damping * temperature;
    let limit = Vec2::splat(config.max_velocity);

    for (node, &force) in nodes.iter_mut().zip(forces) {
        if node.pinned {
            node.velocity = Vec2::ZERO;
            continue;
        }

        let raw = (node.velocity + force) * scale;
        let velocity = if raw.is_finite() {
            raw.clamp(-limit, limit)
        } else {
            Vec2::ZERO
        };

        node.velocity = velocity;
        node.position += velocity;
        report.max_speed = report.max_speed.max(velocity.length());
        report.integrated += 1;
    }

    report
}
