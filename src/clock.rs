//! Tick driver deciding between a physics step and the idle fast-path
//!
//! The host owns the loop (timer, animation callback, game loop) and calls
//! [`SimulationClock::tick`] at its own cadence, ~30 Hz being plenty for
//! layout convergence. The clock gates on temperature and drag state, and on
//! an active tick runs grid rebuild, force accumulation, integration and
//! cooling, in that order.

use std::time::Duration;

use glam::Vec2;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::LayoutConfig;
use crate::forces;
use crate::graph::Graph;
use crate::integrator::{self, SimulationState};
use crate::spatial::SpatialHashGrid;

/// Whether the clock is doing work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No physics runs; ticks only check the gate
    Idle,
    /// Physics steps run every tick
    Active,
}

/// Per-tick buffers derived from node positions
///
/// Rebuilt every active tick and never read as authoritative state.
#[derive(Debug, Default)]
pub struct StepScratch {
    grid: SpatialHashGrid,
    positions: Vec<Vec2>,
    forces: Vec<Vec2>,
}

/// Result of one call to [`SimulationClock::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickOutcome {
    /// Phase the gate chose for this tick
    pub phase: Phase,
    /// Largest node speed produced by this tick (0 when idle)
    pub max_speed: f32,
    /// Temperature after the tick
    pub temperature: f32,
}

impl TickOutcome {
    /// Whether a physics step ran
    pub fn stepped(&self) -> bool {
        self.phase == Phase::Active
    }
}

/// Cooperative scheduler for the simulation
#[derive(Debug, Clone)]
pub struct SimulationClock {
    last_phase: Phase,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            last_phase: Phase::Idle,
        }
    }
}

impl SimulationClock {
    /// Create an idle clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase the most recent tick ran in
    pub fn last_phase(&self) -> Phase {
        self.last_phase
    }

    /// Decide whether the next tick should run physics
    pub fn gate(graph: &Graph, state: &SimulationState, config: &LayoutConfig) -> Phase {
        if graph.len() < 2 {
            return Phase::Idle;
        }
        if state.temperature < config.idle_temperature && !graph.any_pinned() {
            return Phase::Idle;
        }
        Phase::Active
    }

    /// Advance the simulation by at most one physics step
    ///
    /// Idle ticks leave every position untouched. A graph with fewer than two
    /// nodes has nothing to lay out and is frozen on the spot.
    pub fn tick(
        &mut self,
        dt: Duration,
        graph: &mut Graph,
        state: &mut SimulationState,
        scratch: &mut StepScratch,
        config: &LayoutConfig,
    ) -> TickOutcome {
        if graph.len() < 2 {
            state.freeze();
        }

        let phase = Self::gate(graph, state, config);
        if phase != self.last_phase {
            debug!(?phase, temperature = state.temperature, "simulation phase changed");
            self.last_phase = phase;
        }

        if phase == Phase::Idle {
            return TickOutcome {
                phase,
                max_speed: 0.0,
                temperature: state.temperature,
            };
        }

        if state.temperature > 0.0 {
            scratch.positions.clear();
            scratch
                .positions
                .extend(graph.nodes().iter().map(|n| n.position));
            scratch.grid.rebuild(&scratch.positions, config.cell_size);

            forces::accumulate(
                graph.nodes(),
                graph.edges(),
                &scratch.grid,
                config,
                &mut scratch.forces,
            );
        } else {
            // Held at zero temperature: integration zeroes every velocity
            scratch.forces.clear();
            scratch.forces.resize(graph.len(), Vec2::ZERO);
        }

        let report = integrator::integrate(
            graph.nodes_mut(),
            &scratch.forces,
            state.temperature,
            config,
        );
        state.cool(&report, config);

        trace!(
            dt_ms = dt.as_secs_f32() * 1000.0,
            temperature = state.temperature,
            max_speed = report.max_speed,
            buckets = scratch.grid.bucket_count(),
            "physics step"
        );

        TickOutcome {
            phase,
            max_speed: report.max_speed,
            temperature: state.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Category, EdgeSpec, NodeSpec};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const DT: Duration = Duration::from_millis(33);

    fn graph_of(ids: &[&str], edges: &[(&str, &str)]) -> Graph {
        let nodes: Vec<NodeSpec> = ids
            .iter()
            .map(|id| NodeSpec::new(*id, Category::Primary))
            .collect();
        let edges: Vec<EdgeSpec> = edges.iter().map(|(a, b)| EdgeSpec::new(*a, *b)).collect();
        let mut graph = Graph::new();
        let mut rng = StdRng::seed_from_u64(11);
        graph.reconcile(&nodes, &edges, &LayoutConfig::default(), &mut rng);
        graph
    }

    fn positions(graph: &Graph) -> Vec<Vec2> {
        graph.nodes().iter().map(|n| n.position).collect()
    }

    #[test]
    fn gate_idles_when_cold_and_unpinned() {
        let config = LayoutConfig::default();
        let graph = graph_of(&["a", "b"], &[]);
        let cold = SimulationState {
            temperature: 0.0,
            dragging_node: None,
        };

        assert_eq!(SimulationClock::gate(&graph, &cold, &config), Phase::Idle);
        assert_eq!(
            SimulationClock::gate(&graph, &SimulationState::default(), &config),
            Phase::Active
        );
    }

    #[test]
    fn gate_stays_active_while_pinned() {
        let config = LayoutConfig::default();
        let mut graph = graph_of(&["a", "b"], &[]);
        graph.nodes_mut()[0].pinned = true;
        let cold = SimulationState {
            temperature: 0.0,
            dragging_node: None,
        };

        assert_eq!(SimulationClock::gate(&graph, &cold, &config), Phase::Active);
    }

    #[test]
    fn idle_tick_leaves_positions_unchanged() {
        let config = LayoutConfig::default();
        let mut graph = graph_of(&["a", "b", "c"], &[("a", "b")]);
        let mut state = SimulationState {
            temperature: 0.0,
            dragging_node: None,
        };
        let mut clock = SimulationClock::new();
        let mut scratch = StepScratch::default();
        let before = positions(&graph);

        let outcome = clock.tick(DT, &mut graph, &mut state, &mut scratch, &config);

        assert!(!outcome.stepped());
        assert_eq!(positions(&graph), before);
    }

    #[test]
    fn active_tick_moves_nodes_and_cools() {
        let config = LayoutConfig::default();
        let mut graph = graph_of(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let mut state = SimulationState::default();
        let mut clock = SimulationClock::new();
        let mut scratch = StepScratch::default();
        let before = positions(&graph);

        let outcome = clock.tick(DT, &mut graph, &mut state, &mut scratch, &config);

        assert!(outcome.stepped());
        assert_eq!(clock.last_phase(), Phase::Active);
        assert_ne!(positions(&graph), before);
        assert!(state.temperature < 1.0);
        assert_eq!(outcome.temperature, state.temperature);
    }

    #[test]
    fn cold_held_layout_skips_force_work() {
        let config = LayoutConfig::default();
        let mut graph = graph_of(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        graph.nodes_mut()[1].pinned = true;
        graph.nodes_mut()[0].velocity = Vec2::new(3.0, -2.0);
        let mut state = SimulationState {
            temperature: 0.0,
            dragging_node: None,
        };
        let mut clock = SimulationClock::new();
        let mut scratch = StepScratch::default();
        let before = positions(&graph);

        let outcome = clock.tick(DT, &mut graph, &mut state, &mut scratch, &config);

        assert!(outcome.stepped());
        assert_eq!(outcome.max_speed, 0.0);
        assert!(scratch.grid.is_empty());
        assert_eq!(positions(&graph), before);
        assert!(graph.nodes().iter().all(|n| n.velocity == Vec2::ZERO));
    }

    #[test]
    fn single_node_stays_idle() {
        let config = LayoutConfig::default();
        let mut graph = graph_of(&["solo"], &[]);
        let mut state = SimulationState::default();
        let mut clock = SimulationClock::new();
        let mut scratch = StepScratch::default();
        let before = positions(&graph);

        let outcome = clock.tick(DT, &mut graph, &mut state, &mut scratch, &config);

        assert!(!outcome.stepped());
        assert_eq!(state.temperature, 0.0);
        assert_eq!(positions(&graph), before);
    }

    #[test]
    fn eventually_goes_idle() {
        let config = LayoutConfig::default();
        let mut graph = graph_of(&["a", "b", "c", "d"], &[("a", "b"), ("c", "d")]);
        let mut state = SimulationState::default();
        let mut clock = SimulationClock::new();
        let mut scratch = StepScratch::default();

        let steps = (0..1000)
            .take_while(|_| {
                clock
                    .tick(DT, &mut graph, &mut state, &mut scratch, &config)
                    .stepped()
            })
            .count();

        assert!(steps < 500, "took {steps} steps to settle");
        assert_eq!(clock.last_phase(), Phase::Idle);
    }
}
