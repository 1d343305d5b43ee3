//! The layout engine facade
//!
//! [`LayoutEngine`] is the only type a host needs. All mutation funnels
//! through its methods: structural updates, gestures and ticks are discrete
//! calls, never concurrent with each other. Hosts that drive it from several
//! threads must serialize access themselves.

use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::clock::{Phase, SimulationClock, StepScratch};
use crate::config::LayoutConfig;
use crate::error::LayoutResult;
use crate::frame::Frame;
use crate::graph::{EdgeSpec, Graph, GraphData, Node, NodeId, NodeSpec, ReconcileReport};
use crate::integrator::SimulationState;
use crate::interaction::InteractionController;
use crate::viewport::Viewport;

/// Force-directed layout engine for one graph view
#[derive(Debug)]
pub struct LayoutEngine {
    config: LayoutConfig,
    graph: Graph,
    state: SimulationState,
    interaction: InteractionController,
    clock: SimulationClock,
    scratch: StepScratch,
    rng: StdRng,
}

impl LayoutEngine {
    /// Create an empty engine; fails if `config` does not validate
    pub fn new(config: LayoutConfig) -> LayoutResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            graph: Graph::new(),
            state: SimulationState::default(),
            interaction: InteractionController::default(),
            clock: SimulationClock::new(),
            scratch: StepScratch::default(),
            rng,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Current graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Node by id
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.graph.node(id)
    }

    /// Current simulation state
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Current simulation temperature
    pub fn temperature(&self) -> f32 {
        self.state.temperature
    }

    /// Current viewport
    pub fn viewport(&self) -> &Viewport {
        self.interaction.viewport()
    }

    /// Whether the next tick would skip physics
    pub fn is_idle(&self) -> bool {
        SimulationClock::gate(&self.graph, &self.state, &self.config) == Phase::Idle
    }

    /// World-space positions keyed by id
    pub fn positions(&self) -> BTreeMap<NodeId, Vec2> {
        self.graph
            .nodes()
            .iter()
            .map(|n| (n.id.clone(), n.position))
            .collect()
    }

    /// Replace the graph structure
    ///
    /// New ids are spawned, absent ids removed, retained ids keep their
    /// position and velocity. Always wakes the simulation.
    pub fn set_graph(&mut self, nodes: &[NodeSpec], edges: &[EdgeSpec]) -> ReconcileReport {
        let report = self
            .graph
            .reconcile(nodes, edges, &self.config, &mut self.rng);
        self.interaction.reconcile(&self.graph, &mut self.state);
        self.state.wake();
        report
    }

    /// [`set_graph`](Self::set_graph) from a [`GraphData`]
    pub fn load(&mut self, data: &GraphData) -> ReconcileReport {
        self.set_graph(&data.nodes, &data.edges)
    }

    /// Node under a screen point
    pub fn pick(&self, screen_point: Vec2) -> Option<NodeId> {
        self.interaction.pick(&self.graph, screen_point)
    }

    /// Pin a node and start dragging it; false for unknown ids
    pub fn begin_drag(&mut self, id: &NodeId) -> bool {
        self.interaction
            .begin_drag(&mut self.graph, &mut self.state, id)
    }

    /// Move the dragged node by a screen-space delta; false if nothing is dragged
    pub fn drag_to(&mut self, screen_delta: Vec2) -> bool {
        self.interaction
            .drag_to(&mut self.graph, &mut self.state, screen_delta)
    }

    /// Release the dragged node; false if nothing is dragged
    pub fn end_drag(&mut self) -> bool {
        self.interaction.end_drag(&mut self.graph, &mut self.state)
    }

    /// Pan the view by a screen-space delta
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.interaction
            .pan(&mut self.state, screen_delta, &self.config);
    }

    /// Zoom by `factor` around a screen-space anchor
    pub fn zoom(&mut self, factor: f32, anchor_screen_point: Vec2) {
        self.interaction
            .zoom(&mut self.state, factor, anchor_screen_point, &self.config);
    }

    /// Resize the drawing surface
    pub fn resize(&mut self, width: f32, height: f32) {
        self.interaction.resize(width, height);
    }

    /// Frame the whole graph with `padding` pixels on each side
    pub fn fit_to_view(&mut self, padding: f32) {
        self.interaction
            .fit_to_view(&self.graph, padding, &self.config);
    }

    /// Advance by one tick and return the projected frame
    pub fn tick(&mut self, dt: Duration) -> Frame {
        let outcome = self.clock.tick(
            dt,
            &mut self.graph,
            &mut self.state,
            &mut self.scratch,
            &self.config,
        );
        Frame::build(
            &self.graph,
            self.interaction.viewport(),
            self.config.cull_margin,
            outcome,
        )
    }

    /// Tick until the clock goes idle or `max_ticks` is reached
    ///
    /// Returns the number of physics steps that ran. Frames are not built.
    pub fn run_until_idle(&mut self, max_ticks: usize) -> usize {
        let mut steps = 0;
        for _ in 0..max_ticks {
            let outcome = self.clock.tick(
                Duration::ZERO,
                &mut self.graph,
                &mut self.state,
                &mut self.scratch,
                &self.config,
            );
            if !outcome.stepped() {
                break;
            }
            steps += 1;
        }
        steps
    }
}
