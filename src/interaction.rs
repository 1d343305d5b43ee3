//! Gesture handling: picking, dragging, panning and zooming
//!
//! Drag gestures go `Idle -> Dragging -> Idle`. While dragging, the held node
//! is pinned and only moves through [`InteractionController::drag_to`].
//! Pan and zoom only touch the [`Viewport`]; they nudge the temperature so the
//! layout visibly breathes, but never feed into the forces.

use glam::Vec2;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::graph::{Graph, NodeId};
use crate::integrator::SimulationState;
use crate::viewport::{BoundingBox, Viewport};

/// Owns the viewport and translates gestures into state changes
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    viewport: Viewport,
}

impl InteractionController {
    /// Create a controller for the given viewport
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    /// Current viewport
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Node under a screen point, if any
    ///
    /// A node is hit within its drawn disc (`display_radius * scale` pixels),
    /// but never within less than `display_radius` pixels, so zoomed-out
    /// nodes stay grabbable. The closest hit wins.
    pub fn pick(&self, graph: &Graph, screen_point: Vec2) -> Option<NodeId> {
        let world = self.viewport.screen_to_world(screen_point);
        let scale = self.viewport.scale;
        graph
            .nodes()
            .iter()
            .filter_map(|node| {
                let distance = node.position.distance(world);
                let reach = node.display_radius.max(node.display_radius / scale);
                (distance <= reach).then_some((node, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node.id.clone())
    }

    /// Pin `id` and start dragging it
    ///
    /// Returns false (and changes nothing) when the id is not in the graph.
    /// A drag already in progress on another node is released first.
    pub fn begin_drag(
        &mut self,
        graph: &mut Graph,
        state: &mut SimulationState,
        id: &NodeId,
    ) -> bool {
        let Some(index) = graph.index_of(id) else {
            debug!(%id, "ignoring drag of unknown node");
            return false;
        };

        if state.dragging_node.as_ref().is_some_and(|held| held != id) {
            self.end_drag(graph, state);
        }

        let node = &mut graph.nodes_mut()[index];
        node.pinned = true;
        node.velocity = Vec2::ZERO;
        state.dragging_node = Some(id.clone());
        state.wake();
        debug!(%id, "drag started");
        true
    }

    /// Move the dragged node by a screen-space delta
    ///
    /// Returns false when no drag is in progress.
    pub fn drag_to(
        &mut self,
        graph: &mut Graph,
        state: &mut SimulationState,
        screen_delta: Vec2,
    ) -> bool {
        let Some(id) = state.dragging_node.as_ref() else {
            return false;
        };
        let Some(index) = graph.index_of(id) else {
            state.dragging_node = None;
            return false;
        };
        if !screen_delta.is_finite() {
            return false;
        }

        let delta = self.viewport.screen_delta_to_world(screen_delta);
        graph.nodes_mut()[index].position += delta;
        state.wake();
        true
    }

    /// Release the dragged node back to integration
    ///
    /// Returns false when no drag is in progress.
    pub fn end_drag(&mut self, graph: &mut Graph, state: &mut SimulationState) -> bool {
        let Some(id) = state.dragging_node.take() else {
            return false;
        };
        if let Some(index) = graph.index_of(&id) {
            graph.nodes_mut()[index].pinned = false;
        }
        debug!(%id, "drag ended");
        true
    }

    /// Drop a drag whose node disappeared in a structural update
    pub fn reconcile(&mut self, graph: &Graph, state: &mut SimulationState) {
        if let Some(id) = state.dragging_node.as_ref() {
            if graph.index_of(id).is_none() {
                debug!(%id, "dragged node removed by structural update");
                state.dragging_node = None;
            }
        }
    }

    /// Pan the view by a screen-space delta
    pub fn pan(&mut self, state: &mut SimulationState, screen_delta: Vec2, config: &LayoutConfig) {
        self.viewport.pan(screen_delta);
        state.bump(config.interaction_bump);
    }

    /// Zoom by `factor` around a screen-space anchor
    pub fn zoom(
        &mut self,
        state: &mut SimulationState,
        factor: f32,
        anchor: Vec2,
        config: &LayoutConfig,
    ) {
        self.viewport
            .zoom_at(factor, anchor, config.min_scale, config.max_scale);
        state.bump(config.interaction_bump);
    }

    /// Resize the drawing surface
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.resize(width, height);
    }

    /// Frame every node in the view
    pub fn fit_to_view(&mut self, graph: &Graph, padding: f32, config: &LayoutConfig) {
        let mut bounds = BoundingBox::empty();
        for node in graph.nodes() {
            bounds.include_circle(node.position, node.display_radius);
        }
        self.viewport
            .fit_to_bounds(&bounds, padding, config.min_scale, config.max_scale);
    }
}
