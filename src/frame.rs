//! Data handed to the renderer after every tick
//!
//! Positions are already projected through the viewport. Elements outside the
//! surface (plus `cull_margin`) are flagged rather than dropped, so a host can
//! still draw slightly off-screen elements while scrolling.

use glam::Vec2;
use serde::Serialize;

use crate::clock::TickOutcome;
use crate::graph::{Category, Graph, NodeId};
use crate::viewport::Viewport;

/// A node ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: NodeId,
    pub screen_position: Vec2,
    /// Radius in screen pixels
    pub display_radius: f32,
    pub category: Category,
    pub pinned: bool,
    /// Entirely outside the visible area plus margin
    pub culled: bool,
}

/// An edge ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderEdge {
    pub source_screen_position: Vec2,
    pub target_screen_position: Vec2,
    /// Entirely outside the visible area plus margin
    pub culled: bool,
}

/// Everything the renderer needs for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    pub tick: TickOutcome,
}

impl Frame {
    /// Project the graph through `viewport` and flag off-screen elements
    pub fn build(graph: &Graph, viewport: &Viewport, cull_margin: f32, tick: TickOutcome) -> Self {
        let visible = viewport.visible_rect(cull_margin);

        let nodes: Vec<RenderNode> = graph
            .nodes()
            .iter()
            .map(|node| {
                let screen_position = viewport.world_to_screen(node.position);
                let display_radius = node.display_radius * viewport.scale;
                RenderNode {
                    id: node.id.clone(),
                    screen_position,
                    display_radius,
                    category: node.category,
                    pinned: node.pinned,
                    culled: !visible.intersects_circle(screen_position, display_radius),
                }
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|edge| {
                let from = nodes[edge.source].screen_position;
                let to = nodes[edge.target].screen_position;
                RenderEdge {
                    source_screen_position: from,
                    target_screen_position: to,
                    culled: !visible.intersects_segment(from, to),
                }
            })
            .collect();

        Self { nodes, edges, tick }
    }

    /// Nodes not flagged for culling
    pub fn visible_nodes(&self) -> impl Iterator<Item = &RenderNode> {
        self.nodes.iter().filter(|n| !n.culled)
    }

    /// Edges not flagged for culling
    pub fn visible_edges(&self) -> impl Iterator<Item = &RenderEdge> {
        self.edges.iter().filter(|e| !e.culled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Phase;
    use crate::config::LayoutConfig;
    use crate::graph::{EdgeSpec, NodeSpec};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn idle() -> TickOutcome {
        TickOutcome {
            phase: Phase::Idle,
            max_speed: 0.0,
            temperature: 0.0,
        }
    }

    fn graph_at(points: &[(&str, f32, f32)], edges: &[(&str, &str)]) -> Graph {
        let specs: Vec<NodeSpec> = points
            .iter()
            .map(|(id, _, _)| NodeSpec::new(*id, Category::Primary))
            .collect();
        let edges: Vec<EdgeSpec> = edges.iter().map(|(a, b)| EdgeSpec::new(*a, *b)).collect();
        let mut graph = Graph::new();
        let mut rng = StdRng::seed_from_u64(5);
        graph.reconcile(&specs, &edges, &LayoutConfig::default(), &mut rng);
        for (node, (_, x, y)) in graph.nodes_mut().iter_mut().zip(points) {
            node.position = Vec2::new(*x, *y);
        }
        graph
    }

    #[test]
    fn projects_through_viewport() {
        let graph = graph_at(&[("a", 10.0, -20.0)], &[]);
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.scale = 2.0;

        let frame = Frame::build(&graph, &viewport, 0.0, idle());

        assert_eq!(frame.nodes[0].screen_position, Vec2::new(420.0, 260.0));
        assert_eq!(frame.nodes[0].display_radius, 24.0);
        assert!(!frame.nodes[0].culled);
    }

    #[test]
    fn flags_offscreen_nodes_instead_of_dropping() {
        let graph = graph_at(&[("near", 0.0, 0.0), ("far", 5000.0, 0.0)], &[]);
        let viewport = Viewport::new(800.0, 600.0);

        let frame = Frame::build(&graph, &viewport, 64.0, idle());

        assert_eq!(frame.nodes.len(), 2);
        assert!(!frame.nodes[0].culled);
        assert!(frame.nodes[1].culled);
        assert_eq!(frame.visible_nodes().count(), 1);
    }

    #[test]
    fn margin_keeps_slightly_offscreen_nodes() {
        // Screen x = 400 + 430 = 830, 30px past the right edge
        let graph = graph_at(&[("edge", 430.0, 0.0)], &[]);
        let viewport = Viewport::new(800.0, 600.0);

        let with_margin = Frame::build(&graph, &viewport, 64.0, idle());
        let without_margin = Frame::build(&graph, &viewport, 0.0, idle());

        assert!(!with_margin.nodes[0].culled);
        assert!(without_margin.nodes[0].culled);
    }

    #[test]
    fn edges_crossing_the_view_are_visible() {
        let graph = graph_at(
            &[
                ("left", -2000.0, 0.0),
                ("right", 2000.0, 0.0),
                ("up", -2000.0, -2000.0),
            ],
            &[("left", "right"), ("left", "up")],
        );
        let viewport = Viewport::new(800.0, 600.0);

        let frame = Frame::build(&graph, &viewport, 0.0, idle());

        assert!(frame.nodes.iter().all(|n| n.culled));
        assert!(!frame.edges[0].culled);
        assert!(frame.edges[1].culled);
        assert_eq!(frame.visible_edges().count(), 1);
    }

    #[test]
    fn serializes_for_hosts() {
        let graph = graph_at(&[("a", 0.0, 0.0), ("b", 100.0, 0.0)], &[("a", "b")]);
        let frame = Frame::build(&graph, &Viewport::default(), 64.0, idle());

        let json = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["nodes"][1]["id"], "b");
        assert_eq!(json["nodes"][1]["screen_position"][0], 500.0);
        assert_eq!(json["edges"][0]["culled"], false);
        assert_eq!(json["tick"]["phase"], "idle");
    }
}
