//! notegraph - force-directed layout for personal knowledge base backlink graphs.
//!
//! The engine keeps a live 2D layout of linked notes: linked notes settle at a
//! readable distance, unrelated notes push apart, and the whole map stays
//! explorable with pan, zoom and drag gestures.
//!
//! The host owns the loop. It hands over structure with
//! [`LayoutEngine::set_graph`], forwards gestures, and calls
//! [`LayoutEngine::tick`] at its own cadence to get a [`Frame`] of projected
//! positions. Once the layout settles, ticks become no-ops until the next
//! structural change or interaction.
//!
//! ```rust
//! use std::time::Duration;
//! use notegraph::{Category, EdgeSpec, LayoutConfig, LayoutEngine, NodeSpec};
//!
//! let mut engine = LayoutEngine::new(LayoutConfig::default().with_seed(7)).unwrap();
//! engine.set_graph(
//!     &[
//!         NodeSpec::new("inbox", Category::Primary),
//!         NodeSpec::new("ideas", Category::Primary),
//!         NodeSpec::new("#draft", Category::Secondary),
//!     ],
//!     &[EdgeSpec::new("inbox", "ideas"), EdgeSpec::new("ideas", "#draft")],
//! );
//!
//! let frame = engine.tick(Duration::from_millis(33));
//! assert_eq!(frame.nodes.len(), 3);
//! assert_eq!(frame.edges.len(), 2);
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod forces;
pub mod frame;
pub mod graph;
pub mod integrator;
pub mod interaction;
pub mod spatial;
pub mod viewport;

pub use clock::{Phase, SimulationClock, TickOutcome};
pub use config::LayoutConfig;
pub use engine::LayoutEngine;
pub use error::{ConfigError, LayoutError, LayoutResult};
pub use frame::{Frame, RenderEdge, RenderNode};
pub use graph::{Category, EdgeSpec, GraphData, NodeId, NodeSpec, ReconcileReport};
pub use integrator::SimulationState;
pub use viewport::Viewport;

pub use glam::Vec2;
