//! Knowledge-graph view: snapshot model, ring layout, filtering, canvas
//! rendering and click selection.

mod component;
pub mod filter;
pub mod layout;
pub mod model;
pub mod render;
pub mod state;
pub mod surface;
pub mod types;

pub use component::KnowledgeGraphCanvas;
pub use filter::{CategoryFilter, filter_nodes, quick_search};
pub use layout::{CanvasSize, Point};
pub use model::{GraphDefect, GraphLoadError, GraphModel, MalformedGraphError};
pub use render::{Frame, FrameEdge, FrameNode, render};
pub use state::{GraphController, NodeDetails, ViewState, transition};
pub use surface::{DisplayList, DrawCommand, Stroke, Surface, TextStyle};
pub use types::{Edge, EdgeKind, GraphSnapshot, Node, NodeId, NodeKind, NodeRecord};
