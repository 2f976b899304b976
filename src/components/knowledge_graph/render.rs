use std::collections::{HashMap, HashSet};

use super::filter::filter_nodes;
use super::layout::{CanvasSize, Point, layout, max_node_radius};
use super::model::GraphModel;
use super::state::ViewState;
use super::surface::{Stroke, Surface, TextStyle};
use super::types::{EdgeKind, NodeId, NodeKind};

/// Smallest drawn node radius.
pub const MIN_NODE_RADIUS: f64 = 4.0;
/// Largest drawn node radius on an uncrowded canvas.
pub const MAX_NODE_RADIUS: f64 = 20.0;

const EDGE_COLOR: &str = "rgb(136, 132, 216)";
const EDGE_HIGHLIGHT_COLOR: &str = "rgb(245, 158, 11)";
const NODE_OUTLINE_COLOR: &str = "#ffffff";
const SELECTION_RING_COLOR: &str = "#f59e0b";
const LABEL_COLOR: &str = "#000000";
const LABEL_FONT: &str = "12px sans-serif";
const SELECTED_LABEL_FONT: &str = "bold 12px sans-serif";
const LABEL_OFFSET: f64 = 15.0;

/// Drawn radius for a node of the given `size`. Non-decreasing in `size`.
pub fn node_radius(size: f64) -> f64 {
	(size / 3.0).clamp(MIN_NODE_RADIUS, MAX_NODE_RADIUS)
}

/// Line width for an edge. Non-decreasing in `weight`.
pub fn edge_line_width(weight: f64) -> f64 {
	0.5 + weight.clamp(0.0, 1.0) * 3.0
}

/// Line opacity for an edge. Non-decreasing in `weight`.
pub fn edge_opacity(weight: f64) -> f64 {
	0.15 + weight.clamp(0.0, 1.0) * 0.5
}

fn edge_dash(kind: EdgeKind) -> Vec<f64> {
	match kind {
		EdgeKind::Citation => Vec::new(),
		EdgeKind::Collaboration => vec![6.0, 4.0],
		EdgeKind::Conceptual => vec![2.0, 3.0],
		EdgeKind::Methodological => vec![8.0, 3.0, 2.0, 3.0],
	}
}

/// Stroke for an edge of `weight` and `kind`. Highlighting only changes color.
pub fn edge_stroke(weight: f64, kind: EdgeKind, highlighted: bool) -> Stroke {
	Stroke {
		color: if highlighted {
			EDGE_HIGHLIGHT_COLOR
		} else {
			EDGE_COLOR
		}
		.to_string(),
		width: edge_line_width(weight),
		opacity: edge_opacity(weight),
		dash: edge_dash(kind),
	}
}

/// A visible node as it will be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameNode {
	/// Id of the drawn node.
	pub id: NodeId,
	/// Label drawn under the circle.
	pub label: String,
	/// Kind of the drawn node.
	pub kind: NodeKind,
	/// Layout position.
	pub center: Point,
	/// Drawn radius, capped so crowded frames stay on the canvas.
	pub radius: f64,
	/// Fill color.
	pub color: String,
	/// Whether this is the selected node.
	pub selected: bool,
	/// Shares an edge with the selected node.
	pub related: bool,
}

impl FrameNode {
	/// Whether `p` falls inside the drawn circle, edge included.
	pub fn contains(&self, p: Point) -> bool {
		self.center.distance(p) <= self.radius
	}
}

/// A visible edge. Endpoints are copied from the endpoint nodes' centers.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameEdge {
	/// Source node id.
	pub from: NodeId,
	/// Target node id.
	pub to: NodeId,
	/// Center of `from`.
	pub start: Point,
	/// Center of `to`.
	pub end: Point,
	/// Relationship strength in `[0, 1]`.
	pub weight: f64,
	/// Line style derived from weight, kind and selection.
	pub stroke: Stroke,
}

/// Geometry of one drawn frame, shared by the renderer and hit-testing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
	/// Canvas the frame was laid out for.
	pub canvas: CanvasSize,
	/// Nodes in draw order; later entries are on top.
	pub nodes: Vec<FrameNode>,
	/// Edges whose endpoints are both visible.
	pub edges: Vec<FrameEdge>,
}

impl Frame {
	/// Filter, lay out and style the snapshot for the current view.
	pub fn build(model: &GraphModel, view: &ViewState, canvas: CanvasSize) -> Self {
		let visible = filter_nodes(model.nodes(), &view.search_term, view.category);
		let positions = layout(visible.len(), canvas);
		let radius_limit = max_node_radius(visible.len(), canvas);

		let selected = view.selected.as_deref();
		let related: HashSet<&str> = selected
			.map(|id| {
				model
					.neighbors_of(id)
					.into_iter()
					.map(|n| n.id.as_str())
					.collect()
			})
			.unwrap_or_default();

		let nodes: Vec<FrameNode> = visible
			.iter()
			.zip(positions)
			.map(|(node, center)| FrameNode {
				id: node.id.clone(),
				label: node.label.clone(),
				kind: node.kind,
				center,
				radius: node_radius(node.size).min(radius_limit),
				color: node.color.clone(),
				selected: selected == Some(node.id.as_str()),
				related: related.contains(node.id.as_str()),
			})
			.collect();

		let slots: HashMap<&str, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();
		let edges = model
			.edges()
			.iter()
			.filter_map(|edge| {
				let (&a, &b) = (slots.get(edge.from.as_str())?, slots.get(edge.to.as_str())?);
				let highlighted = selected.is_some_and(|id| edge.touches(id));
				Some(FrameEdge {
					from: edge.from.clone(),
					to: edge.to.clone(),
					start: nodes[a].center,
					end: nodes[b].center,
					weight: edge.weight,
					stroke: edge_stroke(edge.weight, edge.kind, highlighted),
				})
			})
			.collect();

		Self {
			canvas,
			nodes,
			edges,
		}
	}

	/// Topmost node whose circle contains `(x, y)`.
	pub fn node_at_position(&self, x: f64, y: f64) -> Option<&FrameNode> {
		let p = Point::new(x, y);
		if !self.canvas.contains(p) {
			return None;
		}
		self.nodes.iter().rev().find(|node| node.contains(p))
	}

	/// The drawn node with `id`, if visible.
	pub fn node(&self, id: &str) -> Option<&FrameNode> {
		self.nodes.iter().find(|node| node.id == id)
	}

	/// Whether nothing is visible.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Draw `frame` onto `surface`: clear, then edges, nodes and labels.
pub fn render<S: Surface + ?Sized>(frame: &Frame, surface: &mut S) {
	surface.clear(frame.canvas);
	draw_edges(frame, surface);
	draw_nodes(frame, surface);
	draw_labels(frame, surface);
}

fn draw_edges<S: Surface + ?Sized>(frame: &Frame, surface: &mut S) {
	for edge in &frame.edges {
		surface.stroke_line(edge.start, edge.end, &edge.stroke);
	}
}

fn draw_nodes<S: Surface + ?Sized>(frame: &Frame, surface: &mut S) {
	let outline = Stroke::solid(NODE_OUTLINE_COLOR, 2.0);
	for node in &frame.nodes {
		surface.fill_circle(node.center, node.radius, &node.color);
		surface.stroke_circle(node.center, node.radius, &outline);

		if node.selected {
			surface.stroke_circle(
				node.center,
				node.radius + 4.0,
				&Stroke::solid(SELECTION_RING_COLOR, 3.0),
			);
		} else if node.related {
			surface.stroke_circle(
				node.center,
				node.radius + 2.0,
				&Stroke {
					opacity: 0.6,
					..Stroke::solid(SELECTION_RING_COLOR, 1.5)
				},
			);
		}
	}
}

fn draw_labels<S: Surface + ?Sized>(frame: &Frame, surface: &mut S) {
	for node in &frame.nodes {
		let style = TextStyle {
			color: LABEL_COLOR.to_string(),
			font: if node.selected {
				SELECTED_LABEL_FONT
			} else {
				LABEL_FONT
			}
			.to_string(),
		};
		let at = Point::new(node.center.x, node.center.y + node.radius + LABEL_OFFSET);
		surface.fill_text(&node.label, at, &style);
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::knowledge_graph::filter::CategoryFilter;
	use crate::components::knowledge_graph::surface::{DisplayList, DrawCommand};
	use crate::components::knowledge_graph::types::{Edge, NodeRecord};

	const CANVAS: CanvasSize = CanvasSize::new(800.0, 600.0);

	fn model() -> GraphModel {
		GraphModel::new(
			vec![
				NodeRecord::new("1", "Transformer", NodeKind::Concept, 50.0),
				NodeRecord::new("2", "Attention Mechanism", NodeKind::Concept, 45.0),
				NodeRecord::new("3", "Vaswani et al.", NodeKind::Author, 40.0),
				NodeRecord::new("6", "ImageNet", NodeKind::Dataset, 35.0),
				NodeRecord::new("7", "ResNet", NodeKind::Method, 6.0),
			],
			vec![
				Edge {
					from: "1".into(),
					to: "2".into(),
					weight: 0.9,
					kind: EdgeKind::Conceptual,
				},
				Edge {
					from: "3".into(),
					to: "1".into(),
					weight: 0.8,
					kind: EdgeKind::Citation,
				},
				Edge {
					from: "6".into(),
					to: "7".into(),
					weight: 0.6,
					kind: EdgeKind::Methodological,
				},
			],
		)
		.unwrap()
	}

	#[test]
	fn draws_edges_then_nodes_then_labels() {
		let frame = Frame::build(&model(), &ViewState::default(), CANVAS);
		let mut list = DisplayList::new();
		render(&frame, &mut list);

		assert!(matches!(list.commands[0], DrawCommand::Clear(_)));
		let rank = |cmd: &DrawCommand| match cmd {
			DrawCommand::Clear(_) => 0,
			DrawCommand::Line { .. } => 1,
			DrawCommand::FillCircle { .. } | DrawCommand::StrokeCircle { .. } => 2,
			DrawCommand::Text { .. } => 3,
		};
		let ranks: Vec<_> = list.commands.iter().map(rank).collect();
		assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
		assert_eq!(list.lines().count(), 3);
		assert_eq!(list.filled_circles().count(), 5);
		assert_eq!(list.texts().count(), 5);
	}

	#[test]
	fn edge_endpoints_reuse_node_centers() {
		let frame = Frame::build(&model(), &ViewState::default(), CANVAS);
		for edge in &frame.edges {
			assert_eq!(edge.start, frame.node(&edge.from).unwrap().center);
			assert_eq!(edge.end, frame.node(&edge.to).unwrap().center);
		}
	}

	#[test]
	fn hidden_endpoint_hides_edge() {
		let view = ViewState {
			category: CategoryFilter::Kind(NodeKind::Concept),
			..ViewState::default()
		};
		let frame = Frame::build(&model(), &view, CANVAS);
		assert_eq!(frame.nodes.len(), 2);
		assert_eq!(frame.edges.len(), 1);
		assert_eq!((frame.edges[0].from.as_str(), frame.edges[0].to.as_str()), ("1", "2"));
	}

	#[test]
	fn node_fill_and_radius_follow_model() {
		let frame = Frame::build(&model(), &ViewState::default(), CANVAS);
		let resnet = frame.node("7").unwrap();
		assert_eq!(resnet.color, NodeKind::Method.default_color());
		assert_eq!(resnet.radius, MIN_NODE_RADIUS);
		assert_eq!(frame.node("1").unwrap().radius, 50.0 / 3.0);
	}

	#[test]
	fn empty_frame_only_clears() {
		let empty = GraphModel::default();
		let frame = Frame::build(&empty, &ViewState::default(), CANVAS);
		let mut list = DisplayList::new();
		render(&frame, &mut list);
		assert_eq!(list.commands, vec![DrawCommand::Clear(CANVAS)]);
		assert!(frame.node_at_position(400.0, 300.0).is_none());
	}

	#[test]
	fn selection_marks_node_and_neighbors() {
		let view = ViewState {
			selected: Some("1".into()),
			..ViewState::default()
		};
		let frame = Frame::build(&model(), &view, CANVAS);
		assert!(frame.node("1").unwrap().selected);
		assert!(frame.node("2").unwrap().related);
		assert!(frame.node("3").unwrap().related);
		assert!(!frame.node("6").unwrap().related);

		let touching: Vec<_> = frame
			.edges
			.iter()
			.filter(|e| e.stroke.color == EDGE_HIGHLIGHT_COLOR)
			.map(|e| (e.from.as_str(), e.to.as_str()))
			.collect();
		assert_eq!(touching, vec![("1", "2"), ("3", "1")]);
	}

	#[test]
	fn hit_test_prefers_topmost() {
		let node = |id: &str| FrameNode {
			id: id.into(),
			label: id.into(),
			kind: NodeKind::Concept,
			center: Point::new(100.0, 100.0),
			radius: 10.0,
			color: "#000".into(),
			selected: false,
			related: false,
		};
		let frame = Frame {
			canvas: CANVAS,
			nodes: vec![node("under"), node("over")],
			edges: Vec::new(),
		};
		assert_eq!(frame.node_at_position(105.0, 100.0).unwrap().id, "over");
		assert!(frame.node_at_position(111.0, 100.0).is_none());
	}

	#[test]
	fn pointer_outside_canvas_misses() {
		let frame = Frame::build(&model(), &ViewState::default(), CanvasSize::new(120.0, 120.0));
		let center = frame.nodes[0].center;
		assert_eq!(frame.node_at_position(center.x, center.y).unwrap().id, "1");
		assert!(frame.node_at_position(-1.0, center.y).is_none());
		assert!(frame.node_at_position(center.x, 121.0).is_none());
	}

	#[test]
	fn radii_shrink_with_crowded_canvas() {
		let records = (0..50)
			.map(|i| NodeRecord::new(i.to_string(), format!("N{i}"), NodeKind::Concept, 60.0))
			.collect();
		let model = GraphModel::new(records, vec![]).unwrap();
		let canvas = CanvasSize::new(640.0, 384.0);
		let frame = Frame::build(&model, &ViewState::default(), canvas);
		let limit = max_node_radius(50, canvas);
		assert!(limit < MAX_NODE_RADIUS);
		assert!(frame.nodes.iter().all(|n| n.radius == limit));
	}

	proptest! {
		#[test]
		fn edge_stroke_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
			let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
			prop_assert!(edge_line_width(lo) <= edge_line_width(hi));
			prop_assert!(edge_opacity(lo) <= edge_opacity(hi));
			for kind in [EdgeKind::Citation, EdgeKind::Collaboration, EdgeKind::Conceptual, EdgeKind::Methodological] {
				let (s_lo, s_hi) = (edge_stroke(lo, kind, true), edge_stroke(hi, kind, false));
				prop_assert!(s_lo.width <= s_hi.width);
				prop_assert!(s_lo.opacity <= s_hi.opacity);
			}
		}

		#[test]
		fn every_drawn_center_selects_its_node(
			n in 1usize..=50,
			w in 240.0f64..1600.0,
			h in 240.0f64..1200.0,
		) {
			let records = (0..n)
				.map(|i| NodeRecord::new(i.to_string(), format!("N{i}"), NodeKind::Concept, 30.0))
				.collect();
			let model = GraphModel::new(records, vec![]).unwrap();
			let canvas = CanvasSize::new(w, h);
			let frame = Frame::build(&model, &ViewState::default(), canvas);
			prop_assert_eq!(frame.nodes.len(), n);
			for node in &frame.nodes {
				prop_assert!(canvas.contains(node.center));
				let hit = frame.node_at_position(node.center.x, node.center.y);
				prop_assert_eq!(hit.map(|h| h.id.as_str()), Some(node.id.as_str()));
			}
		}

		#[test]
		fn node_radius_is_monotonic(a in 0.01f64..500.0, b in 0.01f64..500.0) {
			let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
			prop_assert!(node_radius(lo) <= node_radius(hi));
			prop_assert!(node_radius(hi) <= MAX_NODE_RADIUS);
		}
	}
}
