use std::sync::Arc;

use log::debug;

use super::filter::{CategoryFilter, filter_nodes};
use super::layout::CanvasSize;
use super::model::GraphModel;
use super::render::{Frame, render};
use super::surface::Surface;
use super::types::{Node, NodeId, NodeKind};

/// Search, category and selection of one graph session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
	/// Case-insensitive label substring; empty matches everything.
	pub search_term: String,
	/// Kind restriction.
	pub category: CategoryFilter,
	/// `None` while idle.
	pub selected: Option<NodeId>,
}

impl ViewState {
	/// Whether nothing is selected.
	pub fn is_idle(&self) -> bool {
		self.selected.is_none()
	}
}

/// View state after a click at `(x, y)` on `frame`.
///
/// A hit selects the topmost node under the pointer; a miss, including any
/// point outside the canvas, returns to idle.
pub fn transition(view: &ViewState, frame: &Frame, x: f64, y: f64) -> ViewState {
	ViewState {
		selected: frame.node_at_position(x, y).map(|node| node.id.clone()),
		..view.clone()
	}
}

/// What the details panel shows for the selected node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDetails {
	/// Selected node id.
	pub id: NodeId,
	/// Its label.
	pub label: String,
	/// Its kind.
	pub kind: NodeKind,
	/// Number of touching edges.
	pub degree: usize,
	/// `(id, label)` of every neighbor, in edge order.
	pub related: Vec<(NodeId, String)>,
}

impl NodeDetails {
	/// Details for `id`, or `None` if it is not in `model`.
	pub fn for_node(model: &GraphModel, id: &str) -> Option<Self> {
		let node = model.node_by_id(id)?;
		Some(Self {
			id: node.id.clone(),
			label: node.label.clone(),
			kind: node.kind,
			degree: node.degree,
			related: model
				.neighbors_of(id)
				.into_iter()
				.map(|n| (n.id.clone(), n.label.clone()))
				.collect(),
		})
	}
}

/// Owns the view state of a graph session and keeps the drawn frame in sync.
///
/// Every mutation rebuilds the [`Frame`] and redraws it onto the surface
/// passed to that call, so the canvas never shows a layout from a stale filter.
pub struct GraphController {
	model: Arc<GraphModel>,
	view: ViewState,
	canvas: CanvasSize,
	frame: Frame,
}

impl GraphController {
	/// Idle session over `model`.
	pub fn new(model: Arc<GraphModel>, canvas: CanvasSize) -> Self {
		Self::with_view(model, ViewState::default(), canvas)
	}

	/// Resume a session with an existing view state. A selection naming a
	/// node outside `model` is dropped.
	pub fn with_view(model: Arc<GraphModel>, mut view: ViewState, canvas: CanvasSize) -> Self {
		if view.selected.as_deref().is_some_and(|id| !model.contains(id)) {
			view.selected = None;
		}
		let frame = Frame::build(&model, &view, canvas);
		Self {
			model,
			view,
			canvas,
			frame,
		}
	}

	/// Current snapshot.
	pub fn model(&self) -> &GraphModel {
		&self.model
	}

	/// Current search, category and selection.
	pub fn view_state(&self) -> &ViewState {
		&self.view
	}

	/// Geometry of the last drawn frame.
	pub fn frame(&self) -> &Frame {
		&self.frame
	}

	/// Canvas size frames are laid out for.
	pub fn canvas(&self) -> CanvasSize {
		self.canvas
	}

	/// Id of the selected node, if any.
	pub fn selected_node_id(&self) -> Option<&str> {
		self.view.selected.as_deref()
	}

	/// Details panel data for the selection.
	pub fn selected_details(&self) -> Option<NodeDetails> {
		NodeDetails::for_node(&self.model, self.selected_node_id()?)
	}

	/// Nodes passing the current search and category, in snapshot order.
	pub fn filtered_nodes(&self) -> Vec<&Node> {
		filter_nodes(self.model.nodes(), &self.view.search_term, self.view.category)
	}

	/// Resolve a click against the current frame and redraw.
	pub fn handle_pointer_event<S: Surface + ?Sized>(
		&mut self,
		x: f64,
		y: f64,
		surface: &mut S,
	) -> &ViewState {
		let next = transition(&self.view, &self.frame, x, y);
		if next.selected != self.view.selected {
			debug!(
				"Selection {:?} -> {:?} at ({x:.1}, {y:.1})",
				self.view.selected, next.selected
			);
		}
		self.apply(next, surface);
		&self.view
	}

	/// Change the search term and redraw.
	pub fn set_search_term<S: Surface + ?Sized>(&mut self, term: impl Into<String>, surface: &mut S) {
		let next = ViewState {
			search_term: term.into(),
			..self.view.clone()
		};
		debug!("Search term set to {:?}", next.search_term);
		self.apply(next, surface);
	}

	/// Change the category filter and redraw.
	pub fn set_category<S: Surface + ?Sized>(&mut self, category: CategoryFilter, surface: &mut S) {
		let next = ViewState {
			category,
			..self.view.clone()
		};
		debug!("Category set to {category}");
		self.apply(next, surface);
	}

	/// Select `id` from outside the canvas (e.g. a quick-search entry), or
	/// clear with `None`. Unknown ids are ignored and return `false`.
	pub fn select_node<S: Surface + ?Sized>(&mut self, id: Option<&str>, surface: &mut S) -> bool {
		if id.is_some_and(|id| !self.model.contains(id)) {
			debug!("Ignoring selection of unknown node {id:?}");
			return false;
		}
		let next = ViewState {
			selected: id.map(str::to_string),
			..self.view.clone()
		};
		self.apply(next, surface);
		true
	}

	/// Swap in a new snapshot. A selection whose node is gone returns to idle.
	pub fn replace_snapshot<S: Surface + ?Sized>(&mut self, model: Arc<GraphModel>, surface: &mut S) {
		self.model = model;
		let mut next = self.view.clone();
		if next
			.selected
			.as_deref()
			.is_some_and(|id| !self.model.contains(id))
		{
			debug!("Dropping selection {:?}: node left the snapshot", next.selected);
			next.selected = None;
		}
		self.apply(next, surface);
	}

	/// Lay out again for a new canvas size.
	pub fn resize<S: Surface + ?Sized>(&mut self, canvas: CanvasSize, surface: &mut S) {
		self.canvas = canvas;
		self.apply(self.view.clone(), surface);
	}

	/// Draw the current frame without changing state.
	pub fn redraw<S: Surface + ?Sized>(&self, surface: &mut S) {
		render(&self.frame, surface);
	}

	fn apply<S: Surface + ?Sized>(&mut self, view: ViewState, surface: &mut S) {
		self.view = view;
		self.frame = Frame::build(&self.model, &self.view, self.canvas);
		self.redraw(surface);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::surface::DisplayList;
	use crate::components::knowledge_graph::types::{Edge, EdgeKind, NodeRecord};

	const CANVAS: CanvasSize = CanvasSize::new(800.0, 600.0);

	fn records() -> Vec<NodeRecord> {
		vec![
			NodeRecord::new("1", "Transformer", NodeKind::Concept, 50.0),
			NodeRecord::new("3", "Vaswani et al.", NodeKind::Author, 40.0),
			NodeRecord::new("9", "LeCun", NodeKind::Author, 44.0),
			NodeRecord::new("10", "Hinton", NodeKind::Author, 46.0),
		]
	}

	fn controller() -> GraphController {
		let model = GraphModel::new(
			records(),
			vec![
				Edge {
					from: "3".into(),
					to: "1".into(),
					weight: 0.8,
					kind: EdgeKind::Citation,
				},
				Edge {
					from: "9".into(),
					to: "10".into(),
					weight: 0.5,
					kind: EdgeKind::Collaboration,
				},
			],
		)
		.unwrap();
		GraphController::new(Arc::new(model), CANVAS)
	}

	fn center_of(ctrl: &GraphController, id: &str) -> (f64, f64) {
		let p = ctrl.frame().node(id).unwrap().center;
		(p.x, p.y)
	}

	#[test]
	fn click_selects_and_empty_click_clears() {
		let mut ctrl = controller();
		let mut list = DisplayList::new();
		let (x, y) = center_of(&ctrl, "9");

		assert_eq!(ctrl.handle_pointer_event(x, y, &mut list).selected.as_deref(), Some("9"));
		assert!(ctrl.frame().node("9").unwrap().selected);

		let (x, y) = center_of(&ctrl, "3");
		ctrl.handle_pointer_event(x, y, &mut list);
		assert_eq!(ctrl.selected_node_id(), Some("3"));

		assert!(ctrl.handle_pointer_event(5.0, 5.0, &mut list).is_idle());
		assert!(ctrl.handle_pointer_event(-50.0, 9000.0, &mut list).is_idle());
	}

	#[test]
	fn every_change_redraws_a_fresh_frame() {
		let mut ctrl = controller();
		let mut list = DisplayList::new();
		ctrl.set_search_term("HIN", &mut list);
		assert_eq!(list.texts().collect::<Vec<_>>(), vec!["Hinton"]);
		assert_eq!(list.lines().count(), 0);

		ctrl.set_search_term("", &mut list);
		ctrl.set_category(NodeKind::Author.into(), &mut list);
		assert_eq!(
			list.texts().collect::<Vec<_>>(),
			vec!["Vaswani et al.", "LeCun", "Hinton"]
		);
		assert_eq!(list.lines().count(), 1);
	}

	#[test]
	fn filtering_relays_out_visible_nodes() {
		let mut ctrl = controller();
		let mut list = DisplayList::new();
		ctrl.set_category(NodeKind::Author.into(), &mut list);
		// The first visible node takes the center slot.
		assert_eq!(ctrl.frame().nodes[0].id, "3");
		assert_eq!(ctrl.frame().nodes[0].center, CANVAS.center());
		let ids: Vec<_> = ctrl.filtered_nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["3", "9", "10"]);
	}

	#[test]
	fn filtered_out_selection_is_kept_but_not_drawn() {
		let mut ctrl = controller();
		let mut list = DisplayList::new();
		assert!(ctrl.select_node(Some("1"), &mut list));
		ctrl.set_category(NodeKind::Author.into(), &mut list);
		assert_eq!(ctrl.selected_node_id(), Some("1"));
		assert!(ctrl.frame().node("1").is_none());
		assert_eq!(ctrl.selected_details().unwrap().label, "Transformer");
	}

	#[test]
	fn unknown_external_selection_is_ignored() {
		let mut ctrl = controller();
		let mut list = DisplayList::new();
		ctrl.select_node(Some("9"), &mut list);
		assert!(!ctrl.select_node(Some("404"), &mut list));
		assert_eq!(ctrl.selected_node_id(), Some("9"));
		assert!(ctrl.select_node(None, &mut list));
		assert!(ctrl.view_state().is_idle());
	}

	#[test]
	fn refresh_drops_vanished_selection() {
		let mut ctrl = controller();
		let mut list = DisplayList::new();
		ctrl.select_node(Some("10"), &mut list);

		let kept = GraphModel::new(records(), vec![]).unwrap();
		ctrl.replace_snapshot(Arc::new(kept), &mut list);
		assert_eq!(ctrl.selected_node_id(), Some("10"));

		let shrunk = GraphModel::new(records()[..2].to_vec(), vec![]).unwrap();
		ctrl.replace_snapshot(Arc::new(shrunk), &mut list);
		assert!(ctrl.view_state().is_idle());
		assert_eq!(list.filled_circles().count(), 2);
	}

	#[test]
	fn details_list_neighbors() {
		let mut ctrl = controller();
		let mut list = DisplayList::new();
		ctrl.select_node(Some("1"), &mut list);
		let details = ctrl.selected_details().unwrap();
		assert_eq!(details.kind, NodeKind::Concept);
		assert_eq!(details.degree, 1);
		assert_eq!(details.related, vec![("3".to_string(), "Vaswani et al.".to_string())]);
	}

	#[test]
	fn resize_recenters_layout() {
		let mut ctrl = controller();
		let mut list = DisplayList::new();
		ctrl.resize(CanvasSize::new(200.0, 100.0), &mut list);
		assert_eq!(ctrl.frame().nodes[0].center.x, 100.0);
		assert_eq!(ctrl.canvas(), CanvasSize::new(200.0, 100.0));
	}

	#[test]
	fn resumed_view_is_validated() {
		let model = Arc::new(GraphModel::new(records(), vec![]).unwrap());
		let view = ViewState {
			search_term: "le".into(),
			category: CategoryFilter::All,
			selected: Some("gone".into()),
		};
		let ctrl = GraphController::with_view(model, view, CANVAS);
		assert!(ctrl.view_state().is_idle());
		assert_eq!(ctrl.frame().nodes.len(), 1);
		assert_eq!(ctrl.frame().nodes[0].label, "LeCun");
	}

	#[test]
	fn transition_is_pure() {
		let ctrl = controller();
		let before = ctrl.view_state().clone();
		let (x, y) = center_of(&ctrl, "1");
		let after = transition(&before, ctrl.frame(), x, y);
		assert_eq!(after.selected.as_deref(), Some("1"));
		assert_eq!(ctrl.view_state(), &before);
		assert_eq!(transition(&before, ctrl.frame(), x, y), after);
	}
}
