use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::filter::CategoryFilter;
use super::layout::CanvasSize;
use super::model::GraphModel;
use super::state::{GraphController, ViewState};
use super::types::NodeId;

struct CanvasSession {
	controller: GraphController,
	ctx: CanvasRenderingContext2d,
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

/// Removal callback for a listener registered outside the component tree.
#[derive(Clone, Default)]
struct ListenerSlot(Arc<Mutex<Option<Box<dyn FnOnce() + Send + Sync>>>>);

impl ListenerSlot {
	/// Store `remove`, detaching any listener already held.
	fn attach(&self, remove: impl FnOnce() + Send + Sync + 'static) {
		self.detach();
		if let Ok(mut slot) = self.0.lock() {
			*slot = Some(Box::new(remove));
		}
	}

	/// Run the stored removal callback, at most once.
	fn detach(&self) {
		let remove = self.0.lock().ok().and_then(|mut slot| slot.take());
		if let Some(remove) = remove {
			remove();
		}
	}
}

/// New value for the `selected` signal when the controller dropped the
/// requested id, or `None` when the two already agree.
fn selection_to_publish(
	controller: &GraphController,
	requested: Option<&str>,
) -> Option<Option<NodeId>> {
	let current = controller.selected_node_id();
	(current != requested).then(|| current.map(str::to_string))
}

fn window_size(window: &Window) -> Option<CanvasSize> {
	Some(CanvasSize::new(
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Canvas view of a knowledge graph.
///
/// Search term and category come from the caller; clicks write the selected
/// node id back to `selected`, and external writes to `selected` are drawn.
#[component]
pub fn KnowledgeGraphCanvas(
	#[prop(into)] model: Signal<Arc<GraphModel>>,
	#[prop(into)] search_term: Signal<String>,
	#[prop(into)] category: Signal<CategoryFilter>,
	selected: RwSignal<Option<NodeId>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let session: Rc<RefCell<Option<CanvasSession>>> = Rc::new(RefCell::new(None));
	let resize_listener = ListenerSlot::default();
	let (session_init, resize_listener_init) = (session.clone(), resize_listener.clone());
	on_cleanup(move || resize_listener.detach());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let model = model.get();
		let canvas: HtmlCanvasElement = canvas.into();

		if let Some(ref mut s) = *session_init.borrow_mut() {
			s.controller.replace_snapshot(model, &mut s.ctx);
			if let Some(next) =
				selection_to_publish(&s.controller, selected.get_untracked().as_deref())
			{
				selected.set(next);
			}
			return;
		}

		let Some(window) = web_sys::window() else {
			warn!("No window; knowledge graph canvas not mounted");
			return;
		};
		let size = if fullscreen {
			window_size(&window).unwrap_or_default()
		} else {
			let parent = canvas.parent_element();
			CanvasSize::new(
				width.unwrap_or_else(|| parent.as_ref().map_or(800.0, |p| p.client_width() as f64)),
				height.unwrap_or_else(|| parent.as_ref().map_or(600.0, |p| p.client_height() as f64)),
			)
		};
		canvas.set_width(size.width as u32);
		canvas.set_height(size.height as u32);

		let Some(mut ctx) = context_2d(&canvas) else {
			warn!("Canvas 2d context unavailable");
			return;
		};
		let requested = selected.get_untracked();
		let view = ViewState {
			search_term: search_term.get_untracked(),
			category: category.get_untracked(),
			selected: requested.clone(),
		};
		let controller = GraphController::with_view(model, view, size);
		controller.redraw(&mut ctx);
		let publish = selection_to_publish(&controller, requested.as_deref());
		*session_init.borrow_mut() = Some(CanvasSession { controller, ctx });
		if let Some(next) = publish {
			selected.set(next);
		}

		if fullscreen {
			let (session_resize, canvas_resize) = (session_init.clone(), canvas.clone());
			let handle = window_event_listener(leptos::ev::resize, move |_| {
				let Some(size) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(size.width as u32);
				canvas_resize.set_height(size.height as u32);
				if let Some(ref mut s) = *session_resize.borrow_mut() {
					s.controller.resize(size, &mut s.ctx);
				}
			});
			resize_listener_init.attach(move || handle.remove());
		}
	});

	let session_search = session.clone();
	Effect::new(move |_| {
		let term = search_term.get();
		if let Some(ref mut s) = *session_search.borrow_mut() {
			if s.controller.view_state().search_term != term {
				s.controller.set_search_term(term, &mut s.ctx);
			}
		}
	});

	let session_category = session.clone();
	Effect::new(move |_| {
		let category = category.get();
		if let Some(ref mut s) = *session_category.borrow_mut() {
			if s.controller.view_state().category != category {
				s.controller.set_category(category, &mut s.ctx);
			}
		}
	});

	let session_select = session.clone();
	Effect::new(move |_| {
		let id = selected.get();
		if let Some(ref mut s) = *session_select.borrow_mut() {
			if s.controller.selected_node_id() != id.as_deref()
				&& !s.controller.select_node(id.as_deref(), &mut s.ctx)
			{
				warn!("Selected node {id:?} is not in the graph");
			}
		}
	});

	let session_click = session.clone();
	let on_click = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		let next = match *session_click.borrow_mut() {
			Some(ref mut s) => s.controller.handle_pointer_event(x, y, &mut s.ctx).selected.clone(),
			None => return,
		};
		selected.set(next);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="knowledge-graph-canvas"
			on:click=on_click
			style="display: block; cursor: pointer;"
		/>
	}
}
