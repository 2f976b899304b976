use std::sync::Arc;

use leptos::prelude::*;
use log::error;

use crate::components::knowledge_graph::{
	CategoryFilter, Edge, EdgeKind, GraphModel, GraphSnapshot, KnowledgeGraphCanvas, NodeDetails,
	NodeId, NodeKind, NodeRecord, quick_search,
};

const QUICK_SEARCH_LIMIT: usize = 5;

/// Research network shown on the home page.
fn sample_snapshot() -> GraphSnapshot {
	let node = |id: &str, label: &str, kind, size| NodeRecord::new(id, label, kind, size);
	let edge = |from: &str, to: &str, weight, kind| Edge {
		from: from.into(),
		to: to.into(),
		weight,
		kind,
	};

	GraphSnapshot {
		nodes: vec![
			node("1", "Transformer", NodeKind::Concept, 50.0),
			node("2", "Attention Mechanism", NodeKind::Concept, 45.0),
			node("3", "Vaswani et al.", NodeKind::Author, 40.0),
			node("4", "BERT", NodeKind::Concept, 42.0),
			node("5", "GPT", NodeKind::Concept, 48.0),
			node("6", "ImageNet", NodeKind::Dataset, 35.0),
			node("7", "ResNet", NodeKind::Method, 38.0),
			node("8", "Diffusion Models", NodeKind::Concept, 36.0),
			node("9", "LeCun", NodeKind::Author, 44.0),
			node("10", "Hinton", NodeKind::Author, 46.0),
			node("11", "Attention Is All You Need", NodeKind::Paper, 47.0),
		],
		edges: vec![
			edge("1", "2", 0.9, EdgeKind::Conceptual),
			edge("3", "1", 0.8, EdgeKind::Citation),
			edge("4", "1", 0.7, EdgeKind::Methodological),
			edge("5", "1", 0.75, EdgeKind::Methodological),
			edge("6", "7", 0.6, EdgeKind::Methodological),
			edge("9", "10", 0.5, EdgeKind::Collaboration),
			edge("3", "11", 0.95, EdgeKind::Collaboration),
			edge("11", "1", 0.85, EdgeKind::Conceptual),
		],
	}
}

#[component]
fn NodeDetailsPanel(
	#[prop(into)] model: Signal<Arc<GraphModel>>,
	selected: RwSignal<Option<NodeId>>,
) -> impl IntoView {
	let details = move || {
		selected
			.get()
			.and_then(|id| NodeDetails::for_node(&model.get(), &id))
	};

	view! {
		<section class="graph-panel node-details">
			<h2>"Node Details"</h2>
			{move || match details() {
				Some(d) => view! {
					<div>
						<p class="node-label">{d.label}</p>
						<p>"Type: " {d.kind.as_str()}</p>
						<p>"Connections: " {d.degree}</p>
						<h3>"Related"</h3>
						<ul>
							{d.related
								.into_iter()
								.map(|(id, label)| {
									view! {
										<li>
											<button on:click=move |_| selected.set(Some(id.clone()))>
												{label}
											</button>
										</li>
									}
								})
								.collect_view()}
						</ul>
					</div>
				}
					.into_any(),
				None => view! { <p class="muted">"Click on a node to see details"</p> }.into_any(),
			}}
		</section>
	}
}

#[component]
fn QuickSearch(
	#[prop(into)] model: Signal<Arc<GraphModel>>,
	#[prop(into)] search_term: Signal<String>,
	#[prop(into)] category: Signal<CategoryFilter>,
	selected: RwSignal<Option<NodeId>>,
) -> impl IntoView {
	let hits = move || {
		let model = model.get();
		quick_search(
			model.nodes(),
			&search_term.get(),
			category.get(),
			QUICK_SEARCH_LIMIT,
		)
		.into_iter()
		.map(|n| (n.id.clone(), n.label.clone(), n.kind))
		.collect::<Vec<_>>()
	};

	view! {
		<section class="graph-panel quick-search">
			<h2>"Quick Search"</h2>
			<ul>
				{move || {
					hits()
						.into_iter()
						.map(|(id, label, kind)| {
							view! {
								<li class=format!("kind-{kind}")>
									<button on:click=move |_| selected.set(Some(id.clone()))>
										{label}
									</button>
								</li>
							}
						})
						.collect_view()
				}}
			</ul>
		</section>
	}
}

#[component]
fn Legend() -> impl IntoView {
	view! {
		<ul class="graph-legend">
			{NodeKind::ALL
				.into_iter()
				.map(|kind| {
					view! {
						<li>
							<span
								class="swatch"
								style=format!("background: {};", kind.default_color())
							></span>
							{kind.display_name()}
						</li>
					}
				})
				.collect_view()}
		</ul>
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let model = match GraphModel::from_snapshot(sample_snapshot()) {
		Ok(model) => Arc::new(model),
		Err(err) => {
			error!("{err}");
			return view! {
				<h1>"Uh oh! Something went wrong!"</h1>
				<p>{err.to_string()}</p>
			}
			.into_any();
		}
	};
	let model = Signal::stored(model);
	let search_term = RwSignal::new(String::new());
	let category = RwSignal::new(CategoryFilter::All);
	let selected = RwSignal::new(None::<NodeId>);

	view! {
		<div class="knowledge-graph-page">
			<header>
				<h1>"Knowledge Graph"</h1>
				<p class="subtitle">"Interactive visualization of research connections"</p>
			</header>

			<div class="graph-controls">
				<input
					type="search"
					placeholder="Search concepts, authors, or papers..."
					prop:value=move || search_term.get()
					on:input=move |ev| search_term.set(event_target_value(&ev))
				/>
				<select on:change=move |ev| {
					match event_target_value(&ev).parse() {
						Ok(c) => category.set(c),
						Err(err) => error!("{err}"),
					}
				}>
					<option value="all">"All Types"</option>
					{NodeKind::ALL
						.into_iter()
						.map(|kind| view! { <option value=kind.as_str()>{kind.display_name()}</option> })
						.collect_view()}
				</select>
			</div>

			<div class="graph-layout">
				<div class="graph-canvas">
					<KnowledgeGraphCanvas
						model=model
						search_term=search_term
						category=category
						selected=selected
						height=Some(384.0)
					/>
					<Legend />
				</div>
				<aside>
					<NodeDetailsPanel model=model selected=selected />
					<QuickSearch
						model=model
						search_term=search_term
						category=category
						selected=selected
					/>
				</aside>
			</div>
		</div>
	}
	.into_any()
}
