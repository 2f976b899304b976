//! Validated, id-indexed graph snapshot.

use std::collections::HashMap;
use std::fmt;

use log::{info, warn};

use super::types::{Edge, GraphSnapshot, Node, NodeId, NodeRecord};

/// One reason a snapshot was rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphDefect {
	/// Edge at `index` names node ids that are not in the snapshot.
	DanglingEdge {
		/// Position in the edge list.
		index: usize,
		/// Declared source.
		from: NodeId,
		/// Declared target.
		to: NodeId,
		/// Endpoints with no matching node.
		missing: Vec<NodeId>,
	},
	/// Two or more nodes share an id.
	DuplicateNode {
		/// The repeated id.
		id: NodeId,
	},
	/// Edge weight outside `[0, 1]` or not a number.
	WeightOutOfRange {
		/// Position in the edge list.
		index: usize,
		/// The rejected weight.
		weight: f64,
	},
	/// Node size is zero, negative or not finite.
	InvalidSize {
		/// Offending node.
		id: NodeId,
		/// The rejected size.
		size: f64,
	},
	/// Supplied degree disagrees with the edge list.
	DegreeMismatch {
		/// Offending node.
		id: NodeId,
		/// Degree given in the input.
		declared: usize,
		/// Degree counted from edges.
		actual: usize,
	},
}

impl fmt::Display for GraphDefect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GraphDefect::DanglingEdge {
				index,
				from,
				to,
				missing,
			} => write!(
				f,
				"edge #{index} ({from} -> {to}) references unknown node(s) {}",
				missing
					.iter()
					.map(|id| format!("\"{id}\""))
					.collect::<Vec<_>>()
					.join(", ")
			),
			GraphDefect::DuplicateNode { id } => write!(f, "duplicate node id \"{id}\""),
			GraphDefect::WeightOutOfRange { index, weight } => {
				write!(f, "edge #{index} has weight {weight} outside [0, 1]")
			}
			GraphDefect::InvalidSize { id, size } => {
				write!(f, "node \"{id}\" has non-positive size {size}")
			}
			GraphDefect::DegreeMismatch {
				id,
				declared,
				actual,
			} => write!(
				f,
				"node \"{id}\" declares degree {declared} but has {actual} edge(s)"
			),
		}
	}
}

/// A snapshot that cannot be rendered. Lists every defect found.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("malformed graph: {}", .defects.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct MalformedGraphError {
	/// Every defect found, in detection order.
	pub defects: Vec<GraphDefect>,
}

impl MalformedGraphError {
	/// Node ids referenced by edges but absent from the snapshot.
	pub fn missing_ids(&self) -> Vec<&str> {
		self.defects
			.iter()
			.filter_map(|defect| match defect {
				GraphDefect::DanglingEdge { missing, .. } => Some(missing),
				_ => None,
			})
			.flatten()
			.map(String::as_str)
			.collect()
	}
}

/// Failure loading a snapshot from serialized input.
#[derive(Debug, thiserror::Error)]
pub enum GraphLoadError {
	/// Input is not a well-formed snapshot document.
	#[error("invalid snapshot json: {0}")]
	Json(#[from] serde_json::Error),
	/// Document parsed but failed validation.
	#[error(transparent)]
	Malformed(#[from] MalformedGraphError),
}

/// Read-only graph snapshot with O(1) lookup by node id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphModel {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	index: HashMap<NodeId, usize>,
	incident: HashMap<NodeId, Vec<usize>>,
}

impl GraphModel {
	/// Validate and index a snapshot.
	pub fn new(nodes: Vec<NodeRecord>, edges: Vec<Edge>) -> Result<Self, MalformedGraphError> {
		let mut defects = Vec::new();
		let mut index = HashMap::with_capacity(nodes.len());

		for (i, record) in nodes.iter().enumerate() {
			if index.contains_key(&record.id) {
				if !defects
					.iter()
					.any(|d| matches!(d, GraphDefect::DuplicateNode { id } if *id == record.id))
				{
					defects.push(GraphDefect::DuplicateNode {
						id: record.id.clone(),
					});
				}
				continue;
			}
			index.insert(record.id.clone(), i);
			if !(record.size.is_finite() && record.size > 0.0) {
				defects.push(GraphDefect::InvalidSize {
					id: record.id.clone(),
					size: record.size,
				});
			}
		}

		let mut incident: HashMap<NodeId, Vec<usize>> = HashMap::new();
		for (i, edge) in edges.iter().enumerate() {
			if !(0.0..=1.0).contains(&edge.weight) {
				defects.push(GraphDefect::WeightOutOfRange {
					index: i,
					weight: edge.weight,
				});
			}

			let mut missing = Vec::new();
			for end in [&edge.from, &edge.to] {
				if !index.contains_key(end) && !missing.contains(end) {
					missing.push(end.clone());
				}
			}
			if !missing.is_empty() {
				defects.push(GraphDefect::DanglingEdge {
					index: i,
					from: edge.from.clone(),
					to: edge.to.clone(),
					missing,
				});
				continue;
			}

			incident.entry(edge.from.clone()).or_default().push(i);
			if edge.to != edge.from {
				incident.entry(edge.to.clone()).or_default().push(i);
			}
		}

		let mut built = Vec::with_capacity(index.len());
		for (i, record) in nodes.into_iter().enumerate() {
			if index.get(&record.id) != Some(&i) {
				continue;
			}
			let actual = incident.get(&record.id).map_or(0, Vec::len);
			if let Some(declared) = record.degree {
				if declared != actual {
					defects.push(GraphDefect::DegreeMismatch {
						id: record.id.clone(),
						declared,
						actual,
					});
				}
			}
			built.push(Node {
				color: record
					.color
					.unwrap_or_else(|| record.kind.default_color().to_string()),
				id: record.id,
				label: record.label,
				kind: record.kind,
				size: record.size,
				degree: actual,
			});
		}

		if !defects.is_empty() {
			let err = MalformedGraphError { defects };
			warn!("Rejected graph snapshot: {err}");
			return Err(err);
		}

		// Reindex after duplicates were skipped.
		let index = built
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();

		info!(
			"Loaded graph snapshot: {} nodes, {} edges",
			built.len(),
			edges.len()
		);
		Ok(Self {
			nodes: built,
			edges,
			index,
			incident,
		})
	}

	/// Validate and index a deserialized snapshot.
	pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, MalformedGraphError> {
		Self::new(snapshot.nodes, snapshot.edges)
	}

	/// Parse a `{"nodes": [...], "edges": [...]}` document.
	pub fn from_json(json: &str) -> Result<Self, GraphLoadError> {
		let snapshot: GraphSnapshot = serde_json::from_str(json)?;
		Ok(Self::from_snapshot(snapshot)?)
	}

	/// Nodes in snapshot order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges in snapshot order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the snapshot has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Whether a node with `id` exists.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// The node with `id`, or `None` if the snapshot has none.
	pub fn node_by_id(&self, id: &str) -> Option<&Node> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Edges with `id` at either end, in snapshot order.
	pub fn edges_of(&self, id: &str) -> Vec<&Edge> {
		self.incident
			.get(id)
			.map(|edges| edges.iter().map(|&i| &self.edges[i]).collect())
			.unwrap_or_default()
	}

	/// Nodes sharing an edge with `id`, without repeats, in edge order.
	pub fn neighbors_of(&self, id: &str) -> Vec<&Node> {
		let mut seen: Vec<&str> = Vec::new();
		for edge in self.edges_of(id) {
			if let Some(other) = edge.other_end(id) {
				if other != id && !seen.contains(&other) {
					seen.push(other);
				}
			}
		}
		seen.into_iter()
			.filter_map(|other| self.node_by_id(other))
			.collect()
	}
}
