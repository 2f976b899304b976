//! Node and edge records for a knowledge-graph snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a node, unique within one snapshot.
pub type NodeId = String;

/// Category of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// A research concept, e.g. "Transformer".
	Concept,
	/// A person or group of authors.
	Author,
	/// A single publication.
	Paper,
	/// A technique or model architecture.
	Method,
	/// A benchmark or corpus.
	Dataset,
}

impl NodeKind {
	/// Every kind, in legend order.
	pub const ALL: [NodeKind; 5] = [
		NodeKind::Concept,
		NodeKind::Author,
		NodeKind::Paper,
		NodeKind::Method,
		NodeKind::Dataset,
	];

	/// Lowercase name used in snapshots and the category selector.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Concept => "concept",
			NodeKind::Author => "author",
			NodeKind::Paper => "paper",
			NodeKind::Method => "method",
			NodeKind::Dataset => "dataset",
		}
	}

	/// Plural heading shown in the legend and category selector.
	pub fn display_name(self) -> &'static str {
		match self {
			NodeKind::Concept => "Concepts",
			NodeKind::Author => "Authors",
			NodeKind::Paper => "Papers",
			NodeKind::Method => "Methods",
			NodeKind::Dataset => "Datasets",
		}
	}

	/// Fill color used when a node does not override it.
	pub fn default_color(self) -> &'static str {
		match self {
			NodeKind::Concept => "#8884d8",
			NodeKind::Author => "#82ca9d",
			NodeKind::Paper => "#a4de6c",
			NodeKind::Method => "#ff7c7c",
			NodeKind::Dataset => "#ffc658",
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when a string names no [`NodeKind`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown node kind `{0}`")]
pub struct UnknownKind(pub String);

impl FromStr for NodeKind {
	type Err = UnknownKind;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		NodeKind::ALL
			.into_iter()
			.find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| UnknownKind(s.to_string()))
	}
}

/// Relationship carried by an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
	/// One work cites another.
	Citation,
	/// Co-authorship.
	Collaboration,
	/// Shared or derived ideas.
	Conceptual,
	/// One builds on the other's method.
	Methodological,
}

/// A validated node. Only [`GraphModel`](super::model::GraphModel) builds these.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Unique within the snapshot.
	pub id: NodeId,
	/// Display text; also what search matches against.
	pub label: String,
	/// Category used for filtering and the default fill.
	pub kind: NodeKind,
	/// Relative importance, always positive. Drives the drawn radius.
	pub size: f64,
	/// CSS fill color.
	pub color: String,
	/// Number of edges touching this node.
	pub degree: usize,
}

/// An edge between two nodes of the same snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
	/// Source node id.
	pub from: NodeId,
	/// Target node id.
	pub to: NodeId,
	/// Relationship strength in `[0, 1]`.
	pub weight: f64,
	/// Relationship type; selects the dash pattern.
	pub kind: EdgeKind,
}

impl Edge {
	/// Whether either endpoint is `id`.
	pub fn touches(&self, id: &str) -> bool {
		self.from == id || self.to == id
	}

	/// The endpoint opposite `id`, if the edge touches it.
	pub fn other_end(&self, id: &str) -> Option<&str> {
		if self.from == id {
			Some(&self.to)
		} else if self.to == id {
			Some(&self.from)
		} else {
			None
		}
	}
}

/// Node as it appears in snapshot input, before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
	/// Node id.
	pub id: NodeId,
	/// Display text.
	pub label: String,
	/// Node category.
	pub kind: NodeKind,
	/// Must be positive and finite.
	pub size: f64,
	/// Fill override; the kind's default color when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	/// Checked against the edge list when present.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub degree: Option<usize>,
}

impl NodeRecord {
	/// Record with the kind's default color and a derived degree.
	pub fn new(id: impl Into<NodeId>, label: impl Into<String>, kind: NodeKind, size: f64) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			kind,
			size,
			color: None,
			degree: None,
		}
	}
}

/// Raw `{nodes, edges}` input of one snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
	/// Every node of the snapshot.
	pub nodes: Vec<NodeRecord>,
	/// Edges between those nodes; may be omitted.
	#[serde(default)]
	pub edges: Vec<Edge>,
}
