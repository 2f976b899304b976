//! Free-text and category filtering of the visible node set.

use std::fmt;
use std::str::FromStr;

use super::types::{Node, NodeKind, UnknownKind};

/// Category selector value: every kind, or just one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
	/// No kind restriction.
	#[default]
	All,
	/// Only nodes of this kind.
	Kind(NodeKind),
}

impl CategoryFilter {
	/// Whether a node of `kind` passes.
	pub fn matches(self, kind: NodeKind) -> bool {
		match self {
			CategoryFilter::All => true,
			CategoryFilter::Kind(k) => k == kind,
		}
	}

	/// Selector value: `"all"` or the kind's lowercase name.
	pub fn as_str(self) -> &'static str {
		match self {
			CategoryFilter::All => "all",
			CategoryFilter::Kind(kind) => kind.as_str(),
		}
	}
}

impl fmt::Display for CategoryFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<NodeKind> for CategoryFilter {
	fn from(kind: NodeKind) -> Self {
		CategoryFilter::Kind(kind)
	}
}

impl FromStr for CategoryFilter {
	type Err = UnknownKind;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.trim().eq_ignore_ascii_case("all") {
			Ok(CategoryFilter::All)
		} else {
			s.parse().map(CategoryFilter::Kind)
		}
	}
}

/// Whether `node` passes the search term and category.
pub fn matches(node: &Node, search_term: &str, category: CategoryFilter) -> bool {
	category.matches(node.kind)
		&& (search_term.is_empty()
			|| node
				.label
				.to_lowercase()
				.contains(&search_term.to_lowercase()))
}

/// Nodes passing the filter, in input order.
pub fn filter_nodes<'a>(
	nodes: impl IntoIterator<Item = &'a Node>,
	search_term: &str,
	category: CategoryFilter,
) -> Vec<&'a Node> {
	nodes
		.into_iter()
		.filter(|node| matches(node, search_term, category))
		.collect()
}

/// First `limit` matches, for the quick-search list.
pub fn quick_search<'a>(
	nodes: impl IntoIterator<Item = &'a Node>,
	search_term: &str,
	category: CategoryFilter,
	limit: usize,
) -> Vec<&'a Node> {
	nodes
		.into_iter()
		.filter(|node| matches(node, search_term, category))
		.take(limit)
		.collect()
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	fn node(id: &str, label: &str, kind: NodeKind) -> Node {
		Node {
			id: id.into(),
			label: label.into(),
			kind,
			size: 10.0,
			color: kind.default_color().into(),
			degree: 0,
		}
	}

	fn nodes() -> Vec<Node> {
		vec![
			node("1", "Transformer", NodeKind::Concept),
			node("2", "Attention Mechanism", NodeKind::Concept),
			node("3", "Vaswani et al.", NodeKind::Author),
			node("6", "ImageNet", NodeKind::Dataset),
			node("9", "LeCun", NodeKind::Author),
		]
	}

	fn ids<'a>(nodes: &[&'a Node]) -> Vec<&'a str> {
		nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn empty_term_and_all_keeps_everything() {
		let all = nodes();
		assert_eq!(filter_nodes(&all, "", CategoryFilter::All).len(), all.len());
	}

	#[test]
	fn category_narrows_by_kind() {
		let all = nodes();
		let authors = filter_nodes(&all, "", NodeKind::Author.into());
		assert_eq!(ids(&authors), vec!["3", "9"]);
	}

	#[test]
	fn search_is_case_insensitive_substring() {
		let all = nodes();
		assert_eq!(ids(&filter_nodes(&all, "TRANS", CategoryFilter::All)), vec!["1"]);
		assert_eq!(ids(&filter_nodes(&all, "ne", CategoryFilter::All)), vec!["1", "6"]);
		assert!(filter_nodes(&all, "zzz", CategoryFilter::All).is_empty());
	}

	#[test]
	fn both_conditions_apply() {
		let all = nodes();
		let hits = filter_nodes(&all, "e", NodeKind::Author.into());
		assert_eq!(ids(&hits), vec!["3", "9"]);
		assert!(filter_nodes(&all, "image", NodeKind::Concept.into()).is_empty());
	}

	#[test]
	fn quick_search_truncates() {
		let all = nodes();
		assert_eq!(ids(&quick_search(&all, "", CategoryFilter::All, 2)), vec!["1", "2"]);
	}

	#[test]
	fn category_parses_from_selector_values() {
		assert_eq!("all".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
		assert_eq!(
			"method".parse::<CategoryFilter>(),
			Ok(CategoryFilter::Kind(NodeKind::Method))
		);
		assert!("people".parse::<CategoryFilter>().is_err());
		assert_eq!(CategoryFilter::Kind(NodeKind::Paper).to_string(), "paper");
	}

	proptest! {
		#[test]
		fn filtering_is_idempotent(term in "[a-zA-Z ]{0,4}", pick in 0usize..6) {
			let all = nodes();
			let category = if pick == 5 { CategoryFilter::All } else { NodeKind::ALL[pick].into() };
			let once = filter_nodes(&all, &term, category);
			let twice = filter_nodes(once.iter().copied(), &term, category);
			prop_assert_eq!(ids(&once), ids(&twice));
		}
	}
}
