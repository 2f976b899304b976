//! Deterministic ring layout.
//!
//! The first node sits at the canvas center; the rest fill concentric rings
//! outward. Ring `k` has radius `k * spacing` and holds at most `floor(2πk)`
//! nodes, which keeps neighbouring centers at least `spacing` apart on every
//! ring. The last ring spreads only the nodes that remain.
//!
//! `spacing` is [`RING_SPACING`] unless the rings needed for the visible set
//! would leave the canvas, in which case it shrinks so the outermost ring and
//! its circles fit inside `min(width, height) / 2`.

use std::f64::consts::PI;

use super::render::MAX_NODE_RADIUS;

/// Largest distance between rings. Also the minimum distance between any two
/// centers when the canvas has room for it.
pub const RING_SPACING: f64 = 2.0 * MAX_NODE_RADIUS + 12.0;

/// A position on the canvas, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Pixels from the left edge.
	pub x: f64,
	/// Pixels from the top edge.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}
}

/// Drawing area in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
	/// Horizontal extent.
	pub width: f64,
	/// Vertical extent.
	pub height: f64,
}

impl CanvasSize {
	/// Canvas of `width` by `height` pixels.
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Midpoint of the canvas.
	pub fn center(self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}

	/// Whether `p` lies on the canvas, edges included.
	pub fn contains(self, p: Point) -> bool {
		(0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
	}

	fn inner_radius(self) -> f64 {
		let half = self.width.min(self.height) / 2.0;
		if half.is_finite() { half.max(0.0) } else { 0.0 }
	}
}

impl Default for CanvasSize {
	fn default() -> Self {
		Self::new(800.0, 600.0)
	}
}

fn ring_capacity(ring: usize) -> usize {
	(2.0 * PI * ring as f64).floor() as usize
}

/// Rings needed around the center node to hold `total` nodes.
fn rings_needed(total: usize) -> usize {
	let (mut ring, mut placed) = (0, 1);
	while placed < total {
		ring += 1;
		placed += ring_capacity(ring);
	}
	ring
}

/// Distance between rings for `total` nodes on `canvas`.
pub fn ring_spacing(total: usize, canvas: CanvasSize) -> f64 {
	let rings = rings_needed(total);
	if rings == 0 {
		return RING_SPACING;
	}
	// Half a ring of slack keeps the outermost circles on the canvas.
	RING_SPACING.min(canvas.inner_radius() / (rings as f64 + 0.5))
}

/// Largest radius a node may be drawn with for `total` nodes on `canvas`.
///
/// Scales with [`ring_spacing`] so circles never overlap and the outermost
/// ones stay inside the canvas.
pub fn max_node_radius(total: usize, canvas: CanvasSize) -> f64 {
	ring_spacing(total, canvas) * MAX_NODE_RADIUS / RING_SPACING
}

/// Position of the `index`-th of `total` visible nodes.
pub fn position_for(index: usize, total: usize, canvas: CanvasSize) -> Point {
	let center = canvas.center();
	if index == 0 {
		return center;
	}

	let total = total.max(index + 1);
	let (mut ring, mut slot, mut placed) = (1, index - 1, 1);
	while slot >= ring_capacity(ring) {
		slot -= ring_capacity(ring);
		placed += ring_capacity(ring);
		ring += 1;
	}

	let on_ring = ring_capacity(ring).min(total - placed);
	let angle = -PI / 2.0 + 2.0 * PI * slot as f64 / on_ring as f64;
	let radius = ring as f64 * ring_spacing(total, canvas);
	Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// Positions for `total` nodes, parallel to their order in the visible set.
pub fn layout(total: usize, canvas: CanvasSize) -> Vec<Point> {
	(0..total).map(|i| position_for(i, total, canvas)).collect()
}
