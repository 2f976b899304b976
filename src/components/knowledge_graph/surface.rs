//! Drawing surfaces the renderer can target.
//!
//! The browser canvas is one; [`DisplayList`] records commands in memory so a
//! frame can be inspected without a DOM.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::layout::{CanvasSize, Point};

/// Line appearance.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
	/// CSS color without alpha.
	pub color: String,
	/// Line width in pixels.
	pub width: f64,
	/// 0.0 (invisible) to 1.0 (opaque).
	pub opacity: f64,
	/// Canvas dash pattern; empty for a solid line.
	pub dash: Vec<f64>,
}

impl Stroke {
	/// Opaque, undashed stroke.
	pub fn solid(color: impl Into<String>, width: f64) -> Self {
		Self {
			color: color.into(),
			width,
			opacity: 1.0,
			dash: Vec::new(),
		}
	}
}

/// Label appearance. Text is centered on its anchor point.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
	/// CSS fill color.
	pub color: String,
	/// CSS font shorthand.
	pub font: String,
}

/// Minimal 2D drawing API needed by [`render`](super::render::render).
pub trait Surface {
	/// Erase everything inside `canvas`.
	fn clear(&mut self, canvas: CanvasSize);
	/// Straight segment from `from` to `to`.
	fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke);
	/// Solid disc.
	fn fill_circle(&mut self, center: Point, radius: f64, fill: &str);
	/// Circle outline.
	fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &Stroke);
	/// Text centered on `at`.
	fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle);
}

impl Surface for CanvasRenderingContext2d {
	fn clear(&mut self, canvas: CanvasSize) {
		self.clear_rect(0.0, 0.0, canvas.width, canvas.height);
	}

	fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke) {
		apply_stroke(self, stroke);
		self.begin_path();
		self.move_to(from.x, from.y);
		self.line_to(to.x, to.y);
		self.stroke();
		reset_stroke(self);
	}

	fn fill_circle(&mut self, center: Point, radius: f64, fill: &str) {
		self.begin_path();
		let _ = self.arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU);
		self.set_fill_style_str(fill);
		self.fill();
	}

	fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &Stroke) {
		apply_stroke(self, stroke);
		self.begin_path();
		let _ = self.arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU);
		self.stroke();
		reset_stroke(self);
	}

	fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
		self.set_fill_style_str(&style.color);
		self.set_font(&style.font);
		self.set_text_align("center");
		let _ = CanvasRenderingContext2d::fill_text(self, text, at.x, at.y);
	}
}

fn apply_stroke(ctx: &CanvasRenderingContext2d, stroke: &Stroke) {
	ctx.set_global_alpha(stroke.opacity);
	ctx.set_stroke_style_str(&stroke.color);
	ctx.set_line_width(stroke.width);
	let dash: js_sys::Array = stroke.dash.iter().map(|&d| JsValue::from_f64(d)).collect();
	let _ = ctx.set_line_dash(&dash);
}

fn reset_stroke(ctx: &CanvasRenderingContext2d) {
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_global_alpha(1.0);
}

/// One recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum DrawCommand {
	/// [`Surface::clear`].
	Clear(CanvasSize),
	/// [`Surface::stroke_line`].
	Line {
		from: Point,
		to: Point,
		stroke: Stroke,
	},
	/// [`Surface::fill_circle`].
	FillCircle {
		center: Point,
		radius: f64,
		fill: String,
	},
	/// [`Surface::stroke_circle`].
	StrokeCircle {
		center: Point,
		radius: f64,
		stroke: Stroke,
	},
	/// [`Surface::fill_text`].
	Text {
		text: String,
		at: Point,
		style: TextStyle,
	},
}

/// Surface that records every call instead of painting pixels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
	/// Every call, oldest first.
	pub commands: Vec<DrawCommand>,
}

impl DisplayList {
	/// Empty recording.
	pub fn new() -> Self {
		Self::default()
	}

	/// Lines drawn since the last clear.
	pub fn lines(&self) -> impl Iterator<Item = (Point, Point, &Stroke)> {
		self.since_clear().iter().filter_map(|cmd| match cmd {
			DrawCommand::Line { from, to, stroke } => Some((*from, *to, stroke)),
			_ => None,
		})
	}

	/// Filled circles drawn since the last clear.
	pub fn filled_circles(&self) -> impl Iterator<Item = (Point, f64, &str)> {
		self.since_clear().iter().filter_map(|cmd| match cmd {
			DrawCommand::FillCircle {
				center,
				radius,
				fill,
			} => Some((*center, *radius, fill.as_str())),
			_ => None,
		})
	}

	/// Text drawn since the last clear.
	pub fn texts(&self) -> impl Iterator<Item = &str> {
		self.since_clear().iter().filter_map(|cmd| match cmd {
			DrawCommand::Text { text, .. } => Some(text.as_str()),
			_ => None,
		})
	}

	/// Commands recorded after the most recent [`DrawCommand::Clear`].
	pub fn since_clear(&self) -> &[DrawCommand] {
		let start = self
			.commands
			.iter()
			.rposition(|cmd| matches!(cmd, DrawCommand::Clear(_)))
			.map_or(0, |i| i + 1);
		&self.commands[start..]
	}
}

impl Surface for DisplayList {
	fn clear(&mut self, canvas: CanvasSize) {
		self.commands.push(DrawCommand::Clear(canvas));
	}

	fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke) {
		self.commands.push(DrawCommand::Line {
			from,
			to,
			stroke: stroke.clone(),
		});
	}

	fn fill_circle(&mut self, center: Point, radius: f64, fill: &str) {
		self.commands.push(DrawCommand::FillCircle {
			center,
			radius,
			fill: fill.to_string(),
		});
	}

	fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &Stroke) {
		self.commands.push(DrawCommand::StrokeCircle {
			center,
			radius,
			stroke: stroke.clone(),
		});
	}

	fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
		self.commands.push(DrawCommand::Text {
			text: text.to_string(),
			at,
			style: style.clone(),
		});
	}
}
