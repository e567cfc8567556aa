//! Curved edge geometry, clipped to the node circles.

use super::builder::GraphModel;
use super::config::EdgeStyle;
use super::types::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrowhead {
	pub tip: Point,
	pub left: Point,
	pub right: Point,
}

/// A quadratic curve from the source boundary to just short of the target boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeRoute {
	pub start: Point,
	pub control: Point,
	pub end: Point,
	pub arrow: Arrowhead,
}

impl EdgeRoute {
	/// SVG path data for the curve.
	pub fn svg_path(&self) -> String {
		format!(
			"M{:.1},{:.1} Q{:.1},{:.1} {:.1},{:.1}",
			self.start.x, self.start.y, self.control.x, self.control.y, self.end.x, self.end.y
		)
	}
}

pub fn route_edge(
	source: Point,
	source_radius: f64,
	target: Point,
	target_radius: f64,
	style: &EdgeStyle,
) -> EdgeRoute {
	let angle = (target.y - source.y).atan2(target.x - source.x);
	let (cos, sin) = (angle.cos(), angle.sin());

	let start = Point::new(source.x + cos * source_radius, source.y + sin * source_radius);
	let inset = target_radius + style.arrow_margin;
	let end = Point::new(target.x - cos * inset, target.y - sin * inset);
	let control = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0 - style.arc_offset);

	EdgeRoute {
		start,
		control,
		end,
		arrow: arrowhead(control, end, style),
	}
}

/// Arrow continuing the curve's end tangent across the margin up to the target boundary.
fn arrowhead(control: Point, end: Point, style: &EdgeStyle) -> Arrowhead {
	let (dx, dy) = (end.x - control.x, end.y - control.y);
	let len = dx.hypot(dy);
	let (ux, uy) = if len < 1e-9 { (1.0, 0.0) } else { (dx / len, dy / len) };

	let tip = Point::new(end.x + ux * style.arrow_margin, end.y + uy * style.arrow_margin);
	let back = Point::new(tip.x - ux * style.arrow_size, tip.y - uy * style.arrow_size);
	let (px, py) = (-uy * style.arrow_size * 0.5, ux * style.arrow_size * 0.5);
	Arrowhead {
		tip,
		left: Point::new(back.x + px, back.y + py),
		right: Point::new(back.x - px, back.y - py),
	}
}

/// Holds one route per model edge, recomputed from current node positions.
#[derive(Clone, Debug, Default)]
pub struct EdgeRouter {
	style: EdgeStyle,
	routes: Vec<EdgeRoute>,
}

impl EdgeRouter {
	pub fn new(style: EdgeStyle) -> Self {
		Self {
			style,
			routes: Vec::new(),
		}
	}

	pub fn update(&mut self, model: &GraphModel) {
		self.routes.clear();
		self.routes.extend(model.edges.iter().map(|edge| {
			let (source, target) = (&model.nodes[edge.source], &model.nodes[edge.target]);
			route_edge(source.position, source.radius, target.position, target.radius, &self.style)
		}));
	}

	pub fn routes(&self) -> &[EdgeRoute] {
		&self.routes
	}

	pub fn style(&self) -> &EdgeStyle {
		&self.style
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: Point, b: Point) -> bool {
		a.distance(b) < 1e-9
	}

	#[test]
	fn endpoints_sit_on_circle_boundaries() {
		let style = EdgeStyle::default();
		let route = route_edge(Point::new(0.0, 0.0), 10.0, Point::new(100.0, 0.0), 20.0, &style);

		assert!(close(route.start, Point::new(10.0, 0.0)));
		assert!(close(route.end, Point::new(100.0 - 20.0 - style.arrow_margin, 0.0)));
		assert!(close(route.control, Point::new((10.0 + route.end.x) / 2.0, -style.arc_offset)));
	}

	#[test]
	fn clipping_follows_the_center_angle() {
		let style = EdgeStyle::default();
		let source = Point::new(50.0, 50.0);
		let target = Point::new(80.0, 90.0);
		let route = route_edge(source, 5.0, target, 7.0, &style);

		assert!((route.start.distance(source) - 5.0).abs() < 1e-9);
		assert!((route.end.distance(target) - (7.0 + style.arrow_margin)).abs() < 1e-9);
	}

	#[test]
	fn arrow_is_arrow_size_long_and_ends_past_the_curve() {
		let style = EdgeStyle::default();
		let route = route_edge(Point::new(0.0, 0.0), 10.0, Point::new(200.0, 0.0), 10.0, &style);
		let back = Point::new(
			(route.arrow.left.x + route.arrow.right.x) / 2.0,
			(route.arrow.left.y + route.arrow.right.y) / 2.0,
		);
		assert!((route.arrow.tip.distance(back) - style.arrow_size).abs() < 1e-9);
		assert!((route.arrow.tip.distance(route.end) - style.arrow_margin).abs() < 1e-9);
	}

	#[test]
	fn coincident_centres_stay_finite() {
		let style = EdgeStyle::default();
		let p = Point::new(3.0, 4.0);
		let route = route_edge(p, 10.0, p, 10.0, &style);
		for point in [route.start, route.control, route.end, route.arrow.tip, route.arrow.left] {
			assert!(point.x.is_finite() && point.y.is_finite());
		}
	}

	#[test]
	fn svg_path_is_a_single_quadratic() {
		let style = EdgeStyle::default();
		let route = route_edge(Point::new(0.0, 0.0), 0.0, Point::new(100.0, 0.0), 0.0, &style);
		assert_eq!(route.svg_path(), "M0.0,0.0 Q47.0,-20.0 94.0,0.0");
	}
}
