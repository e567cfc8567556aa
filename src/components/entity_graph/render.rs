use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scene::{BACKGROUND, DrawCommand, Scene};

/// Replay a scene onto a 2D canvas context.
pub fn render(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	for command in &scene.commands {
		match command {
			DrawCommand::Clear { width, height, color } => {
				ctx.set_fill_style_str(color);
				ctx.fill_rect(0.0, 0.0, *width, *height);
			}
			DrawCommand::PushTransform(t) => {
				ctx.save();
				let _ = ctx.translate(t.x, t.y);
				let _ = ctx.scale(t.k, t.k);
			}
			DrawCommand::PopTransform => ctx.restore(),
			DrawCommand::Edge {
				route,
				color,
				alpha,
				width,
				dashed,
			} => {
				ctx.set_global_alpha(*alpha);
				ctx.set_stroke_style_str(color);
				ctx.set_line_width(*width);
				if *dashed {
					let _ = ctx.set_line_dash(&js_sys::Array::of2(
						&JsValue::from_f64(*width * 4.0),
						&JsValue::from_f64(*width * 3.0),
					));
				}
				ctx.begin_path();
				ctx.move_to(route.start.x, route.start.y);
				ctx.quadratic_curve_to(route.control.x, route.control.y, route.end.x, route.end.y);
				ctx.stroke();
				let _ = ctx.set_line_dash(&js_sys::Array::new());

				ctx.set_fill_style_str(color);
				ctx.begin_path();
				ctx.move_to(route.arrow.tip.x, route.arrow.tip.y);
				ctx.line_to(route.arrow.left.x, route.arrow.left.y);
				ctx.line_to(route.arrow.right.x, route.arrow.right.y);
				ctx.close_path();
				ctx.fill();
				ctx.set_global_alpha(1.0);
			}
			DrawCommand::Node {
				center,
				radius,
				color,
				alpha,
				ring,
			} => {
				ctx.set_global_alpha(*alpha);
				ctx.begin_path();
				let _ = ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(color);
				ctx.fill();
				ctx.set_global_alpha(1.0);

				if let Some(ring) = ring {
					ctx.begin_path();
					let _ = ctx.arc(center.x, center.y, ring.radius, 0.0, 2.0 * PI);
					ctx.set_stroke_style_str(ring.color);
					ctx.set_line_width(ring.width);
					ctx.stroke();
				}
			}
			DrawCommand::Label {
				text,
				at,
				font_px,
				alpha,
			} => {
				ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha));
				ctx.set_font(&format!("{}px sans-serif", font_px));
				let _ = ctx.fill_text(text, at.x, at.y);
			}
			DrawCommand::EmptyState { message, at } => {
				ctx.set_fill_style_str(BACKGROUND);
				ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
				ctx.set_fill_style_str("rgba(255, 255, 255, 0.6)");
				ctx.set_font("14px sans-serif");
				ctx.set_text_align("center");
				let _ = ctx.fill_text(message, at.x, at.y);
				ctx.set_text_align("start");
			}
		}
	}
}
