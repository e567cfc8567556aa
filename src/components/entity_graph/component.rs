use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::config::GraphConfig;
use super::controls::{ControlCommand, GraphControls, GraphLegend};
use super::engine::GraphEngine;
use super::render;
use super::scene::EMPTY_MESSAGE;
use super::types::{DashboardSnapshot, SelectionEvent};

/// Browser callbacks owned by one mounted canvas. Dropping them is only safe once the
/// pending frame is cancelled and the resize listener is removed.
#[derive(Default)]
struct FrameLoop {
	animate: Option<Closure<dyn FnMut()>>,
	resize: Option<Closure<dyn FnMut()>>,
	pending: Option<i32>,
}

/// One animation frame: advance the engine and paint it. Returns false once the canvas is
/// gone or the engine has been disposed.
fn frame_step(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	engine: StoredValue<GraphEngine, LocalStorage>,
) -> bool {
	let Some(canvas) = canvas_ref.try_get_untracked().flatten() else {
		return false;
	};
	let canvas: HtmlCanvasElement = canvas.into();
	if !canvas.is_connected() {
		return false;
	}
	let Some(ctx) = context_2d(&canvas) else {
		return true;
	};
	engine
		.try_update_value(|engine| {
			engine.tick(0.016);
			render::render(&engine.scene(), &ctx);
		})
		.is_some()
}

/// Container size, falling back to 800x600 when the canvas is not laid out yet.
fn surface_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Canvas view of a dashboard snapshot with legend and zoom controls.
#[component]
pub fn EntityGraphCanvas(
	/// Entities to draw; every change rebuilds the graph.
	#[prop(into)]
	snapshot: Signal<DashboardSnapshot>,
	/// Receives every node selection.
	#[prop(optional, into)]
	on_select: Option<Callback<SelectionEvent>>,
	/// Node id to jump to; each change selects that node.
	#[prop(optional, into)]
	focus: Option<Signal<Option<String>>>,
	/// Called with the id when a focus request names a node that is not in the graph.
	#[prop(optional, into)]
	on_missing: Option<Callback<String>>,
	/// Show the type legend.
	#[prop(default = true)]
	show_legend: bool,
	/// Show the zoom, fit and reset buttons.
	#[prop(default = true)]
	show_controls: bool,
	/// Tunables; defaults when absent.
	#[prop(optional)]
	config: Option<GraphConfig>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine = StoredValue::new_local(GraphEngine::new(config.unwrap_or_default()));
	let frames = StoredValue::new_local(FrameLoop::default());

	if let Some(on_select) = on_select {
		engine.update_value(|engine| {
			engine.on_select(move |event: &SelectionEvent| on_select.run(event.clone()))
		});
	}

	let request_frame = move || {
		frames.try_update_value(|state| {
			if state.pending.is_some() {
				return;
			}
			let (Some(cb), Some(window)) = (state.animate.as_ref(), web_sys::window()) else {
				return;
			};
			state.pending = window.request_animation_frame(cb.as_ref().unchecked_ref()).ok();
		});
	};

	// (Re)build the scene whenever the canvas mounts or the snapshot changes.
	Effect::new(move |_| {
		let snapshot = snapshot.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = surface_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		engine.update_value(|engine| {
			engine.render(&snapshot, w, h);
		});

		let Some(window) = web_sys::window() else {
			return;
		};
		frames.update_value(|state| {
			if state.resize.is_none() {
				let on_resize = Closure::<dyn FnMut()>::new(move || {
					let Some(canvas) = canvas_ref.try_get_untracked().flatten() else {
						return;
					};
					let canvas: HtmlCanvasElement = canvas.into();
					let (nw, nh) = surface_size(&canvas);
					canvas.set_width(nw as u32);
					canvas.set_height(nh as u32);
					engine.try_update_value(|engine| engine.resize(nw, nh));
				});
				let _ = window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
				state.resize = Some(on_resize);
			}
			if state.animate.is_none() {
				state.animate = Some(Closure::new(move || {
					frames.try_update_value(|state| state.pending = None);
					if frame_step(canvas_ref, engine) {
						request_frame();
					}
				}));
			}
		});
		request_frame();
	});

	// Unmount: stop the frame loop and detach from the window before the closures drop.
	on_cleanup(move || {
		frames.try_update_value(|state| {
			if let Some(window) = web_sys::window() {
				if let Some(handle) = state.pending.take() {
					let _ = window.cancel_animation_frame(handle);
				}
				if let Some(cb) = state.resize.as_ref() {
					let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
			}
			state.animate = None;
			state.resize = None;
		});
	});

	Effect::new(move |_| {
		let Some(id) = focus.and_then(|focus| focus.get()) else {
			return;
		};
		let found = engine
			.try_update_value(|engine| engine.select_by_id(&id))
			.unwrap_or(false);
		if !found {
			if let Some(on_missing) = on_missing {
				on_missing.run(id);
			}
		}
	});

	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		engine.update_value(|engine| engine.pointer_down(x, y));
	};

	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		let cursor = engine.try_update_value(|engine| {
			engine.pointer_move(x, y);
			if engine.is_dragging() {
				"grabbing"
			} else if engine.node_at(x, y).is_some() {
				"pointer"
			} else {
				"grab"
			}
		});
		if let Some(cursor) = cursor {
			let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
		}
	};

	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		engine.update_value(|engine| engine.pointer_up(x, y));
	};

	let on_mouseleave = move |_: MouseEvent| {
		engine.update_value(|engine| engine.pointer_leave());
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		engine.update_value(|engine| engine.wheel(x, y, ev.delta_y()));
	};

	let on_command = move |command: ControlCommand| {
		engine.update_value(|engine| match command {
			ControlCommand::ZoomIn => engine.zoom_in(),
			ControlCommand::ZoomOut => engine.zoom_out(),
			ControlCommand::Fit => engine.zoom_to_fit(),
			ControlCommand::Reset => engine.reset(),
		});
	};

	let is_empty = move || snapshot.with(DashboardSnapshot::is_empty);

	view! {
		<div class="entity-graph">
			<canvas
				node_ref=canvas_ref
				class="entity-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style:display=move || if is_empty() { "none" } else { "block" }
				style:cursor="grab"
			/>
			{move || {
				is_empty()
					.then(|| {
						view! {
							<div class="entity-graph-empty">
								<p>{EMPTY_MESSAGE}</p>
							</div>
						}
					})
			}}
			{show_controls.then(|| view! { <GraphControls on_command=on_command /> })}
			{show_legend.then(|| view! { <GraphLegend snapshot=snapshot /> })}
		</div>
	}
}
