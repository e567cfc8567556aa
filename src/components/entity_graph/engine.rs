//! The graph engine: one instance per mounted view, owning model, layout, viewport,
//! selection and interaction state.

use log::{debug, info};

use super::builder::{GraphModel, build_model};
use super::config::GraphConfig;
use super::hover::HoverState;
use super::layout::LayeredForceLayout;
use super::routing::EdgeRouter;
use super::scene::{Frame, Scene, build_scene, empty_scene};
use super::selection::SelectionController;
use super::types::{DashboardSnapshot, Point, SelectionEvent};
use super::viewport::{ViewTransform, ViewportController};

/// What `render` produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
	/// A graph was built.
	Graph {
		/// Nodes in the model.
		nodes: usize,
		/// Edges that resolved.
		edges: usize,
	},
	/// Nothing to draw, or nowhere to draw it.
	Empty,
}

struct Mounted {
	model: GraphModel,
	layout: LayeredForceLayout,
	router: EdgeRouter,
}

#[derive(Clone, Debug, Default)]
struct DragState {
	node: Option<usize>,
	pointer_start: Point,
	node_start: Point,
}

/// A pointer press on a node that may still turn out to be a click.
#[derive(Clone, Copy, Debug)]
struct Press {
	node: usize,
	origin: Point,
	travelled: f64,
}

type SelectionListener = Box<dyn FnMut(&SelectionEvent)>;

/// One graph view: model, layout, viewport, selection and pointer state.
pub struct GraphEngine {
	config: GraphConfig,
	mounted: Option<Mounted>,
	viewport: ViewportController,
	selection: SelectionController,
	hover: HoverState,
	drag: DragState,
	press: Option<Press>,
	listener: Option<SelectionListener>,
}

impl GraphEngine {
	/// An engine with nothing rendered yet.
	pub fn new(config: GraphConfig) -> Self {
		let viewport = ViewportController::new(config.viewport.clone(), 0.0, 0.0);
		Self {
			config,
			mounted: None,
			viewport,
			selection: SelectionController::default(),
			hover: HoverState::default(),
			drag: DragState::default(),
			press: None,
			listener: None,
		}
	}

	/// Register the detail-panel sink for selection events.
	pub fn on_select(&mut self, listener: impl FnMut(&SelectionEvent) + 'static) {
		self.listener = Some(Box::new(listener));
	}

	/// Tear down all state and rebuild it from `snapshot` for a surface of the given size.
	pub fn render(&mut self, snapshot: &DashboardSnapshot, width: f64, height: f64) -> RenderOutcome {
		self.mounted = None;
		self.selection.clear();
		self.hover = HoverState::default();
		self.drag = DragState::default();
		self.press = None;
		self.viewport = ViewportController::new(self.config.viewport.clone(), width, height);

		if snapshot.is_empty() || width <= 0.0 || height <= 0.0 {
			info!("entity graph: nothing to render ({width}x{height})");
			return RenderOutcome::Empty;
		}

		let mut model = build_model(snapshot);
		let mut layout = LayeredForceLayout::new(&model, self.config.layout.clone(), width, height);
		layout.reset(&mut model);
		let mut router = EdgeRouter::new(self.config.edges.clone());
		router.update(&model);

		let outcome = RenderOutcome::Graph {
			nodes: model.nodes.len(),
			edges: model.edges.len(),
		};
		info!(
			"entity graph: {} nodes, {} edges from {} entities",
			model.nodes.len(),
			model.edges.len(),
			snapshot.entity_count()
		);
		self.mounted = Some(Mounted { model, layout, router });
		outcome
	}

	/// The current model, if a graph is rendered.
	pub fn model(&self) -> Option<&GraphModel> {
		self.mounted.as_ref().map(|m| &m.model)
	}

	/// The running layout, if a graph is rendered.
	pub fn layout(&self) -> Option<&LayeredForceLayout> {
		self.mounted.as_ref().map(|m| &m.layout)
	}

	/// Zoom and pan state.
	pub fn viewport(&self) -> &ViewportController {
		&self.viewport
	}

	/// Current graph-to-screen transform.
	pub fn transform(&self) -> ViewTransform {
		self.viewport.transform
	}

	/// Index of the selected node.
	pub fn selected(&self) -> Option<usize> {
		self.selection.selected()
	}

	/// Id of the selected node.
	pub fn selected_id(&self) -> Option<&str> {
		let idx = self.selection.selected()?;
		self.model().map(|m| m.nodes[idx].id.as_str())
	}

	/// True while a node is being dragged.
	pub fn is_dragging(&self) -> bool {
		self.drag.node.is_some()
	}

	/// Advance layout, hover fade and view transition by `dt` seconds.
	/// Returns true while anything is still moving.
	pub fn tick(&mut self, dt: f64) -> bool {
		let mut busy = self.viewport.advance(dt * 1000.0);
		if let Some(m) = self.mounted.as_mut() {
			if m.layout.tick(&mut m.model, dt as f32) {
				busy = true;
			}
			m.router.update(&m.model);
		}
		self.hover.tick(dt) || busy
	}

	/// Draw commands for the current state.
	pub fn scene(&self) -> Scene {
		let (width, height) = self.viewport.size();
		let Some(m) = self.mounted.as_ref() else {
			return empty_scene(width, height);
		};
		build_scene(&Frame {
			model: &m.model,
			routes: m.router.routes(),
			transform: self.viewport.transform,
			selection: &self.selection,
			hover: &self.hover,
			style: m.router.style(),
			width,
			height,
		})
	}

	/// New surface size; layer bands and centring follow, the model is kept.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport.resize(width, height);
		if let Some(m) = self.mounted.as_mut() {
			m.layout.resize(width, height);
		}
	}

	/// Topmost node under a screen point.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<usize> {
		let model = self.model()?;
		let p = self.viewport.screen_to_graph(sx, sy);
		let slop = self.config.viewport.hit_slop;
		model
			.nodes
			.iter()
			.enumerate()
			.rev()
			.find(|(_, n)| n.position.distance(p) <= n.radius + slop)
			.map(|(i, _)| i)
	}

	// Selection

	/// Select the node at `idx` and notify the listener. False if there is no such node.
	pub fn select(&mut self, idx: usize) -> bool {
		let Some(m) = self.mounted.as_ref() else {
			return false;
		};
		let Some(event) = self.selection.select(&m.model, idx) else {
			return false;
		};
		self.emit(&event);
		true
	}

	/// Navigation entry point for other views. Returns false, and changes nothing, when the
	/// id is not in the graph; reporting that is up to the caller.
	pub fn select_by_id(&mut self, id: &str) -> bool {
		let Some(m) = self.mounted.as_ref() else {
			debug!("select_by_id({id:?}) with no graph rendered");
			return false;
		};
		let Some(event) = self.selection.select_by_id(&m.model, id) else {
			return false;
		};
		self.emit(&event);
		true
	}

	fn emit(&mut self, event: &SelectionEvent) {
		debug!("selected {} {:?}", event.node_type.label(), event.id);
		if let Some(listener) = self.listener.as_mut() {
			listener(event);
		}
	}

	// Drag

	/// Pin `idx` where it is and keep the simulation warm. Returns false if a drag is
	/// already running or the node does not exist.
	pub fn drag_start(&mut self, idx: usize, pointer: Point) -> bool {
		let target = self.config.layout.drag_alpha_target;
		let Some(m) = self.mounted.as_mut() else {
			return false;
		};
		if self.drag.node.is_some() {
			return false;
		}
		let Some(node) = m.model.nodes.get_mut(idx) else {
			return false;
		};
		node.pinned = Some(node.position);
		self.drag = DragState {
			node: Some(idx),
			pointer_start: pointer,
			node_start: node.position,
		};
		m.layout.set_alpha_target(target);
		true
	}

	/// Move the pin with the pointer (graph coordinates).
	pub fn drag_move(&mut self, pointer: Point) -> bool {
		let (Some(idx), Some(m)) = (self.drag.node, self.mounted.as_mut()) else {
			return false;
		};
		let at = Point::new(
			self.drag.node_start.x + (pointer.x - self.drag.pointer_start.x),
			self.drag.node_start.y + (pointer.y - self.drag.pointer_start.y),
		);
		let node = &mut m.model.nodes[idx];
		node.pinned = Some(at);
		node.position = at;
		m.router.update(&m.model);
		true
	}

	/// Release the pin and let the simulation settle. Returns false if no drag was running.
	pub fn drag_end(&mut self) -> bool {
		let Some(idx) = self.drag.node.take() else {
			return false;
		};
		if let Some(m) = self.mounted.as_mut() {
			m.model.nodes[idx].pinned = None;
			m.layout.set_alpha_target(0.0);
		}
		true
	}

	// Pointer gestures, screen coordinates

	/// Press: grabs a node, or starts panning on the background.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		match self.node_at(sx, sy) {
			Some(idx) => {
				let pointer = self.viewport.screen_to_graph(sx, sy);
				if self.drag_start(idx, pointer) {
					self.press = Some(Press {
						node: idx,
						origin: Point::new(sx, sy),
						travelled: 0.0,
					});
				}
			}
			None => self.viewport.pan_start(sx, sy),
		}
	}

	/// Drag, pan or hover, depending on what the press started.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.drag.node.is_some() {
			if let Some(press) = self.press.as_mut() {
				press.travelled = press.travelled.max(press.origin.distance(Point::new(sx, sy)));
			}
			let pointer = self.viewport.screen_to_graph(sx, sy);
			self.drag_move(pointer);
		} else if self.viewport.pan.active {
			self.viewport.pan_move(sx, sy);
		} else {
			let hovered = self.node_at(sx, sy);
			if let Some(m) = self.mounted.as_ref() {
				self.hover.set(&m.model, hovered);
			}
		}
	}

	/// Ends a drag or pan; a press that barely moved selects its node.
	pub fn pointer_up(&mut self, _sx: f64, _sy: f64) {
		self.viewport.pan_end();
		let press = self.press.take();
		self.drag_end();
		if let Some(press) = press {
			if press.travelled < self.config.viewport.click_slop {
				self.select(press.node);
			}
		}
	}

	/// Pointer left the surface: cancels the gesture without selecting.
	pub fn pointer_leave(&mut self) {
		self.viewport.pan_end();
		self.press = None;
		self.drag_end();
		if let Some(m) = self.mounted.as_ref() {
			self.hover.set(&m.model, None);
		}
	}

	/// Wheel zoom about the pointer.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		self.viewport.wheel(sx, sy, delta_y);
	}

	// View commands

	/// Zoom about the viewport centre.
	pub fn zoom_by(&mut self, factor: f64) {
		self.viewport.zoom_by(factor);
	}

	/// One zoom-in button step.
	pub fn zoom_in(&mut self) {
		self.zoom_by(self.config.viewport.button_factor);
	}

	/// One zoom-out button step.
	pub fn zoom_out(&mut self) {
		self.zoom_by(1.0 / self.config.viewport.button_factor);
	}

	/// Animate to a view showing every node.
	pub fn zoom_to_fit(&mut self) {
		if let Some(m) = self.mounted.as_ref() {
			self.viewport.zoom_to_fit(&m.model);
		}
	}

	/// Fresh per-layer placement at full energy and the identity view.
	pub fn reset(&mut self) {
		self.press = None;
		self.drag = DragState::default();
		if let Some(m) = self.mounted.as_mut() {
			m.layout.reset(&mut m.model);
			m.router.update(&m.model);
		}
		debug!("entity graph reset");
		self.viewport.reset();
	}
}

impl Default for GraphEngine {
	fn default() -> Self {
		Self::new(GraphConfig::default())
	}
}
