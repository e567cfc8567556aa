//! Legend and view controls drawn over the graph canvas.

use leptos::prelude::*;

use super::types::{DashboardSnapshot, NodeType};

/// Buttons offered by [`GraphControls`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlCommand {
	ZoomIn,
	ZoomOut,
	Fit,
	Reset,
}

impl ControlCommand {
	const ALL: [ControlCommand; 4] = [
		ControlCommand::ZoomIn,
		ControlCommand::ZoomOut,
		ControlCommand::Fit,
		ControlCommand::Reset,
	];

	fn label(self) -> (&'static str, &'static str) {
		match self {
			ControlCommand::ZoomIn => ("+", "Zoom in"),
			ControlCommand::ZoomOut => ("\u{2212}", "Zoom out"),
			ControlCommand::Fit => ("Fit", "Zoom to fit"),
			ControlCommand::Reset => ("Reset", "Reset layout and view"),
		}
	}
}

#[component]
pub fn GraphControls<F>(on_command: F) -> impl IntoView
where
	F: Fn(ControlCommand) + Clone + 'static,
{
	view! {
		<div class="graph-controls">
			{ControlCommand::ALL
				.into_iter()
				.map(|command| {
					let on_command = on_command.clone();
					let (text, title) = command.label();
					view! {
						<button class="graph-control" title=title on:click=move |_| on_command(command)>
							{text}
						</button>
					}
				})
				.collect_view()}
		</div>
	}
}

/// One swatch per node type present in the snapshot, with its count.
#[component]
pub fn GraphLegend(#[prop(into)] snapshot: Signal<DashboardSnapshot>) -> impl IntoView {
	view! {
		<div class="graph-legend">
			{move || {
				snapshot.with(|snapshot| {
					NodeType::ALL
						.into_iter()
						.filter_map(|node_type| {
							let count = snapshot.count_of(node_type);
							(count > 0).then(|| {
								view! {
									<div class="graph-legend-item">
										<span
											class="graph-legend-swatch"
											style=format!("background-color: {}", node_type.style().color)
										></span>
										<span>{node_type.label()}</span>
										<span class="graph-legend-count">{format!("({})", count)}</span>
									</div>
								}
							})
						})
						.collect_view()
				})
			}}
		</div>
	}
}
