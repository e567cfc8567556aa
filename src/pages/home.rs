use leptos::prelude::*;

use crate::components::entity_graph::{DashboardSnapshot, EntityGraphCanvas, SelectionEvent};

const SAMPLE_DASHBOARD: &str = include_str!("../../assets/sample_dashboard.json");

/// What the side panel shows for the selected node.
#[derive(Clone, Debug, PartialEq)]
struct SelectedEntity {
	id: String,
	kind: &'static str,
	name: String,
	status: Option<String>,
	related: Vec<String>,
}

impl From<&SelectionEvent> for SelectedEntity {
	fn from(event: &SelectionEvent) -> Self {
		Self {
			id: event.id.clone(),
			kind: event.node_type.label(),
			name: event.name.clone(),
			status: event.data.status.clone(),
			related: event.data.referenced_ids().into_iter().map(str::to_owned).collect(),
		}
	}
}

/// Minimal detail readout with jump links for the selected entity's relations.
#[component]
fn DetailPanel(
	selected: RwSignal<Option<SelectedEntity>>,
	focus: RwSignal<Option<String>>,
	missing: RwSignal<Option<String>>,
) -> impl IntoView {
	view! {
		<aside class="detail-panel">
			{move || match selected.get() {
				None => view! { <p class="subtitle">"Select a node to see its details."</p> }.into_any(),
				Some(entity) => view! {
					<div>
						<h2>{entity.name.clone()}</h2>
						<p class="subtitle">{format!("{} \u{00b7} {}", entity.kind, entity.id)}</p>
						{entity.status.clone().map(|status| view! { <p>"Status: " {status}</p> })}
						<ul class="relations">
							{entity
								.related
								.iter()
								.cloned()
								.map(|id| {
									let target = id.clone();
									view! {
										<li>
											<button on:click=move |_| {
												missing.set(None);
												focus.set(Some(target.clone()));
											}>{id}</button>
										</li>
									}
								})
								.collect_view()}
						</ul>
					</div>
				}
				.into_any(),
			}}
			{move || missing.get().map(|id| view! { <p class="not-found">{format!("{id} is not in the graph")}</p> })}
		</aside>
	}
}

/// Planning graph with a sample dashboard snapshot.
#[component]
pub fn Home() -> impl IntoView {
	let selected = RwSignal::new(None::<SelectedEntity>);
	let focus = RwSignal::new(None::<String>);
	let missing = RwSignal::new(None::<String>);

	let on_select = Callback::new(move |event: SelectionEvent| {
		selected.set(Some(SelectedEntity::from(&event)));
	});
	let on_missing = Callback::new(move |id: String| missing.set(Some(id)));

	let dashboard = DashboardSnapshot::from_json(SAMPLE_DASHBOARD).map(|snapshot| {
		let snapshot = Signal::derive(move || snapshot.clone());
		view! {
			<div class="fullscreen-graph">
				<EntityGraphCanvas
					snapshot=snapshot
					on_select=on_select
					focus=focus
					on_missing=on_missing
				/>
				<div class="graph-overlay">
					<h1>"Planning Graph"</h1>
					<p class="subtitle">
						"Strategy on top, execution in the middle, tasks below. Drag nodes, scroll to zoom, click to inspect."
					</p>
				</div>
				<DetailPanel selected=selected focus=focus missing=missing />
			</div>
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{dashboard}
		</ErrorBoundary>
	}
}
