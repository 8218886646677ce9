//! Works out an install order that satisfies every `install_before`/`install_after` constraint.
//!
//! This is a depth first ordering, not a strict topological sort. Cycles don't error,
//! they produce some order and the comparison against the roster reports the mismatch.

mod dependency_graph;
pub use dependency_graph::DependencyGraph;
pub use dependency_graph::EdgeData;
pub use dependency_graph::NodeData;

use crate::component::Component;

/// Returns whether `components` is already in a valid order, along with the computed order.
///
/// Components with no constraints keep their relative roster position.
pub fn confirm_components_install_order(components: &[Component]) -> crate::Result<(bool, Vec<&Component>)> {
	let graph = DependencyGraph::from_components(components)?;

	let ordered: Vec<&Component> = graph.post_order()
		.into_iter()
		.map(|i| &components[graph.graph[i].position])
		.collect();

	let is_correct_order = ordered.len() == components.len()
		&& ordered.iter().zip(components.iter()).all(|(a, b)| std::ptr::eq(*a, b));

	if is_correct_order {
		log::info!("Install order of {} components is correct.", components.len());
	} else {
		log::info!("Install order of {} components needs rearranging.", components.len());
	}

	Ok((is_correct_order, ordered))
}

/// Consumes a roster and returns it in install order.
pub fn sort_components(components: Vec<Component>) -> crate::Result<Vec<Component>> {
	let order: Vec<usize> = {
		let graph = DependencyGraph::from_components(&components)?;
		graph.post_order().into_iter().map(|i| graph.graph[i].position).collect()
	};

	let mut slots: Vec<Option<Component>> = components.into_iter().map(Some).collect();
	Ok(order.into_iter()
		.filter_map(|position| slots[position].take())
		.collect())
}
