//! Graph of ordering constraints between the components of a roster.

use std::collections::HashMap;

use petgraph::prelude::*;
use uuid::Uuid;

use crate::component::Component;

/// An edge `a -> b` means `b` has to be installed before `a`.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
	pub graph: StableDiGraph<NodeData, EdgeData>,
	nodes: HashMap<Uuid, NodeIndex>,
}

#[derive(Debug, Clone)]
pub struct NodeData {
	pub guid: Uuid,
	/// Index of the component in the roster the graph was built from.
	pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeData {
	/// The source component lists the target in `install_after`.
	InstallAfter,
	/// The target component lists the source in `install_before`.
	InstallBefore,
}

impl DependencyGraph {
	/// Builds one node per component and the edges for every `install_after`/`install_before` entry.
	///
	/// Edges are added component by component in roster order, `install_after` first.
	/// A GUID that isn't in `components` is a [`crate::Error::DanglingReference`],
	/// a GUID used by two components is a [`crate::Error::DuplicateComponent`].
	pub fn from_components(components: &[Component]) -> crate::Result<Self> {
		let mut graph = StableDiGraph::<NodeData, EdgeData>::default();
		let mut nodes = HashMap::<Uuid, NodeIndex>::with_capacity(components.len());

		for (position, component) in components.iter().enumerate() {
			if nodes.contains_key(&component.guid) {
				return Err(crate::Error::DuplicateComponent { component: component.name.clone(), guid: component.guid });
			}
			let index = graph.add_node(NodeData { guid: component.guid, position });
			nodes.insert(component.guid, index);
		}

		let mut dep_graph = Self { graph, nodes };

		for component in components {
			let this = dep_graph.get_node_index(&component.guid)
				.ok_or_else(|| crate::Error::Validation(format!("component '{}' missing from graph", component.name)))?;

			for guid in &component.install_after {
				let dependency = dep_graph.require_node(component, guid, "InstallAfter")?;
				dep_graph.graph.add_edge(this, dependency, EdgeData::InstallAfter);
			}
			for guid in &component.install_before {
				let dependent = dep_graph.require_node(component, guid, "InstallBefore")?;
				dep_graph.graph.add_edge(dependent, this, EdgeData::InstallBefore);
			}
		}

		Ok(dep_graph)
	}

	pub fn get_node_index(&self, guid: &Uuid) -> Option<NodeIndex> {
		self.nodes.get(guid).copied()
	}

	fn require_node(&self, component: &Component, guid: &Uuid, relation: &'static str) -> crate::Result<NodeIndex> {
		self.get_node_index(guid).ok_or_else(|| crate::Error::DanglingReference {
			component: component.name.clone(),
			guid: *guid,
			relation,
		})
	}

	/// Nodes that must come before `src`, in the order their edges were added.
	pub fn dependencies_of(&self, src: NodeIndex) -> Vec<NodeIndex> {
		let mut edges: Vec<_> = self.graph.edges_directed(src, Outgoing)
			.map(|e| (e.id(), e.target()))
			.collect();
		/* petgraph walks adjacency newest first */
		edges.sort_by_key(|(id, _)| id.index());
		edges.into_iter().map(|(_, target)| target).collect()
	}

	/// Depth first post order over every node, roots taken in roster order.
	///
	/// Nodes are marked before their dependencies are walked so a cycle is cut short instead of looping.
	pub fn post_order(&self) -> Vec<NodeIndex> {
		let mut roots: Vec<NodeIndex> = self.graph.node_indices().collect();
		roots.sort_by_key(|i| self.graph[*i].position);

		let mut visited = std::collections::HashSet::<NodeIndex>::with_capacity(roots.len());
		let mut out = Vec::with_capacity(roots.len());
		for root in roots {
			if !visited.contains(&root) {
				self.visit(root, &mut visited, &mut out);
			}
		}
		out
	}

	fn visit(&self, node: NodeIndex, visited: &mut std::collections::HashSet<NodeIndex>, out: &mut Vec<NodeIndex>) {
		visited.insert(node);
		for dependency in self.dependencies_of(node) {
			if !visited.contains(&dependency) {
				self.visit(dependency, visited, out);
			}
		}
		out.push(node);
	}
}
