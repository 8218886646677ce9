//! Decides whether a component, instruction or option is allowed to run given what else is selected.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::component::{Component, Instruction, ModOption};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConflictKind {
	/// Required but not selected.
	Dependency,
	/// Forbidden but selected.
	Restriction,
}

impl std::fmt::Display for ConflictKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ConflictKind::Dependency => f.write_str("Dependency"),
			ConflictKind::Restriction => f.write_str("Restriction"),
		}
	}
}

/// Conflicting components grouped by kind, a kind only has an entry when it has at least one component.
pub type Conflicts<'a> = BTreeMap<ConflictKind, Vec<&'a Component>>;

/// Finds the components of `roster` that block something with these relations from running.
///
/// GUIDs missing from `roster` are ignored, partial rosters are normal.
/// `is_install` only controls whether a warning is logged.
pub fn get_conflicting_components<'a>(dependencies: &[Uuid], restrictions: &[Uuid], roster: &'a [Component], is_install: bool) -> Conflicts<'a> {
	let mut conflicts = Conflicts::new();

	let dependency_conflicts: Vec<&Component> = dependencies.iter()
		.filter_map(|guid| Component::find_component_from_guid(guid, roster))
		.filter(|c| !c.is_selected)
		.collect();
	if !dependency_conflicts.is_empty() {
		conflicts.insert(ConflictKind::Dependency, dependency_conflicts);
	}

	let restriction_conflicts: Vec<&Component> = restrictions.iter()
		.filter_map(|guid| Component::find_component_from_guid(guid, roster))
		.filter(|c| c.is_selected)
		.collect();
	if !restriction_conflicts.is_empty() {
		conflicts.insert(ConflictKind::Restriction, restriction_conflicts);
	}

	if is_install && !conflicts.is_empty() {
		for (kind, components) in &conflicts {
			let names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
			log::warn!("{} conflicts: {}", kind, names.join(", "));
		}
	}

	conflicts
}

impl Component {
	pub fn get_conflicts<'a>(&self, roster: &'a [Component], is_install: bool) -> Conflicts<'a> {
		get_conflicting_components(&self.dependencies, &self.restrictions, roster, is_install)
	}

	/// True when nothing in `roster` conflicts with this component's own relations.
	pub fn should_install_component(&self, roster: &[Component], is_install: bool) -> bool {
		let conflicts = self.get_conflicts(roster, is_install);
		if is_install && !conflicts.is_empty() {
			log::warn!("Skipping '{}' due to conflicts with the current selection.", self.name);
		}
		conflicts.is_empty()
	}

	/// True when nothing in `roster` conflicts with the instruction's relations.
	///
	/// The owning component's relations aren't considered here.
	pub fn should_run_instruction(instruction: &Instruction, roster: &[Component], is_install: bool) -> bool {
		get_conflicting_components(&instruction.dependencies, &instruction.restrictions, roster, is_install).is_empty()
	}

	pub fn should_run_option(option: &ModOption, roster: &[Component], is_install: bool) -> bool {
		get_conflicting_components(&option.dependencies, &option.restrictions, roster, is_install).is_empty()
	}
}
