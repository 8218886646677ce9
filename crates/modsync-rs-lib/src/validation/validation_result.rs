use serde::Serialize;
use uuid::Uuid;

use crate::component::Component;

/// Where in a component a finding or fix applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InstructionLocation {
	/// Index into [`Component::instructions`].
	Component(usize),
	/// An option's nested instruction, or the option's own source/destination when `index` is `None`.
	Option { option: Uuid, index: Option<usize> },
}

impl std::fmt::Display for InstructionLocation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			InstructionLocation::Component(i) => write!(f, "Instruction #{}", i + 1),
			InstructionLocation::Option { option, index: Some(i) } => write!(f, "Option {} Instruction #{}", option, i + 1),
			InstructionLocation::Option { option, index: None } => write!(f, "Option {}", option),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PatchChange {
	SetSource { index: usize, value: String },
	SetDestination(Option<String>),
}

/// A correction proposed by validation, nothing is changed until it is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionPatch {
	pub location: InstructionLocation,
	pub change: PatchChange,
}

impl InstructionPatch {
	/// Returns false when the location no longer exists in `component`.
	pub fn apply(&self, component: &mut Component) -> bool {
		let (source, destination) = match &self.location {
			InstructionLocation::Component(i) => match component.instructions.get_mut(*i) {
				Some(instruction) => (&mut instruction.source, &mut instruction.destination),
				None => return false,
			},
			InstructionLocation::Option { option, index } => {
				let Some(option) = component.options.get_mut(option) else { return false };
				match index {
					Some(i) => match option.instructions.get_mut(*i) {
						Some(instruction) => (&mut instruction.source, &mut instruction.destination),
						None => return false,
					},
					None => (&mut option.source, &mut option.destination),
				}
			},
		};

		match &self.change {
			PatchChange::SetSource { index, value } => {
				match source.get_mut(*index) {
					Some(s) => {
						log::info!("Changing source '{}' to '{}'", s, value);
						*s = value.clone();
						true
					},
					None => false,
				}
			},
			PatchChange::SetDestination(value) => {
				log::info!("Changing destination {:?} to {:?}", destination, value);
				*destination = value.clone();
				true
			},
		}
	}
}

/// One finding of a validation run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
	pub component: String,
	pub component_guid: Uuid,
	pub location: Option<InstructionLocation>,
	pub action: String,
	pub message: String,
	pub is_error: bool,
	pub fix: Option<InstructionPatch>,
}

impl ValidationResult {
	pub(super) fn new(component: &Component, location: Option<InstructionLocation>, action: &str, message: String, is_error: bool, fix: Option<InstructionPatch>) -> Self {
		let level = if is_error { "[Error]" } else { "[Warning]" };
		let place = location.as_ref().map(|l| l.to_string()).unwrap_or_else(|| "Component".to_string());
		if is_error {
			log::error!("{} Component: '{}', {}, Action '{}'", level, component.name, place, action);
			log::error!("{} {}", level, message);
		} else {
			log::warn!("{} Component: '{}', {}, Action '{}'", level, component.name, place, action);
			log::warn!("{} {}", level, message);
		}

		Self {
			component: component.name.clone(),
			component_guid: component.guid,
			location,
			action: action.to_string(),
			message,
			is_error,
			fix,
		}
	}

	/// 0-based index for findings on the component's own instructions.
	pub fn instruction_index(&self) -> Option<usize> {
		match self.location {
			Some(InstructionLocation::Component(i)) => Some(i),
			_ => None,
		}
	}
}
