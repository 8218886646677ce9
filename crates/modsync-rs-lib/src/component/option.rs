use uuid::Uuid;

use super::Instruction;

/// A user selectable variant of a component, run through a `choose` instruction.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ModOption {
	pub guid: Uuid,
	pub name: String,
	pub description: String,
	pub source: Vec<String>,
	pub destination: Option<String>,
	pub dependencies: Vec<Uuid>,
	pub restrictions: Vec<Uuid>,
	pub is_selected: bool,
	/// When empty choosing the option moves `source` into `destination`.
	pub instructions: Vec<Instruction>,
}

impl ModOption {
	pub fn new(name: impl Into<String>, guid: Uuid) -> Self {
		Self {
			name: name.into(),
			guid,
			..Default::default()
		}
	}
}
