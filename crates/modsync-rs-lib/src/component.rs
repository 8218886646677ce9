//! The in-memory model of a manifest: components, their instructions and their options.
//!
//! Relations between components are plain GUID lists, resolved against a roster when needed.

use indexmap::IndexMap;
use uuid::Uuid;

mod instruction;
pub use instruction::Action;
pub use instruction::Instruction;

mod option;
pub use option::ModOption;

/// One mod entry of a manifest.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Component {
	pub guid: Uuid,
	pub name: String,
	pub author: String,
	pub description: String,
	pub directions: String,
	pub category: String,
	pub tier: String,
	pub language: Vec<String>,
	pub installation_method: String,
	pub mod_link: Vec<String>,
	pub is_selected: bool,

	/// Components that must be selected for this one to install.
	pub dependencies: Vec<Uuid>,
	/// Components that must not be selected for this one to install.
	pub restrictions: Vec<Uuid>,
	pub install_before: Vec<Uuid>,
	pub install_after: Vec<Uuid>,

	pub instructions: Vec<Instruction>,
	/// Keyed by the option's own GUID, in manifest order.
	pub options: IndexMap<Uuid, ModOption>,
}

impl Component {
	pub fn new(name: impl Into<String>, guid: Uuid) -> Self {
		Self {
			name: name.into(),
			guid,
			..Default::default()
		}
	}

	/// First component of `roster` with `guid`.
	pub fn find_component_from_guid<'a>(guid: &Uuid, roster: &'a [Component]) -> Option<&'a Component> {
		roster.iter().find(|c| c.guid == *guid)
	}

	pub fn find_option_from_guid(&self, guid: &Uuid) -> Option<&ModOption> {
		self.options.get(guid)
	}

	/// Position of `instruction` in this component, compared by identity not value.
	pub fn instruction_index(&self, instruction: &Instruction) -> Option<usize> {
		self.instructions.iter().position(|i| std::ptr::eq(i, instruction))
	}

	pub fn add_option(&mut self, option: ModOption) {
		self.options.insert(option.guid, option);
	}
}

impl std::fmt::Display for Component {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name)
	}
}
