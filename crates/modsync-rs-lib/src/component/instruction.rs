use uuid::Uuid;

/// What an [`Instruction`] does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
	Extract,
	Delete,
	/// Removes the texture copy whose extension matches the instruction arguments when a `.tga` and `.tpc` share a name.
	DelDuplicate,
	Copy,
	Move,
	Rename,
	/// TSLPatcher or HoloPatcher.
	TslPatcher,
	Execute,
	/// Runs the chosen options, the sources are option GUIDs.
	Choose,
	Confirm,
	Inform,
	Backup,
	/// Kept with the spelling found in the manifest.
	Unknown(String),
}

impl Action {
	/// Case-insensitive parse, `None` for a blank string.
	pub fn parse(s: &str) -> Option<Self> {
		let trimmed = s.trim();
		if trimmed.is_empty() {
			return None;
		}
		Some(match trimmed.to_lowercase().as_str() {
			"extract" => Action::Extract,
			"delete" => Action::Delete,
			"delduplicate" => Action::DelDuplicate,
			"copy" => Action::Copy,
			"move" => Action::Move,
			"rename" => Action::Rename,
			"tslpatcher" | "holopatcher" | "patch" | "patcher" => Action::TslPatcher,
			"execute" | "run" => Action::Execute,
			"choose" => Action::Choose,
			"confirm" => Action::Confirm,
			"inform" => Action::Inform,
			"backup" => Action::Backup,
			_ => Action::Unknown(trimmed.to_string()),
		})
	}

	pub fn as_str(&self) -> &str {
		match self {
			Action::Extract => "extract",
			Action::Delete => "delete",
			Action::DelDuplicate => "delduplicate",
			Action::Copy => "copy",
			Action::Move => "move",
			Action::Rename => "rename",
			Action::TslPatcher => "tslpatcher",
			Action::Execute => "execute",
			Action::Choose => "choose",
			Action::Confirm => "confirm",
			Action::Inform => "inform",
			Action::Backup => "backup",
			Action::Unknown(s) => s,
		}
	}
}

impl std::fmt::Display for Action {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A single install step.
///
/// `source` and `destination` keep their `<<modDirectory>>`/`<<kotorDirectory>>` placeholders,
/// they're only substituted by the installer right before acting on them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Instruction {
	pub action: Option<Action>,
	pub source: Vec<String>,
	pub destination: Option<String>,
	pub overwrite: bool,
	pub arguments: String,
	pub dependencies: Vec<Uuid>,
	pub restrictions: Vec<Uuid>,
}

impl Instruction {
	pub fn new(action: Action, source: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			action: Some(action),
			source: source.into_iter().map(Into::into).collect(),
			..Default::default()
		}
	}

	pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
		self.destination = Some(destination.into());
		self
	}

	/// Name used in log lines, empty when there is no action.
	pub fn action_name(&self) -> &str {
		self.action.as_ref().map(Action::as_str).unwrap_or("")
	}
}
