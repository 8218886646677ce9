/// Outcome of installing one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallExitCode {
	Success,
	/// The component's dependencies or restrictions don't fit the current selection.
	DependencyViolation,
	UserCancelledInstall,
	/// A `choose` instruction named an option the component doesn't define.
	InvalidOperation,
}

impl InstallExitCode {
	pub fn description(&self) -> &'static str {
		match self {
			InstallExitCode::Success => "Completed Successfully",
			InstallExitCode::DependencyViolation => "A dependency or restriction violation between components has occurred.",
			InstallExitCode::UserCancelledInstall => "User cancelled the installation.",
			InstallExitCode::InvalidOperation => "An invalid operation was attempted.",
		}
	}
}

impl std::fmt::Display for InstallExitCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.description())
	}
}

/// Outcome of running one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionExitCode {
	Success,
	InvalidSelfExtractingExecutable,
	InvalidArchive,
	ArchiveParseError,
	/// A file the instruction needs wasn't there when it ran.
	FileNotFoundPost,
	IOError,
	RenameTargetAlreadyExists,
	TslPatcherCliError,
	ChildProcessError,
	UnknownError,
	/// The patcher's install log reported errors.
	TslPatcherError,
	UnknownInstruction,
	TslPatcherLogNotFound,
	UserDeclined,
}

impl ActionExitCode {
	pub fn description(&self) -> &'static str {
		match self {
			ActionExitCode::Success => "Completed Successfully",
			ActionExitCode::InvalidSelfExtractingExecutable => "The executable could not be run as a self extracting archive.",
			ActionExitCode::InvalidArchive => "The file is not a supported archive.",
			ActionExitCode::ArchiveParseError => "The archive could not be read.",
			ActionExitCode::FileNotFoundPost => "A required file could not be found.",
			ActionExitCode::IOError => "A file operation failed.",
			ActionExitCode::RenameTargetAlreadyExists => "A file with the new name already exists.",
			ActionExitCode::TslPatcherCliError => "The patcher exited with an error.",
			ActionExitCode::ChildProcessError => "The program exited with an error.",
			ActionExitCode::UnknownError => "An unexpected error occurred.",
			ActionExitCode::TslPatcherError => "The patcher reported errors in its install log.",
			ActionExitCode::UnknownInstruction => "The instruction's action is not known.",
			ActionExitCode::TslPatcherLogNotFound => "The patcher did not write an install log.",
			ActionExitCode::UserDeclined => "The user declined to continue.",
		}
	}
}

impl std::fmt::Display for ActionExitCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.description())
	}
}
