//! Runs a component's instructions against the mod and game directories.

use uuid::Uuid;

use crate::component::{Action, Component, Instruction, ModOption};
use crate::ModSyncOptions;

pub mod actions;
mod exit_code;

pub use actions::RealPaths;
pub use exit_code::ActionExitCode;
pub use exit_code::InstallExitCode;

/// How the installer talks to whoever is driving it.
pub trait InstallCallbacks {
	/// Called when an instruction fails.
	/// `Some(true)` retries it, `Some(false)` skips it and `None` stops installing the component.
	fn prompt_install_error(&mut self, message: &str) -> Option<bool>;
	/// Asked by `confirm` instructions, declining fails the instruction.
	fn confirm(&mut self, message: &str) -> bool;
	fn inform(&mut self, message: &str);
}

/// Installs `component` if the selection in `roster` allows it.
///
/// Failed instructions are reported through `callbacks`, only missing directories are an `Err`.
pub fn install_component(component: &Component, roster: &[Component], options: &ModSyncOptions, callbacks: &mut dyn InstallCallbacks) -> crate::Result<InstallExitCode> {
	if options.mod_directory().is_none() {
		return Err(crate::Error::DirectoryNotSet("mod directory"));
	}
	if options.kotor_directory().is_none() {
		return Err(crate::Error::DirectoryNotSet("KOTOR directory"));
	}

	if !component.should_install_component(roster, true) {
		return Ok(InstallExitCode::DependencyViolation);
	}

	log::info!("Installing '{}'", component.name);
	let exit_code = execute_instructions(&component.instructions, component, roster, options, callbacks)?;
	if exit_code == InstallExitCode::Success {
		log::info!("Finished installing '{}'", component.name);
	}
	Ok(exit_code)
}

enum Step {
	Action(ActionExitCode),
	Install(InstallExitCode),
}

fn execute_instructions(instructions: &[Instruction], component: &Component, roster: &[Component], options: &ModSyncOptions, callbacks: &mut dyn InstallCallbacks) -> crate::Result<InstallExitCode> {
	for (i, instruction) in instructions.iter().enumerate() {
		let number = i + 1;
		if !Component::should_run_instruction(instruction, roster, true) {
			log::info!("Skipping instruction #{} '{}' due to conflicts with the current selection.", number, instruction.action_name());
			continue;
		}

		loop {
			log::debug!("Running instruction #{} '{}'", number, instruction.action_name());
			let exit_code = match execute_instruction(instruction, component, roster, options, callbacks)? {
				Step::Install(InstallExitCode::Success) | Step::Action(ActionExitCode::Success) => {
					log::info!("Successfully completed instruction #{} '{}'", number, instruction.action_name());
					break;
				},
				Step::Install(code) => return Ok(code),
				Step::Action(code) => code,
			};

			log::error!("FAILED Instruction #{} Action '{}': {}", number, instruction.action_name(), exit_code);
			let message = format!("An error occurred during the installation of '{}':\n{}", component.name, exit_code.description());
			match callbacks.prompt_install_error(&message) {
				Some(true) => continue,
				Some(false) => {
					log::warn!("Skipping instruction #{} '{}'", number, instruction.action_name());
					break;
				},
				None => {
					log::warn!("Install of '{}' cancelled", component.name);
					return Ok(InstallExitCode::UserCancelledInstall);
				},
			}
		}
	}
	Ok(InstallExitCode::Success)
}

fn execute_instruction(instruction: &Instruction, component: &Component, roster: &[Component], options: &ModSyncOptions, callbacks: &mut dyn InstallCallbacks) -> crate::Result<Step> {
	let Some(action) = &instruction.action else {
		return Ok(Step::Action(ActionExitCode::Success));
	};

	/* Checked in install_component */
	let kotor_directory = options.kotor_directory().ok_or(crate::Error::DirectoryNotSet("KOTOR directory"))?;

	let paths = RealPaths::resolve(&instruction.source, instruction.destination.as_deref(), options);
	let result = match action {
		Action::Extract => actions::extract(&paths),
		Action::Delete => actions::delete(&paths),
		Action::DelDuplicate => actions::delete_duplicate(&paths, &instruction.arguments),
		Action::Copy => actions::transfer(&paths, instruction.overwrite, true),
		Action::Move => actions::transfer(&paths, instruction.overwrite, false),
		Action::Rename => actions::rename(&paths, instruction.destination.as_deref(), instruction.overwrite),
		Action::TslPatcher => actions::run_patcher(&paths, kotor_directory, &instruction.arguments),
		Action::Execute => actions::execute(&paths, &instruction.arguments),
		Action::Backup => actions::backup(&paths, kotor_directory),
		Action::Choose => return choose(instruction, component, roster, options, callbacks),
		Action::Confirm => {
			let message = first_source(instruction, options);
			Ok(if callbacks.confirm(&message) { ActionExitCode::Success } else { ActionExitCode::UserDeclined })
		},
		Action::Inform => {
			callbacks.inform(&first_source(instruction, options));
			Ok(ActionExitCode::Success)
		},
		Action::Unknown(name) => {
			log::warn!("Unknown instruction '{}'", name);
			Ok(ActionExitCode::UnknownInstruction)
		},
	};

	match result {
		Ok(code) => Ok(Step::Action(code)),
		Err(e) => {
			log::error!("Unexpected error running '{}': {}", action, e);
			Ok(Step::Action(ActionExitCode::UnknownError))
		},
	}
}

fn first_source(instruction: &Instruction, options: &ModSyncOptions) -> String {
	instruction.source.first().map(|s| options.replace_custom_variables(s)).unwrap_or_default()
}

/// Runs every selected option named in the instruction's sources.
fn choose(instruction: &Instruction, component: &Component, roster: &[Component], options: &ModSyncOptions, callbacks: &mut dyn InstallCallbacks) -> crate::Result<Step> {
	for source in &instruction.source {
		let option = Uuid::parse_str(source.trim()).ok().and_then(|guid| component.find_option_from_guid(&guid));
		let Some(option) = option else {
			log::error!("'{}' is not an option of '{}'", source, component.name);
			return Ok(Step::Install(InstallExitCode::InvalidOperation));
		};

		if !option.is_selected || !Component::should_run_option(option, roster, true) {
			log::debug!("Not installing option '{}'", option.name);
			continue;
		}

		log::info!("Installing option '{}'", option.name);
		if option.instructions.is_empty() {
			let code = move_option_sources(option, options);
			if code != ActionExitCode::Success {
				return Ok(Step::Action(code));
			}
			continue;
		}

		let code = execute_instructions(&option.instructions, component, roster, options, callbacks)?;
		if code != InstallExitCode::Success {
			return Ok(Step::Install(code));
		}
	}
	Ok(Step::Install(InstallExitCode::Success))
}

fn move_option_sources(option: &ModOption, options: &ModSyncOptions) -> ActionExitCode {
	let paths = RealPaths::resolve(&option.source, option.destination.as_deref(), options);
	match actions::transfer(&paths, true, false) {
		Ok(code) => code,
		Err(e) => {
			log::error!("Unexpected error installing option '{}': {}", option.name, e);
			ActionExitCode::UnknownError
		},
	}
}

/// Installs every selected component of `components` in the given order.
///
/// Components whose relations conflict with the selection are skipped,
/// any other failure stops the run and is returned.
pub fn install_all(components: &[&Component], roster: &[Component], options: &ModSyncOptions, callbacks: &mut dyn InstallCallbacks) -> crate::Result<InstallExitCode> {
	for component in components.iter().filter(|c| c.is_selected) {
		match install_component(component, roster, options, callbacks)? {
			InstallExitCode::Success => {},
			InstallExitCode::DependencyViolation => continue,
			code => return Ok(code),
		}
	}
	Ok(InstallExitCode::Success)
}

