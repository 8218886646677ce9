//! Checks a component's instructions against the archives it ships in and the rules of each action.
//!
//! # Usage
//! 1. Create a [`ComponentValidation`] for one component of a roster.
//! 1. [`ComponentValidation::run()`] to collect every finding.
//! 1. Query errors and warnings, overall or per instruction.
//! 1. Optionally take [`ComponentValidation::proposed_fixes()`] and [`apply_fixes()`] them once the validation is dropped.
//!
//! Validation never changes the component. Findings are collected rather than returned early,
//! so every problem of a component is reported in one pass.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use uuid::Uuid;

use crate::archive::{self, ArchiveInspector, FsArchiveInspector};
use crate::component::{Action, Component, Instruction};
use crate::config::{ModSyncOptions, KOTOR_DIRECTORY_TOKEN, MOD_DIRECTORY_TOKEN};
use crate::conflict_resolver::get_conflicting_components;
use crate::path_helper;

mod validation_result;
pub use validation_result::InstructionLocation;
pub use validation_result::InstructionPatch;
pub use validation_result::PatchChange;
pub use validation_result::ValidationResult;

/// Outcome of looking for a path inside one archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchivePathCode {
	NotAnArchive,
	PathMissingArchiveName,
	CouldNotOpenArchive,
	NotFoundInArchive,
	FoundSuccessfully,
	NeedsAppendedArchiveName,
	NoArchivesFound,
}

impl ArchivePathCode {
	pub fn description(&self) -> &'static str {
		match self {
			ArchivePathCode::FoundSuccessfully => "File successfully found in archive.",
			ArchivePathCode::NotAnArchive => "Not an archive",
			ArchivePathCode::PathMissingArchiveName => "Missing archive name in path",
			ArchivePathCode::CouldNotOpenArchive => "Could not open archive",
			ArchivePathCode::NotFoundInArchive => "Not found in archive",
			ArchivePathCode::NoArchivesFound => "No archives found/no extract instructions created",
			ArchivePathCode::NeedsAppendedArchiveName => "Archive name needs to be added to the path",
		}
	}
}

/// Result of [`ComponentValidation::is_source_path_in_archives`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLookup {
	pub found: bool,
	/// Whether the first segment of the path matched an archive's name.
	pub archive_name_matched: bool,
	/// Message to report when `found` is false.
	pub failure: Option<String>,
}

/// An instruction, or an option's own source/destination, flattened for checking.
struct Target<'a> {
	location: InstructionLocation,
	action: Option<Action>,
	source: &'a [String],
	destination: Option<&'a str>,
	dependencies: &'a [Uuid],
	restrictions: &'a [Uuid],
}

impl Target<'_> {
	fn action_name(&self) -> &str {
		self.action.as_ref().map(Action::as_str).unwrap_or("")
	}
}

pub struct ComponentValidation<'a, I: ArchiveInspector = FsArchiveInspector> {
	component: &'a Component,
	roster: &'a [Component],
	options: &'a ModSyncOptions,
	inspector: I,
	results: Vec<ValidationResult>,
}

impl<'a> ComponentValidation<'a, FsArchiveInspector> {
	pub fn new(component: &'a Component, roster: &'a [Component], options: &'a ModSyncOptions) -> Self {
		Self::with_inspector(component, roster, options, FsArchiveInspector)
	}
}

impl<'a, I: ArchiveInspector> ComponentValidation<'a, I> {
	pub fn with_inspector(component: &'a Component, roster: &'a [Component], options: &'a ModSyncOptions, inspector: I) -> Self {
		Self {
			component,
			roster,
			options,
			inspector,
			results: Default::default(),
		}
	}

	pub fn component(&self) -> &Component {
		self.component
	}

	/// Runs both checking phases, returning true when neither reported an error.
	///
	/// Previous findings are discarded. Warnings never fail validation.
	pub fn run(&mut self) -> bool {
		log::info!("Validating component '{}'", self.component.name);
		self.results.clear();

		let paths_ok = self.verify_extract_paths();
		let destinations_ok = self.parse_destination_with_action();

		paths_ok && destinations_ok && !self.results.iter().any(|r| r.is_error)
	}

	pub fn results(&self) -> &[ValidationResult] {
		&self.results
	}

	pub fn get_errors(&self) -> Vec<&str> {
		self.messages(|r| r.is_error)
	}

	pub fn get_warnings(&self) -> Vec<&str> {
		self.messages(|r| !r.is_error)
	}

	pub fn errors_for_index(&self, instruction_index: usize) -> Vec<&str> {
		self.messages(|r| r.is_error && r.instruction_index() == Some(instruction_index))
	}

	pub fn warnings_for_index(&self, instruction_index: usize) -> Vec<&str> {
		self.messages(|r| !r.is_error && r.instruction_index() == Some(instruction_index))
	}

	/// Errors for an instruction of this component, found by identity.
	pub fn errors_for_instruction(&self, instruction: &Instruction) -> Vec<&str> {
		match self.locate(instruction) {
			Some(location) => self.messages(|r| r.is_error && r.location.as_ref() == Some(&location)),
			None => vec![],
		}
	}

	pub fn warnings_for_instruction(&self, instruction: &Instruction) -> Vec<&str> {
		match self.locate(instruction) {
			Some(location) => self.messages(|r| !r.is_error && r.location.as_ref() == Some(&location)),
			None => vec![],
		}
	}

	/// Every patch attached to a finding, in the order they were found.
	pub fn proposed_fixes(&self) -> Vec<InstructionPatch> {
		self.results.iter()
			.filter_map(|r| r.fix.clone())
			.collect()
	}

	fn messages(&self, filter: impl Fn(&ValidationResult) -> bool) -> Vec<&str> {
		self.results.iter()
			.filter(|r| filter(r))
			.map(|r| r.message.as_str())
			.collect()
	}

	fn locate(&self, instruction: &Instruction) -> Option<InstructionLocation> {
		if let Some(i) = self.component.instruction_index(instruction) {
			return Some(InstructionLocation::Component(i));
		}
		self.component.options.values().find_map(|option| {
			option.instructions.iter()
				.position(|i| std::ptr::eq(i, instruction))
				.map(|index| InstructionLocation::Option { option: option.guid, index: Some(index) })
		})
	}

	fn add(&mut self, target: &Target, message: String, is_error: bool, fix: Option<PatchChange>) {
		let fix = fix.map(|change| InstructionPatch { location: target.location.clone(), change });
		self.results.push(ValidationResult::new(self.component, Some(target.location.clone()), target.action_name(), message, is_error, fix));
	}

	fn add_error(&mut self, target: &Target, message: String) {
		self.add(target, message, true, None);
	}

	fn add_warning(&mut self, target: &Target, message: String) {
		self.add(target, message, false, None);
	}

	/// Component instructions followed by those of each option, plus options that only carry a source.
	fn targets(&self) -> Vec<Target<'a>> {
		let component: &'a Component = self.component;
		let mut targets = Vec::new();

		for (i, instruction) in component.instructions.iter().enumerate() {
			targets.push(Target {
				location: InstructionLocation::Component(i),
				action: instruction.action.clone(),
				source: &instruction.source,
				destination: instruction.destination.as_deref(),
				dependencies: &instruction.dependencies,
				restrictions: &instruction.restrictions,
			});
		}

		for option in component.options.values() {
			for (i, instruction) in option.instructions.iter().enumerate() {
				targets.push(Target {
					location: InstructionLocation::Option { option: option.guid, index: Some(i) },
					action: instruction.action.clone(),
					source: &instruction.source,
					destination: instruction.destination.as_deref(),
					dependencies: &instruction.dependencies,
					restrictions: &instruction.restrictions,
				});
			}
			if option.instructions.is_empty() && !option.source.is_empty() {
				/* Choosing such an option moves its source into its destination. */
				targets.push(Target {
					location: InstructionLocation::Option { option: option.guid, index: None },
					action: Some(Action::Move),
					source: &option.source,
					destination: option.destination.as_deref(),
					dependencies: &option.dependencies,
					restrictions: &option.restrictions,
				});
			}
		}

		targets
	}

	fn path_match(&self, input: &str, pattern: &str) -> bool {
		if self.options.case_insensitive_pathing() {
			path_helper::wildcard_path_match_ignoring_case(input, pattern)
		} else {
			path_helper::wildcard_path_match(input, pattern)
		}
	}

	fn should_run(&self, target: &Target) -> bool {
		get_conflicting_components(target.dependencies, target.restrictions, self.roster, false).is_empty()
	}

	/// Resolves the archives named by every `extract` instruction.
	///
	/// `.exe` files are trusted as self extracting archives. Missing archives are only an error
	/// when their instruction would actually run.
	pub fn get_all_archives_from_instructions(&mut self) -> Vec<PathBuf> {
		let mut all_archives = Vec::<PathBuf>::new();

		for target in self.targets() {
			if target.action != Some(Action::Extract) {
				continue;
			}

			for source in target.source {
				let real = self.options.replace_custom_variables(source);
				let mut candidates = self.options.enumerate_files([real.as_str()], true);
				if candidates.is_empty() {
					candidates.push(PathBuf::from(path_helper::fix_path_formatting(&real)));
				}

				for candidate in candidates {
					let file_name = candidate.file_name()
						.map(|n| n.to_string_lossy().to_string())
						.unwrap_or_else(|| candidate.to_string_lossy().to_string());

					if archive::is_self_extracting(&candidate) {
						/* No way to look inside a self extracting exe. */
						all_archives.push(candidate);
						continue;
					}

					if !archive::is_archive(&candidate) {
						self.add_warning(&target, format!("File '{}' is used in an 'extract' action but is not a supported archive.", file_name));
						continue;
					}

					if candidate.is_file() {
						all_archives.push(candidate);
						continue;
					}

					if !self.should_run(&target) {
						continue;
					}

					self.add_error(&target, format!("Missing required download: '{}'", file_name));
				}
			}
		}

		all_archives
	}

	/// Phase one, every non extract source path has to exist inside one of the extracted archives.
	fn verify_extract_paths(&mut self) -> bool {
		let all_archives = self.get_all_archives_from_instructions();
		let mut success = true;

		if all_archives.is_empty() {
			for target in self.targets() {
				if target.action == Some(Action::Extract) {
					self.add_error(&target, format!("Missing Required Archives for 'Extract' action: [{}]", target.source.join(",")));
					success = false;
				}
			}
			return success;
		}

		for target in self.targets() {
			match &target.action {
				None | Some(Action::Extract) => continue,
				Some(Action::Choose) => {
					success &= self.verify_chosen_options(&target);
					continue;
				},
				/* Sources are messages or non archive files. */
				Some(Action::Confirm) | Some(Action::Inform) | Some(Action::Unknown(_)) => continue,
				_ => {},
			}

			if target.source.is_empty() {
				self.add_warning(&target, "Instruction does not have a 'Source' key defined".to_string());
				continue;
			}

			let mut archive_name_found = true;
			for (index, raw) in target.source.iter().enumerate() {
				let source_path = path_helper::fix_path_formatting(raw);

				if starts_with_ignore_case(&source_path, KOTOR_DIRECTORY_TOKEN) {
					continue;
				}

				if source_path.to_lowercase().ends_with("tslpatcher.exe") && target.action != Some(Action::TslPatcher) {
					self.add_warning(&target, "'tslpatcher.exe' used in Source path without the action 'tslpatcher', was this intentional?".to_string());
				}

				if archive::is_archive(&source_path) && !archive::is_self_extracting(&source_path) {
					let name = Path::new(&source_path).file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
					self.add_warning(&target, format!("Archive '{}' is referenced in a non 'extract' action. Was this intentional?", name));
				}

				let lookup = self.lookup_source(&source_path, &all_archives, &target);
				archive_name_found &= lookup.archive_name_matched;
				if lookup.found {
					continue;
				}

				/* Some archives extract with an extra top level folder named after themselves. */
				let repaired = duplicate_first_folder(&source_path)
					.filter(|path| self.lookup_source(path, &all_archives, &target).found);
				let failure = lookup.failure.unwrap_or_else(|| format!("Failed to find '{}' in any archives!", source_path));

				match repaired {
					Some(path) if self.options.attempt_fixes() => {
						log::info!("Fixing the above issue automatically...");
						self.add(&target, format!("{} Source path can be fixed to '{}'.", failure, path), false, Some(PatchChange::SetSource { index, value: path }));
					},
					Some(path) => {
						self.add(&target, format!("{} Source path can be fixed to '{}'.", failure, path), true, Some(PatchChange::SetSource { index, value: path }));
						success = false;
					},
					None => {
						self.add_error(&target, failure);
						success = false;
					},
				}
			}

			if !archive_name_found {
				self.add_warning(&target, "'Source' path does not include the archive's name as part of the extraction folder, possible FileNotFound exception.".to_string());
			}
		}

		success
	}

	/// `choose` sources are GUIDs of this component's options.
	fn verify_chosen_options(&mut self, target: &Target) -> bool {
		let mut success = true;
		for raw in target.source {
			match Uuid::parse_str(raw.trim()) {
				Ok(guid) if self.component.find_option_from_guid(&guid).is_some() => {},
				Ok(guid) => {
					self.add_error(target, format!("Option {} is not defined in component '{}'", guid, self.component.name));
					success = false;
				},
				Err(_) => {
					self.add_error(target, format!("'{}' is not a valid option GUID", raw));
					success = false;
				},
			}
		}
		success
	}

	/// Looks for `source_path` in each archive in turn, stopping at the first match.
	///
	/// Placeholder prefixes are stripped since archives are extracted inside the mod directory.
	/// A path that can't be found is still accepted when its instruction won't run or the
	/// component is exempt. Nothing is recorded, the caller decides how to report the outcome.
	pub fn is_source_path_in_archives(&self, source_path: &str, all_archives: &[PathBuf], target_instruction: &Instruction) -> SourceLookup {
		let target = Target {
			location: InstructionLocation::Component(0),
			action: target_instruction.action.clone(),
			source: &target_instruction.source,
			destination: target_instruction.destination.as_deref(),
			dependencies: &target_instruction.dependencies,
			restrictions: &target_instruction.restrictions,
		};
		self.lookup_source(source_path, all_archives, &target)
	}

	fn lookup_source(&self, source_path: &str, all_archives: &[PathBuf], target: &Target) -> SourceLookup {
		let relative = path_helper::fix_path_formatting(source_path)
			.replace(&format!("{MOD_DIRECTORY_TOKEN}{MAIN_SEPARATOR}"), "")
			.replace(&format!("{KOTOR_DIRECTORY_TOKEN}{MAIN_SEPARATOR}"), "");
		let first_part = relative.split(MAIN_SEPARATOR).next().unwrap_or_default().to_string();

		let mut archive_name_matched = false;
		let mut error_description = Vec::<&'static str>::new();

		if all_archives.is_empty() {
			error_description.push(ArchivePathCode::NoArchivesFound.description());
		}

		for archive_path in all_archives {
			let archive_name = file_stem(archive_path);
			archive_name_matched |= self.path_match(&archive_name, &first_part);

			match self.is_path_in_archive(&relative, archive_path) {
				ArchivePathCode::FoundSuccessfully => {
					return SourceLookup { found: true, archive_name_matched, failure: None };
				},
				ArchivePathCode::NotFoundInArchive => continue,
				code => error_description.push(code.description()),
			}
		}

		if !self.should_run(target) || self.options.is_exempt(&self.component.name) {
			return SourceLookup { found: true, archive_name_matched: true, failure: None };
		}

		let failure = if error_description.is_empty() {
			format!("Failed to find '{}' in any archives!", relative)
		} else {
			format!("Invalid source path '{}'. Reason: {}", relative, error_description.join(", "))
		};
		SourceLookup { found: false, archive_name_matched, failure: Some(failure) }
	}

	/// Checks whether `relative_path` names the extraction folder of `archive_path` or something extracted into it.
	///
	/// Archives extract into a folder named after the archive, so entries are prefixed with the archive's stem.
	pub fn is_path_in_archive(&self, relative_path: &str, archive_path: &Path) -> ArchivePathCode {
		if !archive::is_archive(archive_path) {
			return ArchivePathCode::NotAnArchive;
		}
		if archive::is_self_extracting(archive_path) {
			return ArchivePathCode::FoundSuccessfully;
		}

		let entries = match self.inspector.list_entries(archive_path) {
			Ok(e) => e,
			Err(e) => {
				log::warn!("Could not open archive {}: {}", archive_path.display(), e);
				return ArchivePathCode::CouldNotOpenArchive;
			},
		};

		let archive_name = file_stem(archive_path);
		if self.path_match(&archive_name, relative_path) {
			return ArchivePathCode::FoundSuccessfully;
		}

		let mut folder_paths = BTreeSet::<String>::new();
		for entry in &entries {
			let item = path_helper::fix_path_formatting(&format!("{}{}{}", archive_name, MAIN_SEPARATOR, entry.path));

			let folder = if entry.is_directory { item.clone() } else { path_helper::get_folder_name(&item) };
			/* Not every archive lists its folders, so every ancestor counts as one. */
			let mut folder = Some(Path::new(&folder));
			while let Some(f) = folder {
				if f.as_os_str().is_empty() {
					break;
				}
				folder_paths.insert(f.to_string_lossy().to_string());
				folder = f.parent();
			}

			if self.path_match(&item, relative_path) {
				return ArchivePathCode::FoundSuccessfully;
			}
		}

		if folder_paths.iter().any(|f| self.path_match(f, relative_path)) {
			return ArchivePathCode::FoundSuccessfully;
		}

		ArchivePathCode::NotFoundInArchive
	}

	/// Phase two, the `destination` of every instruction has to fit its action.
	fn parse_destination_with_action(&mut self) -> bool {
		let mut success = true;
		let fixing = self.options.attempt_fixes();

		for target in self.targets() {
			let destination = target.destination.filter(|d| !d.trim().is_empty());

			match &target.action {
				None => continue,
				Some(Action::TslPatcher) => match destination {
					None => {
						self.add(
							&target,
							format!("Destination must be {KOTOR_DIRECTORY_TOKEN} with 'TSLPatcher' action, setting it now automatically."),
							false,
							Some(PatchChange::SetDestination(Some(KOTOR_DIRECTORY_TOKEN.to_string()))),
						);
					},
					Some(d) if !d.trim().eq_ignore_ascii_case(KOTOR_DIRECTORY_TOKEN) => {
						let message = format!("'Destination' key must be either null or string literal '{KOTOR_DIRECTORY_TOKEN}' for this action. Got '{d}'");
						if fixing {
							log::info!("Fixing the above issue automatically.");
						} else {
							success = false;
						}
						self.add(&target, message, !fixing, Some(PatchChange::SetDestination(Some(KOTOR_DIRECTORY_TOKEN.to_string()))));
					},
					Some(_) => {},
				},
				Some(Action::Choose) | Some(Action::Extract) | Some(Action::Delete) => {
					if let Some(d) = destination {
						let message = format!("'Destination' key cannot be used with this action. Got '{d}'");
						if fixing {
							log::info!("Fixing the above issue automatically.");
						} else {
							success = false;
						}
						self.add(&target, message, !fixing, Some(PatchChange::SetDestination(None)));
					}
				},
				Some(Action::Rename) => {
					/* The new name is joined onto the source's folder, so only a bare file name works. */
					let override_dir = path_helper::fix_path_formatting(&format!("{KOTOR_DIRECTORY_TOKEN}/Override"));
					let bad = match destination {
						None => true,
						Some(d) => path_helper::fix_path_formatting(d) == override_dir || d.contains(['/', '\\']),
					};
					if bad {
						self.add_error(&target, format!("Incorrect 'Destination' format. Got '{}', expected a filename.", destination.unwrap_or("")));
						success = false;
					}
				},
				Some(Action::Confirm) | Some(Action::Inform) | Some(Action::Backup) => continue,
				Some(Action::Unknown(name)) => {
					let message = format!("Unknown action '{}'", name);
					self.add_warning(&target, message);
				},
				Some(_) => {
					let destination_path = destination
						.map(|d| self.options.replace_custom_variables(d))
						.unwrap_or_default();

					if !path_helper::is_valid_path(&destination_path)
						|| !Path::new(&path_helper::fix_path_formatting(&destination_path)).is_dir()
					{
						self.add_error(&target, format!("Destination cannot be found! Got '{}'", destination_path));
						success = false;
					}
				},
			}
		}

		success
	}
}

/// Applies `fixes` to `component`, returning how many could be applied.
pub fn apply_fixes(component: &mut Component, fixes: &[InstructionPatch]) -> usize {
	fixes.iter()
		.filter(|fix| {
			let applied = fix.apply(component);
			if !applied {
				log::warn!("Could not apply fix at {} to '{}'", fix.location, component.name);
			}
			applied
		})
		.count()
}

/// `token/archive/rest` becomes `token/archive/archive/rest`.
fn duplicate_first_folder(source_path: &str) -> Option<String> {
	let parts: Vec<&str> = source_path.split(MAIN_SEPARATOR).collect();
	if parts.len() < 2 {
		return None;
	}

	let mut repaired = Vec::with_capacity(parts.len() + 1);
	repaired.push(parts[0]);
	repaired.push(parts[1]);
	repaired.extend_from_slice(&parts[1..]);
	Some(repaired.join(&MAIN_SEPARATOR.to_string()))
}

fn file_stem(path: &Path) -> String {
	path.file_stem()
		.map(|s| s.to_string_lossy().to_string())
		.unwrap_or_default()
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
	s.len() >= prefix.len()
		&& s.is_char_boundary(prefix.len())
		&& s[..prefix.len()].eq_ignore_ascii_case(prefix)
}
