//! Filesystem and process side of each action, working on resolved real paths.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::ActionExitCode;
use crate::archive::{self, ArchiveFormat};

/// Sources and destination with placeholders substituted and wildcards expanded.
#[derive(Debug, Default, Clone)]
pub struct RealPaths {
	pub sources: Vec<PathBuf>,
	pub destination: Option<PathBuf>,
}

impl RealPaths {
	/// Literal sources are kept even when they don't exist so the action can report them,
	/// wildcard sources only contribute what they match.
	pub fn resolve(source: &[String], destination: Option<&str>, options: &crate::ModSyncOptions) -> Self {
		let mut sources = Vec::new();
		for s in source {
			let real = crate::path_helper::fix_path_formatting(&options.replace_custom_variables(s));
			if crate::path_helper::contains_wildcards(&real) {
				sources.extend(options.enumerate_files([real.as_str()], false));
			} else if options.case_insensitive_pathing() && !Path::new(&real).exists() {
				let variant = crate::path_helper::find_case_variants(Path::new(&real)).into_iter().next();
				sources.push(variant.unwrap_or_else(|| PathBuf::from(real)));
			} else {
				sources.push(PathBuf::from(real));
			}
		}

		let destination = destination
			.filter(|d| !d.trim().is_empty())
			.map(|d| PathBuf::from(crate::path_helper::fix_path_formatting(&options.replace_custom_variables(d))));

		Self { sources, destination }
	}
}

fn file_name(path: &Path) -> String {
	path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
}

pub fn extract(paths: &RealPaths) -> crate::Result<ActionExitCode> {
	for source in &paths.sources {
		log::info!("File path: {}", source.display());
		let Some(format) = ArchiveFormat::from_path(source) else {
			log::error!("Failed to extract file '{}'. Invalid archive?", file_name(source));
			return Ok(ActionExitCode::InvalidArchive);
		};
		if !source.is_file() {
			log::error!("Archive '{}' does not exist", source.display());
			return Ok(ActionExitCode::FileNotFoundPost);
		}

		let parent = source.parent().map(Path::to_path_buf).unwrap_or_default();

		if format == ArchiveFormat::SelfExtracting {
			let status = Command::new(source)
				.arg(format!("-o{}", parent.display()))
				.arg("-y")
				.status();
			match status {
				Ok(s) if s.success() => continue,
				Ok(s) => log::error!("'{}' exited with {}", file_name(source), s),
				Err(e) => log::error!("'{}' could not be started: {}", file_name(source), e),
			}
			log::error!("'{}' is not a self-extracting executable as previously assumed. Cannot extract.", file_name(source));
			return Ok(ActionExitCode::InvalidSelfExtractingExecutable);
		}

		/* Everything goes into a folder named after the archive, validation relies on this. */
		let stem = source.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
		let destination = parent.join(stem);
		log::info!("Extracting '{}' to '{}'", file_name(source), destination.display());
		match archive::extract_archive(source, &destination) {
			Ok(()) => {},
			Err(crate::Error::IO(e)) => return Err(e.into()),
			Err(e) => {
				log::error!("Unable to parse archive '{}': {}", source.display(), e);
				return Ok(ActionExitCode::ArchiveParseError);
			},
		}
	}
	Ok(ActionExitCode::Success)
}

pub fn delete(paths: &RealPaths) -> crate::Result<ActionExitCode> {
	for source in &paths.sources {
		if !source.is_file() {
			log::error!("Invalid wildcards or file does not exist: '{}'", source.display());
			return Ok(ActionExitCode::FileNotFoundPost);
		}
		log::info!("Deleting '{}'...", source.display());
		std::fs::remove_file(source)?;
	}
	Ok(ActionExitCode::Success)
}

/// Where a texture exists as both `.tga` and `.tpc`, removes the copy with the `extension` extension.
pub fn delete_duplicate(paths: &RealPaths, extension: &str) -> crate::Result<ActionExitCode> {
	let Some(directory) = &paths.destination else {
		log::error!("No directory given to remove duplicates from");
		return Ok(ActionExitCode::FileNotFoundPost);
	};
	if !directory.is_dir() {
		log::error!("Directory '{}' does not exist", directory.display());
		return Ok(ActionExitCode::FileNotFoundPost);
	}

	let extension = extension.trim().trim_start_matches('.').to_lowercase();
	let files: Vec<PathBuf> = std::fs::read_dir(directory)?
		.filter_map(|e| e.ok())
		.map(|e| e.path())
		.filter(|p| p.is_file())
		.collect();

	let lower_ext = |p: &Path| p.extension().map(|e| e.to_string_lossy().to_lowercase()).unwrap_or_default();
	let lower_stem = |p: &Path| p.file_stem().map(|s| s.to_string_lossy().to_lowercase()).unwrap_or_default();

	let mut counts = HashMap::<String, usize>::new();
	for file in &files {
		if matches!(lower_ext(file).as_str(), "tga" | "tpc") {
			*counts.entry(lower_stem(file)).or_default() += 1;
		}
	}

	for file in &files {
		let stem = lower_stem(file);
		if stem.is_empty() || counts.get(&stem).copied().unwrap_or(0) <= 1 || lower_ext(file) != extension {
			continue;
		}
		match std::fs::remove_file(file) {
			Ok(()) => log::info!("Deleted file: '{}'", file_name(file)),
			Err(e) => log::error!("Failed to delete '{}': {}", file.display(), e),
		}
	}
	Ok(ActionExitCode::Success)
}

/// Copies or moves every source into the destination folder keeping file names.
pub fn transfer(paths: &RealPaths, overwrite: bool, keep_source: bool) -> crate::Result<ActionExitCode> {
	let Some(directory) = &paths.destination else {
		log::error!("No destination given");
		return Ok(ActionExitCode::FileNotFoundPost);
	};
	if !directory.is_dir() {
		log::error!("Destination '{}' does not exist", directory.display());
		return Ok(ActionExitCode::FileNotFoundPost);
	}

	for source in &paths.sources {
		if !source.exists() {
			log::error!("'{}' does not exist!", source.display());
			return Ok(ActionExitCode::FileNotFoundPost);
		}

		let target = directory.join(file_name(source));
		if target.exists() {
			if !overwrite {
				log::info!("Skipping file '{}' ( Overwrite set to False )", file_name(&target));
				continue;
			}
			log::info!("File already exists, deleting existing file '{}'", target.display());
			if target.is_dir() {
				std::fs::remove_dir_all(&target)?;
			} else {
				std::fs::remove_file(&target)?;
			}
		}

		if keep_source {
			log::info!("Copy '{}' to '{}'", file_name(source), target.display());
			if source.is_dir() {
				copy_dir(source, &target)?;
			} else {
				std::fs::copy(source, &target)?;
			}
		} else {
			log::info!("Move '{}' to '{}'", file_name(source), target.display());
			if std::fs::rename(source, &target).is_err() {
				/* rename fails across filesystems */
				if source.is_dir() {
					copy_dir(source, &target)?;
					std::fs::remove_dir_all(source)?;
				} else {
					std::fs::copy(source, &target)?;
					std::fs::remove_file(source)?;
				}
			}
		}
	}
	Ok(ActionExitCode::Success)
}

fn copy_dir(source: &Path, target: &Path) -> std::io::Result<()> {
	for entry in walkdir::WalkDir::new(source) {
		let entry = entry.map_err(std::io::Error::from)?;
		let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
		let out = target.join(relative);
		if entry.file_type().is_dir() {
			std::fs::create_dir_all(&out)?;
		} else {
			if let Some(parent) = out.parent() {
				std::fs::create_dir_all(parent)?;
			}
			std::fs::copy(entry.path(), &out)?;
		}
	}
	Ok(())
}

/// Renames each source within its own folder to `new_name`.
pub fn rename(paths: &RealPaths, new_name: Option<&str>, overwrite: bool) -> crate::Result<ActionExitCode> {
	let Some(new_name) = new_name.filter(|n| !n.trim().is_empty()) else {
		log::error!("No new file name given");
		return Ok(ActionExitCode::FileNotFoundPost);
	};

	let mut exit_code = ActionExitCode::Success;
	for source in &paths.sources {
		if !source.is_file() {
			log::error!("'{}' does not exist!", file_name(source));
			exit_code = ActionExitCode::FileNotFoundPost;
			continue;
		}

		let target = source.parent().map(|p| p.join(new_name)).unwrap_or_else(|| PathBuf::from(new_name));
		if target.exists() {
			if !overwrite {
				log::error!("Skipping file '{}' ( A file with the name '{}' already exists )", source.display(), file_name(&target));
				exit_code = ActionExitCode::RenameTargetAlreadyExists;
				continue;
			}
			log::info!("Replacing pre-existing '{}'", target.display());
			std::fs::remove_file(&target)?;
		}

		log::info!("Rename '{}' to '{}'", file_name(source), target.display());
		if let Err(e) = std::fs::rename(source, &target) {
			log::error!("Failed to rename '{}': {}", source.display(), e);
			exit_code = ActionExitCode::IOError;
		}
	}
	Ok(exit_code)
}

/// Runs a TSLPatcher style patcher against the game directory and checks its install log.
pub fn run_patcher(paths: &RealPaths, kotor_directory: &Path, arguments: &str) -> crate::Result<ActionExitCode> {
	for source in &paths.sources {
		let patcher_directory = if source.extension().is_some() {
			source.parent().map(Path::to_path_buf).unwrap_or_default()
		} else {
			source.clone()
		};
		if !patcher_directory.is_dir() {
			log::error!("The directory '{}' could not be located on the disk.", patcher_directory.display());
			return Ok(ActionExitCode::FileNotFoundPost);
		}

		for log_name in ["installlog.rtf", "installlog.txt"] {
			let stale = patcher_directory.join(log_name);
			if stale.is_file() {
				std::fs::remove_file(&stale)?;
			}
		}

		let executable = if source.is_file() {
			source.clone()
		} else {
			match find_patcher_executable(&patcher_directory)? {
				Some(exe) => exe,
				None => {
					log::error!("No patcher executable found in '{}'", patcher_directory.display());
					return Ok(ActionExitCode::FileNotFoundPost);
				},
			}
		};

		log::info!("Starting TSLPatcher instructions...");
		let mut command = Command::new(&executable);
		command.arg(kotor_directory).arg(&patcher_directory);
		if !arguments.trim().is_empty() {
			command.args(arguments.split_whitespace());
		}

		let output = match command.output() {
			Ok(o) => o,
			Err(e) => {
				log::error!("'{}' could not be started: {}", executable.display(), e);
				return Ok(ActionExitCode::TslPatcherCliError);
			},
		};
		log::debug!("'{}' exited with {}", file_name(&executable), output.status);
		log::debug!("{}", String::from_utf8_lossy(&output.stdout));
		log::debug!("{}", String::from_utf8_lossy(&output.stderr));

		match install_log_errors(&patcher_directory)? {
			None => {
				log::error!("No TSLPatcher log file found!");
				return Ok(ActionExitCode::TslPatcherLogNotFound);
			},
			Some(errors) if !errors.is_empty() => {
				for e in &errors {
					log::error!("{}", e);
				}
				return Ok(ActionExitCode::TslPatcherError);
			},
			Some(_) => {},
		}

		if !output.status.success() {
			return Ok(ActionExitCode::TslPatcherCliError);
		}
	}
	Ok(ActionExitCode::Success)
}

fn find_patcher_executable(directory: &Path) -> std::io::Result<Option<PathBuf>> {
	let mut fallback = None;
	for entry in std::fs::read_dir(directory)? {
		let path = entry?.path();
		if !archive::is_self_extracting(&path) {
			continue;
		}
		let name = file_name(&path).to_lowercase();
		if name == "tslpatcher.exe" || name == "holopatcher.exe" {
			return Ok(Some(path));
		}
		fallback.get_or_insert(path);
	}
	Ok(fallback)
}

/// Error lines of the patcher's install log, `None` when it didn't write one.
pub fn install_log_errors(patcher_directory: &Path) -> std::io::Result<Option<Vec<String>>> {
	let log_file = ["installlog.rtf", "installlog.txt"].into_iter()
		.map(|n| patcher_directory.join(n))
		.find(|p| p.is_file());
	let Some(log_file) = log_file else { return Ok(None) };

	let bytes = std::fs::read(&log_file)?;
	let content = String::from_utf8_lossy(&bytes);
	Ok(Some(
		content.lines()
			.filter(|l| l.contains("Error: ") || l.contains("[Error]"))
			.map(|l| l.trim().to_string())
			.collect()
	))
}

pub fn execute(paths: &RealPaths, arguments: &str) -> crate::Result<ActionExitCode> {
	for source in &paths.sources {
		if !source.is_file() {
			log::error!("The file '{}' could not be located on the disk", source.display());
			return Ok(ActionExitCode::FileNotFoundPost);
		}

		let output = match Command::new(source).args(arguments.split_whitespace()).output() {
			Ok(o) => o,
			Err(e) => {
				log::error!("'{}' could not be started: {}", source.display(), e);
				return Ok(ActionExitCode::ChildProcessError);
			},
		};
		log::debug!("{}\n{}", String::from_utf8_lossy(&output.stdout), String::from_utf8_lossy(&output.stderr));
		if !output.status.success() {
			log::error!("'{}' exited with {}", file_name(source), output.status);
			return Ok(ActionExitCode::ChildProcessError);
		}
	}
	Ok(ActionExitCode::Success)
}

/// Copies the sources into a `backup` folder of the game directory.
pub fn backup(paths: &RealPaths, kotor_directory: &Path) -> crate::Result<ActionExitCode> {
	let backup_directory = kotor_directory.join("backup");
	std::fs::create_dir_all(&backup_directory)?;
	let to_backup = RealPaths {
		sources: paths.sources.clone(),
		destination: Some(backup_directory),
	};
	transfer(&to_backup, true, true)
}
