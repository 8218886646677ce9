use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Placeholder for the directory holding downloaded mod archives.
pub const MOD_DIRECTORY_TOKEN: &str = "<<modDirectory>>";
/// Placeholder for the game's install directory.
pub const KOTOR_DIRECTORY_TOKEN: &str = "<<kotorDirectory>>";

#[derive(Debug, Clone)]
pub struct ModSyncOptions {
	mod_directory: Option<PathBuf>,
	kotor_directory: Option<PathBuf>,
	attempt_fixes: bool,
	case_insensitive_pathing: bool,
	exempt_components: Vec<String>,
}

impl Default for ModSyncOptions {
	fn default() -> Self {
		Self {
			mod_directory: None,
			kotor_directory: None,
			attempt_fixes: true,
			case_insensitive_pathing: false,
			/* Ships as a self extracting exe whose contents can't be listed. */
			exempt_components: vec!["Improved AI".to_string()],
		}
	}
}

/// On disk shape of the options file, every key is optional.
#[derive(Debug, Default, Deserialize)]
struct OptionsFile {
	mod_directory: Option<PathBuf>,
	kotor_directory: Option<PathBuf>,
	attempt_fixes: Option<bool>,
	case_insensitive_pathing: Option<bool>,
	exempt_components: Option<Vec<String>>,
}

impl ModSyncOptions {
	/// Reads options from a TOML file, anything not present keeps its default.
	///
	/// Directories that don't exist are ignored with a warning.
	pub fn load_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
		let path = path.as_ref();
		log::trace!("Reading options from {}", path.display());
		let text = std::fs::read_to_string(path)?;
		let file: OptionsFile = toml::from_str(&text)?;

		let mut options = Self::default();
		if let Some(dir) = file.mod_directory {
			if !options.set_mod_directory(dir.clone()) {
				log::warn!("Mod directory {} does not exist, ignoring.", dir.display());
			}
		}
		if let Some(dir) = file.kotor_directory {
			if !options.set_kotor_directory(dir.clone()) {
				log::warn!("KOTOR directory {} does not exist, ignoring.", dir.display());
			}
		}
		if let Some(fixes) = file.attempt_fixes {
			options.attempt_fixes = fixes;
		}
		if let Some(ignore_case) = file.case_insensitive_pathing {
			options.case_insensitive_pathing = ignore_case;
		}
		if let Some(exempt) = file.exempt_components {
			options.exempt_components = exempt;
		}
		Ok(options)
	}

	pub fn mod_directory(&self) -> Option<&Path> {
		self.mod_directory.as_deref()
	}
	/// returns if the directory is valid or not.
	///
	/// The directory is stored canonicalized so relative paths keep working after placeholder substitution.
	pub fn set_mod_directory(&mut self, mod_directory: PathBuf) -> bool {
		match canonical_directory(&mod_directory) {
			Some(dir) => {
				self.mod_directory = Some(dir);
				true
			},
			None => false,
		}
	}

	pub fn kotor_directory(&self) -> Option<&Path> {
		self.kotor_directory.as_deref()
	}
	/// returns if the directory is valid or not.
	///
	/// The directory is stored canonicalized so relative paths keep working after placeholder substitution.
	pub fn set_kotor_directory(&mut self, kotor_directory: PathBuf) -> bool {
		match canonical_directory(&kotor_directory) {
			Some(dir) => {
				self.kotor_directory = Some(dir);
				true
			},
			None => false,
		}
	}

	pub fn attempt_fixes(&self) -> bool {
		self.attempt_fixes
	}
	pub fn set_attempt_fixes(&mut self, attempt_fixes: bool) {
		self.attempt_fixes = attempt_fixes;
	}

	/// Whether source paths should also match files and folders whose names differ only in case.
	pub fn case_insensitive_pathing(&self) -> bool {
		self.case_insensitive_pathing
	}
	pub fn set_case_insensitive_pathing(&mut self, case_insensitive_pathing: bool) {
		self.case_insensitive_pathing = case_insensitive_pathing;
	}

	/// Resolves `paths` on disk, honouring [`ModSyncOptions::case_insensitive_pathing`].
	pub fn enumerate_files<S: AsRef<str>>(&self, paths: impl IntoIterator<Item = S>, top_level_only: bool) -> Vec<PathBuf> {
		if self.case_insensitive_pathing {
			crate::path_helper::enumerate_files_ignoring_case(paths, top_level_only)
		} else {
			crate::path_helper::enumerate_files_with_wildcards(paths, top_level_only)
		}
	}

	pub fn exempt_components(&self) -> &[String] {
		&self.exempt_components
	}
	pub fn set_exempt_components(&mut self, exempt_components: Vec<String>) {
		self.exempt_components = exempt_components;
	}

	pub fn is_exempt(&self, component_name: &str) -> bool {
		self.exempt_components.iter().any(|n| n.eq_ignore_ascii_case(component_name))
	}

	/// Substitutes the directory placeholders with the configured directories.
	///
	/// Placeholders for unset directories are left in place.
	/// Only call this right before acting on the path.
	pub fn replace_custom_variables(&self, path: &str) -> String {
		let mut out = path.to_string();
		if let Some(dir) = &self.mod_directory {
			out = out.replace(MOD_DIRECTORY_TOKEN, &dir.to_string_lossy());
		}
		if let Some(dir) = &self.kotor_directory {
			out = out.replace(KOTOR_DIRECTORY_TOKEN, &dir.to_string_lossy());
		}
		out
	}

	/// Inverse of [`ModSyncOptions::replace_custom_variables`].
	pub fn restore_custom_variables(&self, path: &str) -> String {
		let mut out = path.to_string();
		if let Some(dir) = &self.mod_directory {
			out = out.replace(dir.to_string_lossy().as_ref(), MOD_DIRECTORY_TOKEN);
		}
		if let Some(dir) = &self.kotor_directory {
			out = out.replace(dir.to_string_lossy().as_ref(), KOTOR_DIRECTORY_TOKEN);
		}
		out
	}
}

fn canonical_directory(path: &Path) -> Option<PathBuf> {
	if !path.is_dir() {
		return None;
	}
	match path.canonicalize() {
		Ok(dir) => Some(dir),
		Err(e) => {
			log::warn!("Could not resolve directory {}: {}", path.display(), e);
			None
		},
	}
}
