//! Various helper functions for testing
//!
//! functions in this module should use results and not use any panics to avoid confusion in callers

use std::io::Write;
use std::path::{Path, PathBuf};

use modsync_rs::component::{Action, Instruction};
use modsync_rs::{Component, ModSyncOptions};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("zip error: {0}")]
	Zip(#[from] zip::result::ZipError),
	#[error("copy error: {0}")]
	Copy(#[from] fs_extra::error::Error),
	#[error("directory was rejected by the options: {0}")]
	InvalidDirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A throwaway mod directory and game directory, removed when dropped.
pub struct TestEnvironment {
	_root: tempfile::TempDir,
	/// Canonical form of the temp dir, matching what the options store.
	path: PathBuf,
}

impl TestEnvironment {
	/// Creates `mods/` and `game/Override/` under a fresh temp dir.
	pub fn new() -> Result<Self> {
		let root = tempfile::tempdir()?;
		let path = root.path().canonicalize()?;
		std::fs::create_dir_all(path.join("mods"))?;
		std::fs::create_dir_all(path.join("game").join("Override"))?;
		Ok(Self { _root: root, path })
	}

	pub fn root(&self) -> &Path {
		&self.path
	}

	pub fn mod_directory(&self) -> PathBuf {
		self.path.join("mods")
	}

	pub fn kotor_directory(&self) -> PathBuf {
		self.path.join("game")
	}

	pub fn override_directory(&self) -> PathBuf {
		self.kotor_directory().join("Override")
	}

	/// Options pointing at this environment's directories.
	pub fn options(&self) -> Result<ModSyncOptions> {
		let mut options = ModSyncOptions::default();
		if !options.set_mod_directory(self.mod_directory()) {
			return Err(Error::InvalidDirectory(self.mod_directory()));
		}
		if !options.set_kotor_directory(self.kotor_directory()) {
			return Err(Error::InvalidDirectory(self.kotor_directory()));
		}
		Ok(options)
	}

	/// Writes a zip named `name` into the mod directory, see [`write_zip`].
	pub fn add_zip(&self, name: &str, entries: &[(&str, &str)]) -> Result<PathBuf> {
		let path = self.mod_directory().join(name);
		write_zip(&path, entries)?;
		Ok(path)
	}

	/// Writes a file relative to the mod directory, creating parent folders.
	pub fn add_mod_file(&self, relative: &str, contents: &[u8]) -> Result<PathBuf> {
		write_file(&self.mod_directory().join(relative), contents)
	}

	/// Writes a file relative to the game directory, creating parent folders.
	pub fn add_game_file(&self, relative: &str, contents: &[u8]) -> Result<PathBuf> {
		write_file(&self.kotor_directory().join(relative), contents)
	}

	/// Copies a folder of prepared files into the mod directory, the folder itself lands under `mods/`.
	pub fn copy_into_mods(&self, folder: impl AsRef<Path>) -> Result<()> {
		let options = fs_extra::dir::CopyOptions::new().overwrite(true);
		fs_extra::dir::copy(folder, self.mod_directory(), &options)?;
		Ok(())
	}
}

fn write_file(path: &Path, contents: &[u8]) -> Result<PathBuf> {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, contents)?;
	Ok(path.to_path_buf())
}

/// Writes a zip with the given `(name, contents)` entries.
///
/// A name ending in `/` is added as a directory and its contents are ignored.
pub fn write_zip(path: impl AsRef<Path>, entries: &[(&str, &str)]) -> Result<()> {
	let file = std::fs::File::create(path)?;
	let mut zip = zip::ZipWriter::new(file);
	let options = zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
	for (name, contents) in entries {
		if name.ends_with('/') {
			zip.add_directory(*name, options)?;
		} else {
			zip.start_file(*name, options)?;
			zip.write_all(contents.as_bytes())?;
		}
	}
	zip.finish()?;
	Ok(())
}

/// A selected component with a random GUID.
pub fn component(name: &str) -> Component {
	let mut component = Component::new(name, uuid::Uuid::new_v4());
	component.is_selected = true;
	component
}

pub fn instruction(action: Action, source: &[&str], destination: Option<&str>) -> Instruction {
	let instruction = Instruction::new(action, source.iter().copied());
	match destination {
		Some(destination) => instruction.with_destination(destination),
		None => instruction,
	}
}
