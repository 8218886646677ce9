//! Opening and listing mod archives.
//!
//! Supported formats are picked by extension only:
//! - `.zip` through `zip`
//! - `.7z` through `sevenz-rust2`
//! - `.rar` through `unrar`, behind the `rar` feature
//! - `.exe` is assumed to be a self extracting archive whose contents can't be listed.

use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
	Zip,
	Rar,
	SevenZip,
	SelfExtracting,
}

impl ArchiveFormat {
	pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
		let ext = path.as_ref().extension()?.to_string_lossy().to_lowercase();
		match ext.as_str() {
			"zip" => Some(Self::Zip),
			"rar" => Some(Self::Rar),
			"7z" => Some(Self::SevenZip),
			"exe" => Some(Self::SelfExtracting),
			_ => None,
		}
	}
}

pub fn is_archive(path: impl AsRef<Path>) -> bool {
	ArchiveFormat::from_path(path).is_some()
}

pub fn is_self_extracting(path: impl AsRef<Path>) -> bool {
	ArchiveFormat::from_path(path) == Some(ArchiveFormat::SelfExtracting)
}

/// One item inside an archive, `path` uses the separators stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
	pub path: String,
	pub is_directory: bool,
}

impl ArchiveEntry {
	pub fn file(path: impl Into<String>) -> Self {
		Self { path: path.into(), is_directory: false }
	}

	pub fn directory(path: impl Into<String>) -> Self {
		Self { path: path.into(), is_directory: true }
	}
}

/// An opened archive, dropped as soon as listing is done.
pub enum ArchiveHandle {
	Zip(zip::ZipArchive<File>),
	SevenZip(sevenz_rust2::Archive),
	#[cfg(feature = "rar")]
	Rar(PathBuf),
}

/// Opens `path` with the reader matching its extension.
///
/// `None` for unsupported, self extracting, or unreadable archives.
pub fn open_archive(path: impl AsRef<Path>) -> Option<ArchiveHandle> {
	let path = path.as_ref();
	let result: crate::Result<ArchiveHandle> = match ArchiveFormat::from_path(path)? {
		ArchiveFormat::Zip => File::open(path)
			.map_err(crate::Error::from)
			.and_then(|f| zip::ZipArchive::new(f).map_err(crate::Error::from))
			.map(ArchiveHandle::Zip),
		ArchiveFormat::SevenZip => sevenz_rust2::Archive::open(path)
			.map_err(crate::Error::from)
			.map(ArchiveHandle::SevenZip),
		#[cfg(feature = "rar")]
		ArchiveFormat::Rar => Ok(ArchiveHandle::Rar(path.to_path_buf())),
		#[cfg(not(feature = "rar"))]
		ArchiveFormat::Rar => Err(crate::Error::UnsupportedArchive(path.to_path_buf())),
		ArchiveFormat::SelfExtracting => Err(crate::Error::UnsupportedArchive(path.to_path_buf())),
	};

	match result {
		Ok(handle) => Some(handle),
		Err(e) => {
			log::debug!("Failed to open archive {}: {}", path.display(), e);
			None
		},
	}
}

impl ArchiveHandle {
	pub fn entries(&mut self) -> crate::Result<Vec<ArchiveEntry>> {
		match self {
			ArchiveHandle::Zip(zip) => {
				let mut out = Vec::with_capacity(zip.len());
				for i in 0..zip.len() {
					let file = zip.by_index(i)?;
					out.push(ArchiveEntry { path: file.name().to_string(), is_directory: file.is_dir() });
				}
				Ok(out)
			},
			ArchiveHandle::SevenZip(archive) => {
				Ok(archive.files.iter()
					.map(|e| ArchiveEntry { path: e.name().to_string(), is_directory: e.is_directory() })
					.collect())
			},
			#[cfg(feature = "rar")]
			ArchiveHandle::Rar(path) => {
				let mut out = Vec::new();
				for header in unrar::Archive::new(path).open_for_listing()? {
					let header = header?;
					out.push(ArchiveEntry {
						path: header.filename.to_string_lossy().to_string(),
						is_directory: header.is_directory(),
					});
				}
				Ok(out)
			},
		}
	}
}

/// Lists the entries of an archive on disk.
///
/// The validator only sees archives through this so listing can be swapped out.
pub trait ArchiveInspector {
	fn list_entries(&self, path: &Path) -> crate::Result<Vec<ArchiveEntry>>;
}

/// Reads archives from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsArchiveInspector;

impl ArchiveInspector for FsArchiveInspector {
	fn list_entries(&self, path: &Path) -> crate::Result<Vec<ArchiveEntry>> {
		let mut handle = open_archive(path).ok_or_else(|| crate::Error::UnsupportedArchive(path.to_path_buf()))?;
		handle.entries()
	}
}

/// Extracts a zip, 7z or rar archive into `destination`, creating it if needed.
///
/// Zip entries that would land outside `destination` are skipped.
pub fn extract_archive(path: impl AsRef<Path>, destination: impl AsRef<Path>) -> crate::Result<()> {
	let path = path.as_ref();
	let destination = destination.as_ref();
	std::fs::create_dir_all(destination)?;

	match ArchiveFormat::from_path(path) {
		Some(ArchiveFormat::Zip) => {
			let mut zip = zip::ZipArchive::new(File::open(path)?)?;
			for i in 0..zip.len() {
				let mut file = zip.by_index(i)?;
				let safe_path: PathBuf = match file.enclosed_name() {
					Some(p) => p.to_owned(),
					None => {
						log::warn!("Skipping unsafe entry '{}' in {}", file.name(), path.display());
						continue;
					},
				};

				let output_path = destination.join(safe_path);
				if file.is_dir() {
					std::fs::create_dir_all(&output_path)?;
					continue;
				}
				if let Some(parent) = output_path.parent() {
					std::fs::create_dir_all(parent)?;
				}
				let mut outfile = File::create(&output_path)?;
				std::io::copy(&mut file, &mut outfile)?;
			}
			Ok(())
		},
		Some(ArchiveFormat::SevenZip) => {
			sevenz_rust2::decompress_file(path, destination)?;
			Ok(())
		},
		#[cfg(feature = "rar")]
		Some(ArchiveFormat::Rar) => {
			let mut archive = unrar::Archive::new(path).open_for_processing()?;
			while let Some(header) = archive.read_header()? {
				archive = if header.entry().is_file() {
					header.extract_with_base(destination)?
				} else {
					header.skip()?
				};
			}
			Ok(())
		},
		_ => Err(crate::Error::UnsupportedArchive(path.to_path_buf())),
	}
}
