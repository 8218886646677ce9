//! Library error type.

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("zip error: {0}")]
	Zip(#[from] zip::result::ZipError),
	#[error("7z error: {0}")]
	SevenZip(#[from] sevenz_rust2::Error),
	#[cfg(feature = "rar")]
	#[error("rar error: {0}")]
	Rar(#[from] unrar::error::UnrarError),
	#[error("TOML parsing error: {0}")]
	TomlDe(#[from] toml::de::Error),
	#[error("TOML serializing error: {0}")]
	TomlSer(#[from] toml::ser::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("parsing error: {0}")]
	Parse(String),
	#[error("required field `{0}` missing")]
	MissingField(&'static str),
	/// A component names a GUID in one of its relation lists that is not present in the roster.
	#[error("component '{component}' references unknown component {guid} in {relation}")]
	DanglingReference {
		component: String,
		guid: uuid::Uuid,
		relation: &'static str,
	},
	/// Two components of a roster share a GUID.
	#[error("component '{component}' reuses GUID {guid}")]
	DuplicateComponent {
		component: String,
		guid: uuid::Uuid,
	},
	/// The installer needs a directory the options don't have.
	#[error("{0} is not set")]
	DirectoryNotSet(&'static str),
	#[error("unsupported archive: {0}")]
	UnsupportedArchive(std::path::PathBuf),
	#[error("validation error: {0}")]
	Validation(String),
}
