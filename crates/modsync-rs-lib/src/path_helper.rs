//! Path normalisation and the `*`/`?` wildcard matching used for sources and archive entries.
//!
//! Matching is done per path segment so a `*` never crosses a separator.

use std::collections::HashSet;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Characters rejected by [`is_valid_path`] on every platform.
const INVALID_PATH_CHARS: &[char] = &['<', '>', '"', '|', '?', '*', '\0', '\n', '\r', '\t', '\u{8}', '\u{7}', '\u{b}', '\u{c}'];

const RESERVED_FILE_NAMES: &[&str] = &[
	"CON", "PRN", "AUX", "NUL",
	"COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9",
	"LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Converts both slash kinds to the platform separator, collapses repeats and drops a trailing separator.
///
/// A repeat directly after a `:` is kept so `C://x` and URL-ish roots survive.
/// Blank input is returned unchanged.
pub fn fix_path_formatting(path: &str) -> String {
	if path.trim().is_empty() {
		return path.to_string();
	}

	let mut out = String::with_capacity(path.len());
	let mut previous: Option<char> = None;
	let mut in_run = false;
	for c in path.chars() {
		let c = if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c };
		if c == MAIN_SEPARATOR && previous == Some(MAIN_SEPARATOR) {
			/* Repeats are only kept when the run started right after a colon. */
			if !in_run {
				continue;
			}
		} else {
			in_run = c == MAIN_SEPARATOR && previous == Some(':');
		}
		out.push(c);
		previous = Some(c);
	}

	while out.len() > 1 && out.ends_with(MAIN_SEPARATOR) {
		out.pop();
	}
	out
}

pub fn contains_wildcards(path: &str) -> bool {
	path.contains('*') || path.contains('?')
}

/// Matches a single segment against a pattern where `*` is any run and `?` is any one character.
pub fn wildcard_match(input: &str, pattern: &str) -> bool {
	segment_match(input, pattern, false)
}

fn segment_match(input: &str, pattern: &str, ignore_case: bool) -> bool {
	let translated = regex::escape(pattern)
		.replace(r"\*", ".*")
		.replace(r"\?", ".");
	let flags = if ignore_case { "(?i)" } else { "" };
	match regex::Regex::new(&format!("{flags}^{translated}$")) {
		Ok(re) => re.is_match(input),
		Err(e) => {
			log::warn!("Wildcard pattern '{}' failed to compile: {}", pattern, e);
			false
		},
	}
}

/// Segment-wise wildcard match of a concrete path against a pattern path.
///
/// Both sides are normalised first. Differing segment counts never match.
pub fn wildcard_path_match(input: &str, pattern: &str) -> bool {
	path_match(input, pattern, false)
}

/// [`wildcard_path_match`] where letters match regardless of case.
pub fn wildcard_path_match_ignoring_case(input: &str, pattern: &str) -> bool {
	path_match(input, pattern, true)
}

fn path_match(input: &str, pattern: &str, ignore_case: bool) -> bool {
	let input = fix_path_formatting(input);
	let pattern = fix_path_formatting(pattern);

	let input_levels: Vec<&str> = input.split(MAIN_SEPARATOR).collect();
	let pattern_levels: Vec<&str> = pattern.split(MAIN_SEPARATOR).collect();

	if input_levels.len() != pattern_levels.len() {
		return false;
	}

	input_levels.iter()
		.zip(pattern_levels.iter())
		.all(|(input_level, pattern_level)| {
			*pattern_level == "*"
			|| *pattern_level == "?"
			|| segment_match(input_level, pattern_level, ignore_case)
		})
}

/// The containing folder when `path` names a file (has an extension), otherwise `path` itself.
pub fn get_folder_name(path: &str) -> String {
	let p = Path::new(path);
	if p.extension().is_some() {
		p.parent()
			.map(|parent| parent.to_string_lossy().to_string())
			.unwrap_or_default()
	} else {
		path.to_string()
	}
}

/// Checks a full path string for characters and names no supported platform accepts.
///
/// Separators and colons aren't checked since this validates whole paths not file names.
pub fn is_valid_path(path: &str) -> bool {
	if path.trim().is_empty() {
		return false;
	}
	if path.contains(INVALID_PATH_CHARS) {
		return false;
	}
	if path.chars().any(|c| (c as u32) < 0x20) {
		return false;
	}

	let normalized = fix_path_formatting(path);
	let stem = Path::new(&normalized)
		.file_stem()
		.map(|s| s.to_string_lossy().to_string())
		.unwrap_or_default();
	if RESERVED_FILE_NAMES.iter().any(|r| r.eq_ignore_ascii_case(&stem)) {
		return false;
	}
	if stem.ends_with(' ') || stem.ends_with('.') {
		return false;
	}

	true
}

/// Resolves a batch of literal and wildcard paths into the files they refer to on disk.
///
/// - Duplicate inputs are only processed once, output order follows first appearance.
/// - A literal directory yields its files, recursively unless `top_level_only`.
/// - A wildcard path walks from its deepest existing non-wildcard ancestor.
/// - Failures on one path are logged and don't stop the rest.
pub fn enumerate_files_with_wildcards<S: AsRef<str>>(paths: impl IntoIterator<Item = S>, top_level_only: bool) -> Vec<PathBuf> {
	enumerate_files(paths, top_level_only, false)
}

/// [`enumerate_files_with_wildcards`] for case sensitive filesystems holding files written for a case insensitive one.
///
/// Every folder on the way whose name differs only in case is searched and matching ignores case.
pub fn enumerate_files_ignoring_case<S: AsRef<str>>(paths: impl IntoIterator<Item = S>, top_level_only: bool) -> Vec<PathBuf> {
	enumerate_files(paths, top_level_only, true)
}

fn enumerate_files<S: AsRef<str>>(paths: impl IntoIterator<Item = S>, top_level_only: bool, ignore_case: bool) -> Vec<PathBuf> {
	let mut seen_inputs = HashSet::<String>::new();
	let mut seen_outputs = HashSet::<PathBuf>::new();
	let mut result = Vec::<PathBuf>::new();

	for path in paths {
		let path = path.as_ref();
		if path.is_empty() || !seen_inputs.insert(path.to_string()) {
			continue;
		}

		let formatted = fix_path_formatting(path);
		let files = if ignore_case {
			enumerate_single_ignoring_case(&formatted, top_level_only)
		} else {
			enumerate_single(&formatted, top_level_only)
		};
		match files {
			Ok(files) => {
				for f in files {
					if seen_outputs.insert(f.clone()) {
						result.push(f);
					}
				}
			},
			Err(e) => log::warn!("An error occurred while processing path '{}': {}", path, e),
		}
	}

	result
}

fn enumerate_single(formatted: &str, top_level_only: bool) -> std::io::Result<Vec<PathBuf>> {
	if !contains_wildcards(formatted) {
		let p = PathBuf::from(formatted);
		if p.is_file() {
			return Ok(vec![p]);
		}
		if p.is_dir() {
			return walk_files(&p, top_level_only);
		}
		log::trace!("'{}' does not exist, nothing to enumerate", formatted);
		return Ok(vec![]);
	}

	let mut current = Path::new(formatted);
	while contains_wildcards(&current.to_string_lossy()) {
		match current.parent() {
			Some(parent) if parent != current && !parent.as_os_str().is_empty() => current = parent,
			_ => break,
		}
	}

	if contains_wildcards(&current.to_string_lossy()) || !current.is_dir() {
		return Ok(vec![]);
	}

	let files = walk_files(current, top_level_only)?;
	Ok(files.into_iter()
		.filter(|f| wildcard_path_match(&f.to_string_lossy(), formatted))
		.collect())
}

fn enumerate_single_ignoring_case(formatted: &str, top_level_only: bool) -> std::io::Result<Vec<PathBuf>> {
	if !contains_wildcards(formatted) {
		let mut out = Vec::new();
		for variant in find_case_variants(Path::new(formatted)) {
			if variant.is_file() {
				out.push(variant);
			} else if variant.is_dir() {
				out.extend(walk_files(&variant, top_level_only)?);
			}
		}
		return Ok(out);
	}

	let mut current = Path::new(formatted);
	while contains_wildcards(&current.to_string_lossy()) {
		match current.parent() {
			Some(parent) if parent != current && !parent.as_os_str().is_empty() => current = parent,
			_ => break,
		}
	}
	if contains_wildcards(&current.to_string_lossy()) {
		return Ok(vec![]);
	}

	let mut out = Vec::new();
	for variant in find_case_variants(current) {
		if !variant.is_dir() {
			continue;
		}
		/* Matched against the variant's own spelling of the fixed part. */
		let rest = Path::new(formatted).strip_prefix(current).unwrap_or(Path::new(""));
		let pattern = variant.join(rest);
		out.extend(walk_files(&variant, top_level_only)?
			.into_iter()
			.filter(|f| wildcard_path_match_ignoring_case(&f.to_string_lossy(), &pattern.to_string_lossy())));
	}
	Ok(out)
}

/// Every existing path that equals `path` ignoring case, the exact spelling first when it exists.
///
/// Only named segments are compared, roots and `..` are taken as they are.
pub fn find_case_variants(path: &Path) -> Vec<PathBuf> {
	use std::path::Component;

	let mut candidates = vec![PathBuf::new()];
	for component in path.components() {
		let Component::Normal(name) = component else {
			for candidate in &mut candidates {
				candidate.push(component.as_os_str());
			}
			continue;
		};
		let name = name.to_string_lossy();

		let mut next = Vec::new();
		for candidate in &candidates {
			let listing = if candidate.as_os_str().is_empty() { Path::new(".") } else { candidate.as_path() };
			let entries = match std::fs::read_dir(listing) {
				Ok(entries) => entries,
				Err(_) => {
					/* Searchable but not listable, only the exact spelling can be tried. */
					let exact = candidate.join(&*name);
					if exact.exists() {
						next.push(exact);
					}
					continue;
				},
			};

			let mut matches: Vec<String> = entries
				.filter_map(|e| e.ok())
				.map(|e| e.file_name().to_string_lossy().to_string())
				.filter(|entry_name| entry_name.eq_ignore_ascii_case(&name))
				.collect();
			matches.sort_by_key(|entry_name| (*entry_name != name, entry_name.clone()));
			next.extend(matches.into_iter().map(|entry_name| candidate.join(entry_name)));
		}

		if next.is_empty() {
			return next;
		}
		candidates = next;
	}
	candidates
}

fn walk_files(dir: &Path, top_level_only: bool) -> std::io::Result<Vec<PathBuf>> {
	/* Surface a root we can't read as an error instead of an empty result. */
	std::fs::read_dir(dir)?;

	let mut walker = walkdir::WalkDir::new(dir).min_depth(1).sort_by_file_name();
	if top_level_only {
		walker = walker.max_depth(1);
	}

	let mut out = Vec::new();
	for entry in walker {
		let entry = match entry {
			Ok(e) => e,
			Err(e) => {
				/* Unreadable subfolders are skipped, the rest of the walk still counts. */
				log::warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
				continue;
			},
		};
		if entry.file_type().is_file() {
			out.push(entry.into_path());
		}
	}
	Ok(out)
}
