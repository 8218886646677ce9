use modsync_rs::path_helper::*;

#[test]
fn wildcard_segments() {
	assert!(wildcard_path_match("a/b/c.txt", "a/*/c.txt"));
	assert!(!wildcard_path_match("a/b/c.txt", "a/*/d.txt"));
	assert!(!wildcard_path_match("a/b/c", "a/b"));
	assert!(wildcard_path_match("mod/Override/x.tpc", "mod/Override/*.tpc"));
	assert!(wildcard_path_match("mod/file1.2da", "mod/file?.2da"));
	assert!(!wildcard_path_match("mod/file12.2da", "mod/file?.2da"));
}

#[test]
fn star_does_not_cross_separators() {
	assert!(!wildcard_path_match("a/b/c.txt", "a/*"));
	assert!(wildcard_path_match("a/b", "a/*"));
}

#[test]
fn mixed_separators_match() {
	assert!(wildcard_path_match("a\\b\\c.txt", "a/b/*.txt"));
	assert!(wildcard_path_match("a//b/c.txt", "a/b/c.txt"));
}

#[test]
fn regex_characters_are_literal() {
	assert!(wildcard_match("file(1).txt", "file(1).txt"));
	assert!(!wildcard_match("fileX1Ytxt", "file(1).txt"));
	assert!(wildcard_match("a+b.2da", "a+*.2da"));
}

#[test]
fn formatting() {
	assert_eq!(fix_path_formatting("a\\b//c/"), "a/b/c");
	assert_eq!(fix_path_formatting("<<modDirectory>>\\mod\\file.tga"), "<<modDirectory>>/mod/file.tga");
	assert_eq!(fix_path_formatting("   "), "   ");
	assert_eq!(fix_path_formatting("/"), "/");
}

#[test]
fn folder_names() {
	assert_eq!(get_folder_name("mod/Override/file.tga"), "mod/Override");
	assert_eq!(get_folder_name("mod/Override"), "mod/Override");
}

#[test]
fn path_validity() {
	assert!(is_valid_path("mods/Some Mod/file.tga"));
	assert!(!is_valid_path(""));
	assert!(!is_valid_path("mods/file*.tga"));
	assert!(!is_valid_path("mods/CON.txt"));
	assert!(!is_valid_path("mods/trailing "));
}

#[test]
fn enumerates_literal_and_wildcard_paths() {
	let dir = tempfile::tempdir().unwrap();
	let root = dir.path();
	std::fs::create_dir_all(root.join("mod/Override/nested")).unwrap();
	std::fs::write(root.join("mod/Override/a.tga"), b"a").unwrap();
	std::fs::write(root.join("mod/Override/b.tpc"), b"b").unwrap();
	std::fs::write(root.join("mod/Override/nested/c.tga"), b"c").unwrap();

	let root_str = root.to_string_lossy().to_string();
	let tgas = enumerate_files_with_wildcards([format!("{}/mod/Override/*.tga", root_str)], false);
	assert_eq!(tgas, vec![root.join("mod/Override/a.tga")]);

	let all = enumerate_files_with_wildcards([format!("{}/mod/Override", root_str)], false);
	assert_eq!(all.len(), 3);

	let top = enumerate_files_with_wildcards([format!("{}/mod/Override", root_str)], true);
	assert_eq!(top.len(), 2);

	let literal = root.join("mod/Override/b.tpc").to_string_lossy().to_string();
	let deduped = enumerate_files_with_wildcards([literal.clone(), literal], false);
	assert_eq!(deduped, vec![root.join("mod/Override/b.tpc")]);

	let missing = enumerate_files_with_wildcards([format!("{}/nothing/*.tga", root_str)], false);
	assert!(missing.is_empty());
}

#[test]
fn ignoring_case_matches_any_spelling() {
	assert!(wildcard_path_match_ignoring_case("Mod/Override/X.TPC", "mod/override/*.tpc"));
	assert!(!wildcard_path_match("Mod/Override/X.TPC", "mod/override/*.tpc"));
	assert!(!wildcard_path_match_ignoring_case("mod/Override/x.tpc", "mod/*.tpc"));
}

/* Folders differing only in case can't coexist on a case insensitive filesystem. */
#[cfg(target_os = "linux")]
#[test]
fn enumerates_folders_differing_in_case() {
	let dir = tempfile::tempdir().unwrap();
	let root = dir.path();
	std::fs::create_dir_all(root.join("mod/Override")).unwrap();
	std::fs::create_dir_all(root.join("mod/override")).unwrap();
	std::fs::write(root.join("mod/Override/a.tga"), b"a").unwrap();
	std::fs::write(root.join("mod/override/B.TGA"), b"b").unwrap();
	std::fs::write(root.join("mod/override/c.tpc"), b"c").unwrap();

	let root_str = root.to_string_lossy().to_string();
	let pattern = format!("{}/mod/OVERRIDE/*.tga", root_str);
	assert!(enumerate_files_with_wildcards([pattern.as_str()], false).is_empty());
	assert_eq!(
		enumerate_files_ignoring_case([pattern.as_str()], false),
		vec![root.join("mod/Override/a.tga"), root.join("mod/override/B.TGA")]
	);

	let literal = format!("{}/MOD/override/b.tga", root_str);
	assert_eq!(enumerate_files_ignoring_case([literal.as_str()], false), vec![root.join("mod/override/B.TGA")]);

	let folder = format!("{}/mod/OVERRIDE", root_str);
	assert_eq!(enumerate_files_ignoring_case([folder.as_str()], true).len(), 3);

	assert_eq!(
		find_case_variants(&root.join("mod/override")),
		vec![root.join("mod/override"), root.join("mod/Override")]
	);
	assert!(find_case_variants(&root.join("mod/missing")).is_empty());
}
