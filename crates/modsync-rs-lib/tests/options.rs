use modsync_rs::ModSyncOptions;
use modsync_rs_test_utils::TestEnvironment;

#[test]
fn defaults() {
	let options = ModSyncOptions::default();
	assert!(options.attempt_fixes());
	assert!(!options.case_insensitive_pathing());
	assert!(options.is_exempt("Improved AI"));
	assert!(options.mod_directory().is_none());
	assert_eq!(options.replace_custom_variables("<<modDirectory>>/a.zip"), "<<modDirectory>>/a.zip");
}

#[test]
fn directories_must_exist() {
	let env = TestEnvironment::new().unwrap();
	let mut options = ModSyncOptions::default();
	assert!(!options.set_mod_directory(env.mod_directory().join("nope")));
	assert!(options.set_mod_directory(env.mod_directory()));
	assert_eq!(options.mod_directory(), Some(env.mod_directory().as_path()));
}

#[test]
fn placeholders_round_trip() {
	let env = TestEnvironment::new().unwrap();
	let options = env.options().unwrap();

	let real = options.replace_custom_variables("<<kotorDirectory>>/Override/a.tga");
	assert_eq!(real, format!("{}/Override/a.tga", env.kotor_directory().display()));
	assert_eq!(options.restore_custom_variables(&real), "<<kotorDirectory>>/Override/a.tga");
}

#[test]
fn loads_from_file() {
	let env = TestEnvironment::new().unwrap();
	let path = env.add_mod_file("options.toml", format!(
		"mod_directory = {:?}\nkotor_directory = \"/definitely/not/here\"\nattempt_fixes = false\ncase_insensitive_pathing = true\nexempt_components = []\n",
		env.mod_directory().to_string_lossy()
	).as_bytes()).unwrap();

	let options = ModSyncOptions::load_from_file(&path).unwrap();
	assert_eq!(options.mod_directory(), Some(env.mod_directory().as_path()));
	assert!(options.kotor_directory().is_none());
	assert!(!options.attempt_fixes());
	assert!(options.case_insensitive_pathing());
	assert!(!options.is_exempt("Improved AI"));
}

#[test]
fn exemptions_ignore_case() {
	let mut options = ModSyncOptions::default();
	assert!(options.is_exempt("improved ai"));
	assert!(options.is_exempt("IMPROVED AI"));
	assert!(!options.is_exempt("Improved AI 2"));

	options.set_exempt_components(vec!["Some Mod".to_string()]);
	assert!(options.is_exempt("some mod"));
	assert!(!options.is_exempt("improved ai"));
}

/// `path` written relative to the working directory.
#[cfg(unix)]
fn relative_to_cwd(path: &std::path::Path) -> std::path::PathBuf {
	let cwd = std::env::current_dir().unwrap();
	let mut relative = std::path::PathBuf::new();
	for _ in 1..cwd.components().count() {
		relative.push("..");
	}
	relative.join(path.strip_prefix("/").unwrap())
}

#[cfg(unix)]
#[test]
fn relative_directories_are_stored_absolute() {
	let env = TestEnvironment::new().unwrap();
	let relative = relative_to_cwd(&env.mod_directory());
	assert!(relative.is_relative());

	let mut options = ModSyncOptions::default();
	assert!(options.set_mod_directory(relative));
	assert!(options.mod_directory().unwrap().is_absolute());
	assert_eq!(options.mod_directory(), Some(env.mod_directory().as_path()));
	assert_eq!(
		options.replace_custom_variables("<<modDirectory>>/a.tga"),
		format!("{}/a.tga", env.mod_directory().display())
	);
}
