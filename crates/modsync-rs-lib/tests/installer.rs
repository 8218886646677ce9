use std::collections::VecDeque;

use modsync_rs::component::{Action, ModOption};
use modsync_rs::installer::*;
use modsync_rs::{Component, ModSyncOptions};
use modsync_rs_test_utils::{component, instruction, TestEnvironment};

/// Answers prompts from a script and records what it was asked.
#[derive(Default)]
struct Scripted {
	answers: VecDeque<Option<bool>>,
	confirm: bool,
	prompts: Vec<String>,
	confirmations: Vec<String>,
	informed: Vec<String>,
}

impl Scripted {
	fn answering(answers: &[Option<bool>]) -> Self {
		Self { answers: answers.iter().copied().collect(), ..Default::default() }
	}
}

impl InstallCallbacks for Scripted {
	fn prompt_install_error(&mut self, message: &str) -> Option<bool> {
		self.prompts.push(message.to_string());
		self.answers.pop_front().unwrap_or(None)
	}

	fn confirm(&mut self, message: &str) -> bool {
		self.confirmations.push(message.to_string());
		self.confirm
	}

	fn inform(&mut self, message: &str) {
		self.informed.push(message.to_string());
	}
}

fn install(c: &Component, env: &TestEnvironment, callbacks: &mut Scripted) -> InstallExitCode {
	let roster = vec![c.clone()];
	let options = env.options().unwrap();
	install_component(&roster[0], &roster, &options, callbacks).unwrap()
}

fn init_logging() {
	let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn extract_then_move_wildcards() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	env.add_zip("mymod.zip", &[("Override/a.tga", "a"), ("Override/b.tga", "b"), ("readme.txt", "read me")]).unwrap();

	let mut c = component("My Mod");
	c.instructions.push(instruction(Action::Extract, &["<<modDirectory>>/mymod.zip"], None));
	c.instructions.push(instruction(Action::Move, &["<<modDirectory>>/mymod/Override/*.tga"], Some("<<kotorDirectory>>/Override")));

	let mut callbacks = Scripted::default();
	assert_eq!(install(&c, &env, &mut callbacks), InstallExitCode::Success);
	assert!(callbacks.prompts.is_empty());

	assert_eq!(std::fs::read_to_string(env.override_directory().join("a.tga")).unwrap(), "a");
	assert_eq!(std::fs::read_to_string(env.override_directory().join("b.tga")).unwrap(), "b");
	assert!(!env.mod_directory().join("mymod/Override/a.tga").exists());
	assert!(env.mod_directory().join("mymod/readme.txt").is_file());
	assert!(!env.override_directory().join("readme.txt").exists());
}

#[test]
fn copy_respects_overwrite() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	env.add_mod_file("mymod/a.tga", b"new").unwrap();
	env.add_game_file("Override/a.tga", b"old").unwrap();

	let mut c = component("Copier");
	c.instructions.push(instruction(Action::Copy, &["<<modDirectory>>/mymod/a.tga"], Some("<<kotorDirectory>>/Override")));
	assert_eq!(install(&c, &env, &mut Scripted::default()), InstallExitCode::Success);
	assert_eq!(std::fs::read_to_string(env.override_directory().join("a.tga")).unwrap(), "old");

	c.instructions[0].overwrite = true;
	assert_eq!(install(&c, &env, &mut Scripted::default()), InstallExitCode::Success);
	assert_eq!(std::fs::read_to_string(env.override_directory().join("a.tga")).unwrap(), "new");
	assert!(env.mod_directory().join("mymod/a.tga").is_file());
}

#[test]
fn failures_prompt_for_retry_skip_or_abort() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	let mut c = component("Deleter");
	c.instructions.push(instruction(Action::Delete, &["<<kotorDirectory>>/Override/missing.tga"], None));
	c.instructions.push(instruction(Action::Inform, &["done"], None));

	let mut skip = Scripted::answering(&[Some(true), Some(false)]);
	assert_eq!(install(&c, &env, &mut skip), InstallExitCode::Success);
	assert_eq!(skip.prompts.len(), 2);
	assert!(skip.prompts[0].contains("'Deleter'"));
	assert!(skip.prompts[0].contains(ActionExitCode::FileNotFoundPost.description()));
	assert_eq!(skip.informed, vec!["done".to_string()]);

	let mut abort = Scripted::answering(&[None]);
	assert_eq!(install(&c, &env, &mut abort), InstallExitCode::UserCancelledInstall);
	assert!(abort.informed.is_empty());
}

#[test]
fn conflicts_skip_components_and_instructions() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	let options = env.options().unwrap();
	env.add_game_file("Override/a.tga", b"a").unwrap();

	let mut unselected = component("Unselected");
	unselected.is_selected = false;

	let mut needs = component("Needs Unselected");
	needs.dependencies = vec![unselected.guid];
	needs.instructions.push(instruction(Action::Delete, &["<<kotorDirectory>>/Override/a.tga"], None));

	let mut partly = component("Partly");
	let mut guarded = instruction(Action::Delete, &["<<kotorDirectory>>/Override/a.tga"], None);
	guarded.dependencies = vec![unselected.guid];
	partly.instructions.push(guarded);

	let roster = vec![needs, partly, unselected];
	let mut callbacks = Scripted::default();
	assert_eq!(install_component(&roster[0], &roster, &options, &mut callbacks).unwrap(), InstallExitCode::DependencyViolation);
	assert_eq!(install_component(&roster[1], &roster, &options, &mut callbacks).unwrap(), InstallExitCode::Success);
	assert!(env.override_directory().join("a.tga").is_file());
	assert!(callbacks.prompts.is_empty());
}

#[test]
fn missing_directories_are_errors() {
	init_logging();
	let c = component("Anything");
	let roster = vec![c];
	let result = install_component(&roster[0], &roster, &ModSyncOptions::default(), &mut Scripted::default());
	assert!(matches!(result, Err(modsync_rs::Error::DirectoryNotSet(_))));
}

#[test]
fn rename_keeps_existing_targets() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	env.add_game_file("Override/a.tga", b"a").unwrap();
	env.add_game_file("Override/b.tga", b"b").unwrap();

	let mut c = component("Renamer");
	c.instructions.push(instruction(Action::Rename, &["<<kotorDirectory>>/Override/a.tga"], Some("b.tga")));

	let mut callbacks = Scripted::answering(&[Some(false)]);
	assert_eq!(install(&c, &env, &mut callbacks), InstallExitCode::Success);
	assert!(callbacks.prompts[0].contains(ActionExitCode::RenameTargetAlreadyExists.description()));
	assert_eq!(std::fs::read_to_string(env.override_directory().join("b.tga")).unwrap(), "b");

	c.instructions[0].overwrite = true;
	assert_eq!(install(&c, &env, &mut Scripted::default()), InstallExitCode::Success);
	assert_eq!(std::fs::read_to_string(env.override_directory().join("b.tga")).unwrap(), "a");
	assert!(!env.override_directory().join("a.tga").exists());
}

#[test]
fn delete_duplicate_textures() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	env.add_game_file("Override/a.tga", b"a").unwrap();
	env.add_game_file("Override/A.tpc", b"a").unwrap();
	env.add_game_file("Override/b.tpc", b"b").unwrap();

	let mut c = component("Dedup");
	let mut dedup = instruction(Action::DelDuplicate, &[], Some("<<kotorDirectory>>/Override"));
	dedup.arguments = ".tpc".to_string();
	c.instructions.push(dedup);

	assert_eq!(install(&c, &env, &mut Scripted::default()), InstallExitCode::Success);
	assert!(env.override_directory().join("a.tga").is_file());
	assert!(!env.override_directory().join("A.tpc").exists());
	assert!(env.override_directory().join("b.tpc").is_file());
}

#[test]
fn choose_runs_selected_options() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	env.add_mod_file("opts/hd.tga", b"hd").unwrap();
	env.add_mod_file("opts/sd.tga", b"sd").unwrap();
	env.add_mod_file("opts/extra.2da", b"2da").unwrap();

	let mut c = component("Chooser");

	let mut hd = ModOption::new("HD", uuid::Uuid::new_v4());
	hd.is_selected = true;
	hd.source = vec!["<<modDirectory>>/opts/hd.tga".to_string()];
	hd.destination = Some("<<kotorDirectory>>/Override".to_string());

	let mut sd = ModOption::new("SD", uuid::Uuid::new_v4());
	sd.source = vec!["<<modDirectory>>/opts/sd.tga".to_string()];
	sd.destination = Some("<<kotorDirectory>>/Override".to_string());

	let mut extra = ModOption::new("Extra", uuid::Uuid::new_v4());
	extra.is_selected = true;
	extra.instructions.push(instruction(Action::Copy, &["<<modDirectory>>/opts/extra.2da"], Some("<<kotorDirectory>>/Override")));

	let guids = [hd.guid.to_string(), sd.guid.to_string(), extra.guid.to_string()];
	c.add_option(hd);
	c.add_option(sd);
	c.add_option(extra);
	c.instructions.push(instruction(Action::Choose, &[guids[0].as_str(), guids[1].as_str(), guids[2].as_str()], None));

	assert_eq!(install(&c, &env, &mut Scripted::default()), InstallExitCode::Success);
	assert!(env.override_directory().join("hd.tga").is_file());
	assert!(!env.mod_directory().join("opts/hd.tga").exists());
	assert!(!env.override_directory().join("sd.tga").exists());
	assert!(env.override_directory().join("extra.2da").is_file());
	assert!(env.mod_directory().join("opts/extra.2da").is_file());

	let unknown = uuid::Uuid::new_v4().to_string();
	c.instructions[0] = instruction(Action::Choose, &[unknown.as_str()], None);
	assert_eq!(install(&c, &env, &mut Scripted::default()), InstallExitCode::InvalidOperation);
}

#[test]
fn confirm_and_inform_use_callbacks() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	let mut c = component("Chatty");
	c.instructions.push(instruction(Action::Inform, &["Files go in <<kotorDirectory>>"], None));
	c.instructions.push(instruction(Action::Confirm, &["Continue?"], None));

	let mut accept = Scripted { confirm: true, ..Default::default() };
	assert_eq!(install(&c, &env, &mut accept), InstallExitCode::Success);
	assert_eq!(accept.informed, vec![format!("Files go in {}", env.kotor_directory().display())]);
	assert_eq!(accept.confirmations, vec!["Continue?".to_string()]);

	let mut decline = Scripted::answering(&[None]);
	assert_eq!(install(&c, &env, &mut decline), InstallExitCode::UserCancelledInstall);
	assert!(decline.prompts[0].contains(ActionExitCode::UserDeclined.description()));
}

#[test]
fn unknown_and_invalid_inputs_fail() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	env.add_mod_file("notes.txt", b"not an archive").unwrap();
	env.add_mod_file("broken.zip", b"not a zip either").unwrap();

	let mut c = component("Broken");
	c.instructions.push(instruction(Action::Unknown("frobnicate".to_string()), &["x"], None));
	c.instructions.push(instruction(Action::Extract, &["<<modDirectory>>/notes.txt"], None));
	c.instructions.push(instruction(Action::Extract, &["<<modDirectory>>/broken.zip"], None));

	let mut callbacks = Scripted::answering(&[Some(false), Some(false), Some(false)]);
	assert_eq!(install(&c, &env, &mut callbacks), InstallExitCode::Success);
	assert_eq!(callbacks.prompts.len(), 3);
	assert!(callbacks.prompts[0].contains(ActionExitCode::UnknownInstruction.description()));
	assert!(callbacks.prompts[1].contains(ActionExitCode::InvalidArchive.description()));
	assert!(callbacks.prompts[2].contains(ActionExitCode::ArchiveParseError.description()));
}

#[test]
fn backup_copies_into_game_directory() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	env.add_game_file("Override/a.tga", b"a").unwrap();

	let mut c = component("Backer");
	c.instructions.push(instruction(Action::Backup, &["<<kotorDirectory>>/Override/a.tga"], None));

	assert_eq!(install(&c, &env, &mut Scripted::default()), InstallExitCode::Success);
	assert!(env.kotor_directory().join("backup/a.tga").is_file());
	assert!(env.override_directory().join("a.tga").is_file());
}

#[test]
fn patcher_log_errors_are_found() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	let patcher = env.add_mod_file("patch/installlog.txt", b"Installing...\n[Error] Unable to find 2DA\nDone. Error: 1 error(s)\n").unwrap();
	let directory = patcher.parent().unwrap();

	let errors = actions::install_log_errors(directory).unwrap().unwrap();
	assert_eq!(errors.len(), 2);

	std::fs::remove_file(&patcher).unwrap();
	assert!(actions::install_log_errors(directory).unwrap().is_none());
}

#[test]
fn install_all_follows_order_and_skips_conflicts() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	let options = env.options().unwrap();

	let mut first = component("First");
	first.instructions.push(instruction(Action::Inform, &["first"], None));
	let mut blocked = component("Blocked");
	blocked.restrictions = vec![first.guid];
	blocked.instructions.push(instruction(Action::Inform, &["blocked"], None));
	let mut second = component("Second");
	second.instructions.push(instruction(Action::Inform, &["second"], None));

	let roster = vec![first, blocked, second];
	let order: Vec<&Component> = vec![&roster[2], &roster[1], &roster[0]];
	let mut callbacks = Scripted::default();
	assert_eq!(install_all(&order, &roster, &options, &mut callbacks).unwrap(), InstallExitCode::Success);
	assert_eq!(callbacks.informed, vec!["second".to_string(), "first".to_string()]);
}

#[cfg(unix)]
#[test]
fn delete_works_with_relative_directories() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	let file = env.add_mod_file("a.tga", b"a").unwrap();

	let cwd = std::env::current_dir().unwrap();
	let mut relative = std::path::PathBuf::new();
	for _ in 1..cwd.components().count() {
		relative.push("..");
	}
	let relative = relative.join(env.mod_directory().strip_prefix("/").unwrap());

	let mut options = env.options().unwrap();
	assert!(options.set_mod_directory(relative));

	let mut c = component("Relative Deleter");
	c.instructions.push(instruction(Action::Delete, &["<<modDirectory>>/a.tga"], None));
	let roster = vec![c];
	let mut callbacks = Scripted::default();
	assert_eq!(install_component(&roster[0], &roster, &options, &mut callbacks).unwrap(), InstallExitCode::Success);
	assert!(callbacks.prompts.is_empty());
	assert!(!file.exists());
}

#[test]
fn prepared_mod_folder_moves_into_override() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	let prepared = env.root().join("prepared").join("mymod");
	std::fs::create_dir_all(prepared.join("Override")).unwrap();
	std::fs::write(prepared.join("Override").join("a.tga"), "a").unwrap();
	env.copy_into_mods(&prepared).unwrap();
	assert!(env.mod_directory().join("mymod/Override/a.tga").is_file());

	let mut c = component("Prepared");
	c.instructions.push(instruction(Action::Move, &["<<modDirectory>>/mymod/Override/*"], Some("<<kotorDirectory>>/Override")));
	assert_eq!(install(&c, &env, &mut Scripted::default()), InstallExitCode::Success);
	assert_eq!(std::fs::read_to_string(env.override_directory().join("a.tga")).unwrap(), "a");
	assert!(!env.mod_directory().join("mymod/Override/a.tga").exists());
}

#[test]
fn case_insensitive_pathing_finds_differently_cased_sources() {
	init_logging();
	let env = TestEnvironment::new().unwrap();
	env.add_mod_file("mymod/Override/a.tga", b"a").unwrap();
	env.add_mod_file("mymod/Readme.txt", b"read me").unwrap();

	let mut c = component("Wrong Case");
	c.instructions.push(instruction(Action::Move, &["<<modDirectory>>/MyMod/override/*.TGA"], Some("<<kotorDirectory>>/Override")));
	c.instructions.push(instruction(Action::Delete, &["<<modDirectory>>/mymod/README.TXT"], None));
	let roster = vec![c];

	let mut options = env.options().unwrap();
	options.set_case_insensitive_pathing(true);
	let mut callbacks = Scripted::default();
	assert_eq!(install_component(&roster[0], &roster, &options, &mut callbacks).unwrap(), InstallExitCode::Success);
	assert!(callbacks.prompts.is_empty(), "{:?}", callbacks.prompts);
	assert_eq!(std::fs::read_to_string(env.override_directory().join("a.tga")).unwrap(), "a");
	assert!(!env.mod_directory().join("mymod/Readme.txt").exists());
}
