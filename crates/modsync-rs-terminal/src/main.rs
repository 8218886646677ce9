use std::io::Write;

use modsync_rs::installer::{InstallCallbacks, InstallExitCode};
use modsync_rs::validation::{ComponentValidation, ValidationResult};
use modsync_rs::{Component, ModSyncOptions};

fn main() {
	let mut opts;

	/* Parse console input */
	let parsed_options = {
		let args: Vec<String> = std::env::args().collect();

		opts = getopts::Options::new();
		opts.optflag( "h", "help",       "Show help");
		opts.optflag( "v", "verbose",    "Increased vebosity");
		opts.optopt(  "",  "mods",       "Directory holding the mod archives", "DIR");
		opts.optopt(  "",  "game",       "KOTOR install directory", "DIR");
		opts.optopt(  "",  "config",     "Options file", "FILE");
		opts.optflag( "",  "fix",        "Apply proposed fixes and save the manifest");
		opts.optflag( "",  "json",       "Print validation findings as JSON");
		opts.optflag( "",  "ignore-case", "Match source paths regardless of case");
		opts.parsing_style(getopts::ParsingStyle::FloatingFrees);

		let parsed_options = match opts.parse(&args[1..]) {
			Ok(m)  => { m }
			Err(e) => { println!("Unable to parse options: {}", e); return }
		};

		if parsed_options.opt_present("h") {
			eprintln!("{}", opts.usage("Usage: modsync <validate|order|install> <manifest.toml> [options]"));
			return;
		}

		parsed_options
	};

	let level = if parsed_options.opt_present("v") { log::LevelFilter::Debug } else { log::LevelFilter::Info };
	env_logger::Builder::from_default_env().filter_level(level).init();

	let options = match load_options(&parsed_options) {
		Ok(o) => o,
		Err(e) => { log::error!("Failed to set up options: {}", e); return },
	};

	let (command, manifest) = match (parsed_options.free.first(), parsed_options.free.get(1)) {
		(Some(c), Some(m)) => (c.as_str(), std::path::PathBuf::from(m)),
		_ => { log::error!("A command and a manifest path are required."); eprintln!("{}", opts.usage("")); return },
	};

	let result = match command {
		"validate" => validate(&options, &manifest, parsed_options.opt_present("fix"), parsed_options.opt_present("json")).map(|_| ()),
		"order" => order(&manifest),
		"install" => install(&options, &manifest),
		other => { log::error!("Unknown command `{}`", other); return },
	};

	if let Err(e) = result {
		log::error!("{}", e);
		std::process::exit(1);
	}
}

fn load_options(parsed_options: &getopts::Matches) -> Result<ModSyncOptions, Error> {
	let mut options = match parsed_options.opt_str("config") {
		Some(path) => ModSyncOptions::load_from_file(path)?,
		None => ModSyncOptions::default(),
	};

	if let Some(dir) = parsed_options.opt_str("mods") {
		if !options.set_mod_directory(dir.clone().into()) {
			return Err(Error::InvalidDirectory(dir));
		}
	}
	if let Some(dir) = parsed_options.opt_str("game") {
		if !options.set_kotor_directory(dir.clone().into()) {
			return Err(Error::InvalidDirectory(dir));
		}
	}
	if parsed_options.opt_present("ignore-case") {
		options.set_case_insensitive_pathing(true);
	}
	Ok(options)
}

/// Returns true when no selected component has errors.
fn validate(options: &ModSyncOptions, manifest: &std::path::Path, fix: bool, json: bool) -> Result<bool, Error> {
	let mut components = modsync_rs::manifest::load_components(manifest)?;

	let mut findings = Vec::<ValidationResult>::new();
	let mut fixes = Vec::new();
	let mut valid = true;
	for (i, component) in components.iter().enumerate().filter(|(_, c)| c.is_selected) {
		let mut validation = ComponentValidation::new(component, &components, options);
		if !validation.run() {
			valid = false;
		}
		findings.extend(validation.results().iter().cloned());
		fixes.push((i, validation.proposed_fixes()));
	}

	if json {
		println!("{}", serde_json::to_string_pretty(&findings)?);
	} else {
		for finding in &findings {
			let level = if finding.is_error { "error" } else { "warning" };
			let place = finding.location.as_ref().map(|l| l.to_string()).unwrap_or_else(|| "Component".to_string());
			println!("{}: '{}' {}: {}", level, finding.component, place, finding.message);
		}
		println!("{} errors, {} warnings", findings.iter().filter(|f| f.is_error).count(), findings.iter().filter(|f| !f.is_error).count());
	}

	if fix {
		let mut applied = 0;
		for (i, patches) in fixes {
			applied += modsync_rs::validation::apply_fixes(&mut components[i], &patches);
		}
		if applied > 0 {
			modsync_rs::manifest::save_components(manifest, &components)?;
			println!("Applied {} fixes to {}", applied, manifest.display());
		}
	}

	Ok(valid)
}

fn order(manifest: &std::path::Path) -> Result<(), Error> {
	let components = modsync_rs::manifest::load_components(manifest)?;
	let (correct, ordered) = modsync_rs::install_order::confirm_components_install_order(&components)?;

	if correct {
		println!("Install order is correct.");
	} else {
		println!("Install order should be:");
	}
	for (i, component) in ordered.iter().enumerate() {
		println!("\t{}) {}", i + 1, component);
	}
	Ok(())
}

fn install(options: &ModSyncOptions, manifest: &std::path::Path) -> Result<(), Error> {
	if !validate(options, manifest, false, false)? {
		log::error!("Validation failed, fix the errors above before installing.");
		return Err(Error::ValidationFailed);
	}

	let components = modsync_rs::manifest::load_components(manifest)?;
	let (_, ordered) = modsync_rs::install_order::confirm_components_install_order(&components)?;
	let selected: Vec<&Component> = ordered.into_iter().filter(|c| c.is_selected).collect();

	println!("Installing:");
	for component in &selected {
		println!("\t{}", component);
	}
	if !ask("Continue? [(y)/n] ", true) {
		return Err(Error::UserCancelled);
	}

	let mut callbacks = TerminalCallbacks;
	match modsync_rs::installer::install_all(&selected, &components, options, &mut callbacks)? {
		InstallExitCode::Success => {
			log::info!("Installed {} components succesfully.", selected.len());
			Ok(())
		},
		InstallExitCode::UserCancelledInstall => Err(Error::UserCancelled),
		code => Err(Error::Install(code)),
	}
}

/// Asks a y/n question on stdin, an empty answer gives `default`.
fn ask(question: &str, default: bool) -> bool {
	let stdin = std::io::stdin();
	print!("{}", question);
	let _ = std::io::stdout().flush();
	loop {
		let mut input = String::new();
		if stdin.read_line(&mut input).is_err() {
			return false;
		}
		let input = input.trim().to_lowercase();
		if input.is_empty() {
			return default;
		} else if input == "y" {
			return true;
		} else if input == "n" {
			return false;
		} else {
			print!("\nInput invalid. {}", question);
			let _ = std::io::stdout().flush();
		}
	}
}

struct TerminalCallbacks;

impl InstallCallbacks for TerminalCallbacks {
	fn prompt_install_error(&mut self, message: &str) -> Option<bool> {
		println!("{}", message);
		let stdin = std::io::stdin();
		print!("(r)etry, (s)kip or (a)bort? ");
		let _ = std::io::stdout().flush();
		loop {
			let mut input = String::new();
			if stdin.read_line(&mut input).is_err() {
				return None;
			}
			match input.trim().to_lowercase().as_str() {
				"r" => return Some(true),
				"s" => return Some(false),
				"a" => return None,
				_ => {
					print!("\nInput invalid. (r)etry, (s)kip or (a)bort? ");
					let _ = std::io::stdout().flush();
				},
			}
		}
	}

	fn confirm(&mut self, message: &str) -> bool {
		println!("{}", message);
		ask("Continue? [(y)/n] ", true)
	}

	fn inform(&mut self, message: &str) {
		println!("{}", message);
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("ModSync-rs error: {0}")]
	ModSyncError(#[from] modsync_rs::Error),
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
	#[error("`{0}` is not a directory")]
	InvalidDirectory(String),
	#[error("Validation failed")]
	ValidationFailed,
	#[error("Install failed: {0}")]
	Install(InstallExitCode),
	#[error("User cancelled an action")]
	UserCancelled,
}
