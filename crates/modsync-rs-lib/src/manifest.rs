//! Reading and writing manifest files.
//!
//! A manifest is TOML with one `[[thisMod]]` table per component. Keys are matched
//! case-insensitively, relation lists may be given as a single string, and
//! `overwrite`/`isSelected` accept `"True"`/`"False"` strings as well as booleans.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::component::{Action, Component, Instruction, ModOption};

pub fn load_components(path: impl AsRef<std::path::Path>) -> crate::Result<Vec<Component>> {
	let path = path.as_ref();
	log::info!("Loading components from {}", path.display());
	let text = std::fs::read_to_string(path)?;
	parse_components(&text)
}

pub fn parse_components(text: &str) -> crate::Result<Vec<Component>> {
	let value: toml::Value = toml::from_str(text)?;
	let file: ManifestFile = lowercase_keys(value).try_into()?;

	let mut components = Vec::with_capacity(file.this_mod.len());
	for (i, raw) in file.this_mod.into_iter().enumerate() {
		log::trace!("Deserializing component #{}", i + 1);
		components.push(raw.into_component()?);
	}
	log::debug!("Parsed {} components", components.len());
	Ok(components)
}

pub fn save_components(path: impl AsRef<std::path::Path>, components: &[Component]) -> crate::Result<()> {
	let text = serialize_components(components)?;
	std::fs::write(path, text)?;
	Ok(())
}

pub fn serialize_components(components: &[Component]) -> crate::Result<String> {
	let file = ManifestOut {
		this_mod: components.iter().map(ComponentOut::from).collect(),
	};
	Ok(toml::to_string(&file)?)
}

fn lowercase_keys(value: toml::Value) -> toml::Value {
	match value {
		toml::Value::Table(table) => toml::Value::Table(
			table.into_iter()
				.map(|(k, v)| (k.to_lowercase(), lowercase_keys(v)))
				.collect()
		),
		toml::Value::Array(array) => toml::Value::Array(array.into_iter().map(lowercase_keys).collect()),
		other => other,
	}
}

/* Input */

#[derive(Debug, Deserialize)]
struct ManifestFile {
	#[serde(default, rename = "thismod")]
	this_mod: Vec<RawComponent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
	One(String),
	Many(Vec<String>),
}

impl OneOrMany {
	fn into_vec(self) -> Vec<String> {
		let v = match self {
			OneOrMany::One(s) => vec![s],
			OneOrMany::Many(v) => v,
		};
		v.into_iter().filter(|s| !s.trim().is_empty()).collect()
	}
}

fn strings(value: Option<OneOrMany>) -> Vec<String> {
	value.map(OneOrMany::into_vec).unwrap_or_default()
}

fn guids(value: Option<OneOrMany>, field: &str) -> crate::Result<Vec<Uuid>> {
	strings(value).iter()
		.map(|s| Uuid::parse_str(s.trim()).map_err(|e| crate::Error::Parse(format!("invalid GUID '{}' in `{}`: {}", s, field, e))))
		.collect()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
	Bool(bool),
	Text(String),
}

fn flag(value: Option<Flag>, field: &str) -> crate::Result<bool> {
	match value {
		None => Ok(false),
		Some(Flag::Bool(b)) => Ok(b),
		Some(Flag::Text(s)) => match s.trim().to_lowercase().as_str() {
			"true" => Ok(true),
			"false" | "" => Ok(false),
			_ => Err(crate::Error::Parse(format!("expected true or false for `{}`, got '{}'", field, s))),
		},
	}
}

fn required_guid(value: Option<String>) -> crate::Result<Uuid> {
	let s = value.ok_or(crate::Error::MissingField("guid"))?;
	Uuid::parse_str(s.trim()).map_err(|e| crate::Error::Parse(format!("invalid GUID '{}': {}", s, e)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawComponent {
	name: Option<String>,
	guid: Option<String>,
	author: String,
	description: String,
	directions: String,
	category: String,
	tier: String,
	language: Option<OneOrMany>,
	#[serde(rename = "installationmethod")]
	installation_method: String,
	#[serde(rename = "modlink")]
	mod_link: Option<OneOrMany>,
	#[serde(rename = "isselected")]
	is_selected: Option<Flag>,
	dependencies: Option<OneOrMany>,
	restrictions: Option<OneOrMany>,
	#[serde(rename = "installbefore")]
	install_before: Option<OneOrMany>,
	#[serde(rename = "installafter")]
	install_after: Option<OneOrMany>,
	instructions: Vec<RawInstruction>,
	options: Vec<RawOption>,
}

impl RawComponent {
	fn into_component(self) -> crate::Result<Component> {
		let name = self.name.ok_or(crate::Error::MissingField("name"))?;
		let guid = required_guid(self.guid)?;
		log::trace!("== Deserialize next component '{}' ==", name);

		let mut component = Component {
			guid,
			author: self.author,
			description: self.description,
			directions: self.directions,
			category: self.category,
			tier: self.tier,
			language: strings(self.language),
			installation_method: self.installation_method,
			mod_link: strings(self.mod_link),
			is_selected: flag(self.is_selected, "isselected")?,
			dependencies: guids(self.dependencies, "dependencies")?,
			restrictions: guids(self.restrictions, "restrictions")?,
			install_before: guids(self.install_before, "installbefore")?,
			install_after: guids(self.install_after, "installafter")?,
			instructions: self.instructions.into_iter()
				.map(RawInstruction::into_instruction)
				.collect::<crate::Result<_>>()?,
			name,
			..Default::default()
		};

		for raw in self.options {
			let option = raw.into_option()?;
			if component.options.contains_key(&option.guid) {
				return Err(crate::Error::Parse(format!("option GUID {} used twice in '{}'", option.guid, component.name)));
			}
			component.add_option(option);
		}

		Ok(component)
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawInstruction {
	action: Option<String>,
	source: Option<OneOrMany>,
	destination: Option<String>,
	overwrite: Option<Flag>,
	arguments: String,
	dependencies: Option<OneOrMany>,
	restrictions: Option<OneOrMany>,
}

impl RawInstruction {
	fn into_instruction(self) -> crate::Result<Instruction> {
		Ok(Instruction {
			action: self.action.as_deref().and_then(Action::parse),
			source: strings(self.source),
			destination: self.destination.filter(|d| !d.trim().is_empty()),
			overwrite: flag(self.overwrite, "overwrite")?,
			arguments: self.arguments,
			dependencies: guids(self.dependencies, "dependencies")?,
			restrictions: guids(self.restrictions, "restrictions")?,
		})
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOption {
	name: Option<String>,
	guid: Option<String>,
	description: String,
	source: Option<OneOrMany>,
	destination: Option<String>,
	dependencies: Option<OneOrMany>,
	restrictions: Option<OneOrMany>,
	#[serde(rename = "isselected")]
	is_selected: Option<Flag>,
	instructions: Vec<RawInstruction>,
}

impl RawOption {
	fn into_option(self) -> crate::Result<ModOption> {
		Ok(ModOption {
			name: self.name.ok_or(crate::Error::MissingField("name"))?,
			guid: required_guid(self.guid)?,
			description: self.description,
			source: strings(self.source),
			destination: self.destination.filter(|d| !d.trim().is_empty()),
			dependencies: guids(self.dependencies, "dependencies")?,
			restrictions: guids(self.restrictions, "restrictions")?,
			is_selected: flag(self.is_selected, "isselected")?,
			instructions: self.instructions.into_iter()
				.map(RawInstruction::into_instruction)
				.collect::<crate::Result<_>>()?,
		})
	}
}

/* Output */

#[derive(Debug, Serialize)]
struct ManifestOut {
	#[serde(rename = "thisMod")]
	this_mod: Vec<ComponentOut>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ComponentOut {
	name: String,
	guid: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	author: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	description: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	directions: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	category: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	tier: String,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	language: Vec<String>,
	#[serde(skip_serializing_if = "String::is_empty")]
	installation_method: String,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	mod_link: Vec<String>,
	is_selected: bool,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	dependencies: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	restrictions: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	install_before: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	install_after: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	instructions: Vec<InstructionOut>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	options: Vec<OptionOut>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InstructionOut {
	#[serde(skip_serializing_if = "Option::is_none")]
	action: Option<String>,
	source: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	destination: Option<String>,
	overwrite: bool,
	#[serde(skip_serializing_if = "String::is_empty")]
	arguments: String,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	dependencies: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	restrictions: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct OptionOut {
	name: String,
	guid: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	description: String,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	source: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	destination: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	dependencies: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	restrictions: Vec<String>,
	is_selected: bool,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	instructions: Vec<InstructionOut>,
}

fn guid_strings(guids: &[Uuid]) -> Vec<String> {
	guids.iter().map(|g| g.to_string()).collect()
}

impl From<&Instruction> for InstructionOut {
	fn from(i: &Instruction) -> Self {
		Self {
			action: i.action.as_ref().map(|a| a.to_string()),
			source: i.source.clone(),
			destination: i.destination.clone(),
			overwrite: i.overwrite,
			arguments: i.arguments.clone(),
			dependencies: guid_strings(&i.dependencies),
			restrictions: guid_strings(&i.restrictions),
		}
	}
}

impl From<&ModOption> for OptionOut {
	fn from(o: &ModOption) -> Self {
		Self {
			name: o.name.clone(),
			guid: o.guid.to_string(),
			description: o.description.clone(),
			source: o.source.clone(),
			destination: o.destination.clone(),
			dependencies: guid_strings(&o.dependencies),
			restrictions: guid_strings(&o.restrictions),
			is_selected: o.is_selected,
			instructions: o.instructions.iter().map(InstructionOut::from).collect(),
		}
	}
}

impl From<&Component> for ComponentOut {
	fn from(c: &Component) -> Self {
		Self {
			name: c.name.clone(),
			guid: c.guid.to_string(),
			author: c.author.clone(),
			description: c.description.clone(),
			directions: c.directions.clone(),
			category: c.category.clone(),
			tier: c.tier.clone(),
			language: c.language.clone(),
			installation_method: c.installation_method.clone(),
			mod_link: c.mod_link.clone(),
			is_selected: c.is_selected,
			dependencies: guid_strings(&c.dependencies),
			restrictions: guid_strings(&c.restrictions),
			install_before: guid_strings(&c.install_before),
			install_after: guid_strings(&c.install_after),
			instructions: c.instructions.iter().map(InstructionOut::from).collect(),
			options: c.options.values().map(OptionOut::from).collect(),
		}
	}
}
