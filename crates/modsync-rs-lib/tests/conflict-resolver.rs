use modsync_rs::component::{Action, ModOption};
use modsync_rs::conflict_resolver::*;
use modsync_rs::install_order::confirm_components_install_order;
use modsync_rs::Component;
use modsync_rs_test_utils::{component, instruction};

#[test]
fn unselected_dependency_conflicts() {
	let mut y = component("Y");
	y.is_selected = false;
	let mut x = component("X");
	x.dependencies = vec![y.guid];
	let roster = vec![x.clone(), y.clone()];

	let conflicts = x.get_conflicts(&roster, false);
	assert_eq!(conflicts.len(), 1);
	assert_eq!(conflicts[&ConflictKind::Dependency][0].guid, y.guid);
	assert!(!x.should_install_component(&roster, false));
}

#[test]
fn selected_restriction_conflicts() {
	let y = component("Y");
	let mut x = component("X");
	x.restrictions = vec![y.guid];
	let roster = vec![x.clone(), y.clone()];

	let conflicts = x.get_conflicts(&roster, true);
	assert_eq!(conflicts[&ConflictKind::Restriction][0].name, "Y");
	assert!(!conflicts.contains_key(&ConflictKind::Dependency));
}

#[test]
fn satisfied_relations_have_no_conflicts() {
	let y = component("Y");
	let mut z = component("Z");
	z.is_selected = false;
	let mut x = component("X");
	x.dependencies = vec![y.guid];
	x.restrictions = vec![z.guid];
	let roster = vec![x.clone(), y, z];

	assert!(x.get_conflicts(&roster, false).is_empty());
	assert!(x.should_install_component(&roster, false));
}

#[test]
fn unknown_guids_are_ignored() {
	let mut x = component("X");
	x.dependencies = vec![uuid::Uuid::new_v4()];
	x.restrictions = vec![uuid::Uuid::new_v4()];
	let roster = vec![x.clone()];

	assert!(get_conflicting_components(&x.dependencies, &x.restrictions, &roster, true).is_empty());
}

#[test]
fn instructions_and_options_use_their_own_relations() {
	let mut y = component("Y");
	y.is_selected = false;
	let x = component("X");
	let roster = vec![x, y.clone()];

	let mut needs_y = instruction(Action::Copy, &["<<modDirectory>>/a.tga"], Some("<<kotorDirectory>>/Override"));
	needs_y.dependencies = vec![y.guid];
	assert!(!Component::should_run_instruction(&needs_y, &roster, false));

	let mut avoids_y = instruction(Action::Copy, &["<<modDirectory>>/a.tga"], Some("<<kotorDirectory>>/Override"));
	avoids_y.restrictions = vec![y.guid];
	assert!(Component::should_run_instruction(&avoids_y, &roster, false));

	let mut option = ModOption::new("Option", uuid::Uuid::new_v4());
	option.dependencies = vec![y.guid];
	assert!(!Component::should_run_option(&option, &roster, false));
}

#[test]
fn restricted_component_is_skipped_while_order_holds() {
	let a = component("A");
	let mut b = component("B");
	b.install_after = vec![a.guid];
	let mut c = component("C");
	c.restrictions = vec![b.guid];
	let roster = vec![a, b, c];

	assert!(!roster[2].should_install_component(&roster, false));

	let (correct, ordered) = confirm_components_install_order(&roster).unwrap();
	assert!(correct);
	assert_eq!(ordered.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["A", "B", "C"]);
}
