use partbin_core::merge::{merge_duplicates, MergedPair};
use partbin_core::model::{BomEntry, BomLine, Inventory, Part, Project, Projects};
use partbin_core::policy::MatchPolicy;
use serde_json::json;

fn total_stock(inventory: &Inventory) -> u32 {
    inventory.values().map(|p| p.quantity).sum()
}

fn fixture() -> (Inventory, Projects) {
    let mut inventory = Inventory::new();
    inventory.insert("10k-a".into(), Part::new("10K Resistor", 5).with_project("fuzz", 2));
    inventory.insert(
        "10k-b".into(),
        Part::new("10k resistor", 3)
            .with_purchase_url(Some("https://shop.example/10k".into()))
            .with_project("fuzz", 1),
    );
    inventory.insert("led".into(), Part::new("LED", 2));

    let mut projects = Projects::new();
    projects.insert(
        "fuzz".into(),
        Project::new("Fuzz Face")
            .with_line("10k-a", BomLine::new("10K Resistor", 2))
            .with_line("10k-b", BomLine::new("10k resistor", 1)),
    );
    (inventory, projects)
}

#[test]
fn merges_same_named_parts_into_the_more_complete_record() {
    let (mut inventory, mut projects) = fixture();
    let before = total_stock(&inventory);

    let report = merge_duplicates(&mut inventory, &mut projects, &MatchPolicy::default());

    assert_eq!(report.merges, 1);
    assert_eq!(
        report.pairs,
        vec![MergedPair { canonical: "10k-b".into(), duplicate: "10k-a".into() }]
    );
    assert!(!inventory.contains_key("10k-a"));
    let merged = &inventory["10k-b"];
    assert_eq!(merged.quantity, 8);
    assert_eq!(merged.projects.get("fuzz"), Some(&3));
    assert_eq!(merged.purchase_url.as_deref(), Some("https://shop.example/10k"));
    assert_eq!(total_stock(&inventory), before, "stock must be conserved");

    let bom = &projects["fuzz"].bom;
    assert_eq!(bom.len(), 1);
    assert_eq!(bom["10k-b"].as_valid().map(|l| l.quantity), Some(3));
    assert_eq!(report.bom_lines_rewritten, 1);
}

#[test]
fn second_run_is_a_no_op() {
    let (mut inventory, mut projects) = fixture();
    let policy = MatchPolicy::default();
    merge_duplicates(&mut inventory, &mut projects, &policy);
    let (inv_after, projects_after) = (inventory.clone(), projects.clone());

    let again = merge_duplicates(&mut inventory, &mut projects, &policy);
    assert_eq!(again.merges, 0);
    assert_eq!(again.bom_lines_rewritten, 0);
    assert!(!again.changed());
    assert_eq!(inventory, inv_after);
    assert_eq!(projects, projects_after);
}

#[test]
fn first_entry_stays_canonical_without_preference() {
    let (mut inventory, mut projects) = fixture();
    let policy = MatchPolicy { prefer_complete_records: false, ..MatchPolicy::default() };

    let report = merge_duplicates(&mut inventory, &mut projects, &policy);

    assert_eq!(report.pairs[0].canonical, "10k-a");
    // The duplicate's link is still carried over.
    assert_eq!(inventory["10k-a"].purchase_url.as_deref(), Some("https://shop.example/10k"));
}

#[test]
fn names_that_normalize_to_nothing_are_never_merged() {
    let mut inventory = Inventory::new();
    inventory.insert("x".into(), Part::new("!!!", 1));
    inventory.insert("y".into(), Part::new("???", 1));
    let mut projects = Projects::new();

    let report = merge_duplicates(&mut inventory, &mut projects, &MatchPolicy::default());
    assert_eq!(report.merges, 0);
    assert_eq!(inventory.len(), 2);
}

#[test]
fn type_and_url_merge_rules() {
    let mut inventory = Inventory::new();
    inventory.insert(
        "c1".into(),
        Part::new("100n Cap", 1)
            .with_type(Some("Film".into()))
            .with_purchase_url(Some("https://a".into())),
    );
    inventory.insert(
        "c2".into(),
        Part::new("100n cap", 1)
            .with_type(Some("Other".into()))
            .with_purchase_url(Some("https://a/longer".into())),
    );
    inventory.insert("c3".into(), Part::new("100N CAP", 1).with_type(Some("MLCC".into())));
    let mut projects = Projects::new();

    merge_duplicates(&mut inventory, &mut projects, &MatchPolicy::default());

    assert_eq!(inventory.len(), 1);
    let part = &inventory["c1"];
    assert_eq!(part.quantity, 3);
    // "Other" never overrides; a specific type does.
    assert_eq!(part.part_type.as_deref(), Some("MLCC"));
    assert_eq!(part.purchase_url.as_deref(), Some("https://a/longer"));
}

#[test]
fn bom_keys_outside_inventory_are_redirected_by_name() {
    let mut inventory = Inventory::new();
    inventory.insert("bmp".into(), Part::new("Big Muff", 1));
    let mut projects = Projects::new();
    projects.insert(
        "muff".into(),
        Project::new("Muff").with_line("Big Muff", BomLine::new("Big Muff", 1)),
    );

    let report = merge_duplicates(&mut inventory, &mut projects, &MatchPolicy::default());

    assert_eq!(report.merges, 0);
    assert_eq!(report.bom_lines_rewritten, 1);
    assert!(projects["muff"].bom.contains_key("bmp"));
}

#[test]
fn damaged_entries_keep_their_key() {
    let (mut inventory, mut projects) = fixture();
    let corrupted = BomEntry::classify(json!({"0": "0", "1": "["}));
    projects.get_mut("fuzz").expect("fuzz").bom.insert("10k-a-old".into(), corrupted.clone());

    merge_duplicates(&mut inventory, &mut projects, &MatchPolicy::default());

    assert_eq!(projects["fuzz"].bom.get("10k-a-old"), Some(&corrupted));
}

#[test]
fn decimal_capacitor_values_stay_apart() {
    let mut inventory = Inventory::new();
    inventory.insert("c-small".into(), Part::new("0.1uF", 20));
    inventory.insert("c-big".into(), Part::new("1uF", 3));
    let mut projects = Projects::new();

    let report = merge_duplicates(&mut inventory, &mut projects, &MatchPolicy::default());

    assert_eq!(report.merges, 0);
    assert_eq!(inventory.len(), 2);
    assert_eq!(inventory["c-small"].quantity, 20);
    assert_eq!(inventory["c-big"].quantity, 3);
}

#[test]
fn redirected_lines_never_replace_damaged_entries() {
    let mut inventory = Inventory::new();
    inventory.insert("10k".into(), Part::new("10k", 5).with_project("p", 4));
    let corrupted = BomEntry::classify(json!({"0": "0", "1": "["}));
    let mut project = Project::new("P").with_line("10K", BomLine::new("10k", 2));
    project.bom.insert("10k".into(), corrupted.clone());
    let mut projects = Projects::new();
    projects.insert("p".into(), project);

    let report = merge_duplicates(&mut inventory, &mut projects, &MatchPolicy::default());

    assert_eq!(report.bom_lines_rewritten, 0);
    assert_eq!(projects["p"].bom.get("10k"), Some(&corrupted));
    assert_eq!(projects["p"].bom.get("10K"), Some(&BomEntry::Valid(BomLine::new("10k", 2))));
}
