use partbin_core::model::{BomEntry, BomLine, Inventory, Part, Project, Projects, StockStatus};
use partbin_core::policy::MatchPolicy;
use partbin_core::reconcile::{aggregate_requirements, reconcile, ProjectNeed};
use partbin_core::resolve::MatchKind;
use serde_json::json;

fn single_part(id: &str, name: &str, qty: u32) -> Inventory {
    let mut inventory = Inventory::new();
    inventory.insert(id.to_string(), Part::new(name, qty));
    inventory
}

#[test]
fn line_status_thresholds() {
    let inventory = single_part("a", "R1", 5);
    let policy = MatchPolicy::default();

    let low = reconcile(&Project::new("P").with_line("a", BomLine::new("R1", 10)), &inventory, &policy);
    assert_eq!(low.lines[0].status, StockStatus::Low);
    assert_eq!((low.lines[0].have, low.lines[0].need), (5, 10));
    assert_eq!(low.low_count, 1);

    let ok = reconcile(&Project::new("P").with_line("a", BomLine::new("R1", 5)), &inventory, &policy);
    assert_eq!(ok.lines[0].status, StockStatus::Sufficient);
    assert!(ok.is_buildable());

    let missing = reconcile(
        &Project::new("P").with_line("missingpart", BomLine::new("Missing Part", 3)),
        &inventory,
        &policy,
    );
    assert_eq!(missing.lines[0].status, StockStatus::Missing);
    assert_eq!(missing.lines[0].have, 0);
    assert_eq!(missing.missing_count, 1);
    assert!(!missing.is_buildable());
}

#[test]
fn zero_stock_is_missing_even_for_zero_need() {
    let inventory = single_part("a", "R1", 0);
    let report = reconcile(
        &Project::new("P").with_line("a", BomLine::new("R1", 0)),
        &inventory,
        &MatchPolicy::default(),
    );
    assert_eq!(report.lines[0].status, StockStatus::Missing);
}

#[test]
fn non_exact_matches_are_annotated() {
    let inventory = single_part("10k-res", "10k Resistor", 4);
    let project = Project::new("P")
        .with_line("10kres", BomLine::new("10k", 2))
        .with_line("10k-res", BomLine::new("10k", 1));

    let report = reconcile(&project, &inventory, &MatchPolicy::default());

    let fuzzy_line = report.lines.iter().find(|l| l.key == "10kres").expect("line");
    let matched = fuzzy_line.matched.as_ref().expect("annotation");
    assert_eq!(matched.name, "10k Resistor");
    assert_eq!(matched.kind, MatchKind::Normalized);
    assert_eq!(fuzzy_line.have, 4);

    let exact_line = report.lines.iter().find(|l| l.key == "10k-res").expect("line");
    assert!(exact_line.matched.is_none());
}

#[test]
fn unnamed_lines_use_the_key_and_damaged_lines_are_skipped() {
    let mut project = Project::new("P").with_line("big-muff", BomLine::new("", 1));
    project.bom.insert("junk".into(), BomEntry::classify(json!({"0": "0", "1": "["})));

    let report = reconcile(&project, &Inventory::new(), &MatchPolicy::default());

    assert_eq!(report.lines.len(), 1);
    assert_eq!(report.lines[0].name, "Big Muff");
}

#[test]
fn aggregate_sums_across_projects() {
    let inventory = single_part("r1", "R1", 5);
    let mut projects = Projects::new();
    projects.insert("p1".into(), Project::new("Fuzz").with_line("r1", BomLine::new("R1", 3)));
    projects.insert("p2".into(), Project::new("Delay").with_line("R1", BomLine::new("R1", 4)));

    let report = aggregate_requirements(&projects, &inventory);

    assert_eq!(report.entries.len(), 1);
    let entry = report.get("r1").expect("r1");
    assert_eq!(entry.total, 7);
    assert_eq!(entry.inventory_qty, 5);
    assert_eq!(entry.status, StockStatus::Low);
    assert_eq!(entry.name, "R1");
    assert_eq!(
        entry.breakdown,
        vec![
            ProjectNeed { project_name: "Fuzz".into(), quantity: 3 },
            ProjectNeed { project_name: "Delay".into(), quantity: 4 },
        ]
    );
}

#[test]
fn aggregate_falls_back_to_inventory_names_and_sorts_by_status_then_name() {
    let mut inventory = Inventory::new();
    inventory.insert("x1".into(), Part::new("TL072", 2));
    inventory.insert("led".into(), Part::new("LED", 10));
    inventory.insert("pot".into(), Part::new("Pot", 1));

    let mut projects = Projects::new();
    projects.insert(
        "p".into(),
        Project::new("Build")
            .with_line("tl072", BomLine::new("Dual op-amp", 1))
            .with_line("led", BomLine::new("LED", 1))
            .with_line("pot", BomLine::new("Pot", 3))
            .with_line("zener5v1", BomLine::new("zener", 1))
            .with_line("jack", BomLine::new("Audio Jack", 2)),
    );

    let report = aggregate_requirements(&projects, &inventory);

    let tl072 = report.get("tl072").expect("tl072");
    assert_eq!(tl072.inventory_qty, 2);
    assert_eq!(tl072.name, "Dual op-amp");

    let order: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(order, vec!["Audio Jack", "zener", "Pot", "Dual op-amp", "LED"]);
    assert_eq!(report.count(StockStatus::Missing), 2);
    assert_eq!(report.count(StockStatus::Low), 1);
    assert_eq!(report.count(StockStatus::Sufficient), 2);
}

#[test]
fn shared_display_names_do_not_borrow_stock() {
    let inventory = single_part("zzzz", "R1", 5);
    let project = Project::new("P").with_line("a", BomLine::new("R1", 10));

    let report = reconcile(&project, &inventory, &MatchPolicy::default());

    assert_eq!(report.lines[0].status, StockStatus::Missing);
    assert_eq!(report.lines[0].have, 0);
    assert!(report.lines[0].matched.is_none());
}
