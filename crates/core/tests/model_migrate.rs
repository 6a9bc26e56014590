use partbin_core::model::{
    cleanup, coerce_quantity, display_name_from_key, inventory_from_value, parse_quantity,
    projects_from_value, BomEntry, BomLine, StockStatus,
};
use serde_json::json;

#[test]
fn legacy_project_lists_become_quantity_maps() {
    let (inventory, report) = inventory_from_value(json!({
        "r1": {"name": "R1", "quantity": 4, "projects": ["fuzz", "fuzz", "delay"]}
    }));

    assert!(report.is_clean());
    let part = &inventory["r1"];
    assert_eq!(part.projects.get("fuzz"), Some(&2));
    assert_eq!(part.projects.get("delay"), Some(&1));
}

#[test]
fn invalid_inventory_entries_are_dropped_and_counted() {
    let (inventory, report) = inventory_from_value(json!({
        "ok": {"name": "  LED  ", "quantity": "7", "purchaseUrl": "  "},
        "null": null,
        "number": 3,
        "nameless": {"quantity": 1},
        "blank": {"name": "   "}
    }));

    assert_eq!(inventory.len(), 1);
    assert_eq!(report.invalid_parts, 4);
    let part = &inventory["ok"];
    assert_eq!(part.name, "LED");
    assert_eq!(part.quantity, 7);
    assert_eq!(part.purchase_url, None);
}

#[test]
fn projects_classify_bom_values_and_default_names() {
    let (projects, report) = projects_from_value(json!({
        "fuzz": {
            "bom": {
                "r1": {"name": "R1", "quantity": 2},
                "bad": 5,
                "old": {"0": "0", "1": "[", "2": "x"}
            }
        },
        "broken": "nope"
    }));

    assert_eq!(report.invalid_projects, 1);
    let fuzz = &projects["fuzz"];
    assert_eq!(fuzz.name, "fuzz");
    assert_eq!(fuzz.bom["r1"], BomEntry::Valid(BomLine::new("R1", 2)));
    assert!(matches!(fuzz.bom["bad"], BomEntry::Malformed(_)));
    assert!(matches!(fuzz.bom["old"], BomEntry::Corrupted(_)));
    assert!(fuzz.has_corrupted_lines());
}

#[test]
fn cleanup_drops_malformed_lines_and_stale_references() {
    let (mut inventory, _) = inventory_from_value(json!({
        "r1": {"name": "R1", "projects": {"fuzz": 2, "gone": 1, "delay": 0}}
    }));
    let (mut projects, _) = projects_from_value(json!({
        "fuzz": {"name": "Fuzz", "bom": {"r1": {"name": "R1", "quantity": 2}, "bad": [1, 2]}},
        "delay": {"name": "Delay"}
    }));

    let report = cleanup(&mut inventory, &mut projects);

    assert_eq!(report.malformed_lines, 1);
    assert_eq!(report.stale_references, 2);
    assert_eq!(report.total(), 3);
    assert_eq!(inventory["r1"].projects.len(), 1);
    assert!(!projects["fuzz"].bom.contains_key("bad"));

    let again = cleanup(&mut inventory, &mut projects);
    assert!(again.is_clean());
}

#[test]
fn quantities_are_coerced_to_non_negative_counts() {
    assert_eq!(coerce_quantity(&json!(3)), 3);
    assert_eq!(coerce_quantity(&json!(-3)), 0);
    assert_eq!(coerce_quantity(&json!(2.9)), 2);
    assert_eq!(coerce_quantity(&json!("12")), 12);
    assert_eq!(coerce_quantity(&json!("lots")), 0);
    assert_eq!(coerce_quantity(&json!(null)), 0);

    assert_eq!(parse_quantity(""), Some(0));
    assert_eq!(parse_quantity("-4"), Some(0));
    assert_eq!(parse_quantity("1.5"), Some(1));
    assert_eq!(parse_quantity("ten"), None);
}

#[test]
fn valid_lines_serialize_as_plain_objects() {
    let entry = BomEntry::Valid(BomLine::new("R1", 2));
    assert_eq!(serde_json::to_value(&entry).expect("to_value"), json!({"name": "R1", "quantity": 2}));

    let parsed: BomEntry = serde_json::from_value(json!({"name": "C1", "quantity": "4"})).expect("parse");
    assert_eq!(parsed, BomEntry::Valid(BomLine::new("C1", 4)));
}

#[test]
fn display_names_and_status_helpers() {
    assert_eq!(display_name_from_key("big-muff_pi"), "Big Muff Pi");
    assert_eq!(display_name_from_key(""), "");

    assert_eq!(StockStatus::assess(0, 1), StockStatus::Missing);
    assert_eq!(StockStatus::assess(1, 2), StockStatus::Low);
    assert_eq!(StockStatus::assess(2, 2), StockStatus::Sufficient);
    assert!(StockStatus::Missing < StockStatus::Low && StockStatus::Low < StockStatus::Sufficient);
    assert_eq!(serde_json::to_value(StockStatus::Low).expect("to_value"), json!("low"));
}
