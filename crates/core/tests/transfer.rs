use chrono::{TimeZone, Utc};
use partbin_core::model::{BomEntry, BomLine, Inventory, Part, Project, Projects};
use partbin_core::policy::MatchPolicy;
use partbin_core::transfer::{
    apply_inventory_rows, export_bom_json, export_bom_table, export_inventory_table,
    export_snapshot_json, parse_bom_table, parse_inventory_table, parse_json_import,
    parse_project_quantities, parse_table, BomExport, BomFormat, JsonImport, TransferError,
};

fn sample_state() -> (Inventory, Projects) {
    let mut inventory = Inventory::new();
    inventory.insert(
        "r10k".into(),
        Part::new("10k Resistor", 25)
            .with_type(Some("Resistor".into()))
            .with_purchase_url(Some("https://shop.example/r10k".into()))
            .with_project("fuzz", 2),
    );
    inventory.insert("tl072".into(), Part::new("TL072", 4));

    let mut projects = Projects::new();
    projects.insert(
        "fuzz".into(),
        Project::new("Fuzz Face")
            .with_line("r10k", BomLine::new("10k Resistor", 2))
            .with_line("2n3904", BomLine::new("2N3904", 1)),
    );
    (inventory, projects)
}

#[test]
fn snapshot_export_round_trips_through_import() {
    let (inventory, projects) = sample_state();

    let text = export_snapshot_json(&inventory, &projects).expect("export");
    let (import, report) = parse_json_import(&text).expect("import");

    assert!(report.is_clean());
    match import {
        JsonImport::Snapshot { inventory: inv2, projects: proj2 } => {
            assert_eq!(inv2, inventory);
            assert_eq!(proj2, projects);
        }
        other => panic!("expected snapshot, got {other:?}"),
    }
}

#[test]
fn json_shapes_are_recognized() {
    let (legacy, _) = parse_json_import(r#"{"r1": {"name": "R1", "quantity": 2}}"#).expect("legacy");
    assert!(matches!(legacy, JsonImport::Inventory(inv) if inv["r1"].quantity == 2));

    let text = r#"{
        "projectName": "Tube Screamer",
        "parts": [
            {"name": "10k Resistor", "quantity": 2, "purchaseUrl": "https://shop.example/10k"},
            {"name": "10K resistor", "quantity": "3"},
            {"name": "", "quantity": 1},
            "junk"
        ]
    }"#;
    let (bom, _) = parse_json_import(text).expect("bom");
    let JsonImport::Bom(bom) = bom else { panic!("expected a BOM import") };
    assert_eq!(bom.project_name.as_deref(), Some("Tube Screamer"));
    assert_eq!(bom.bom.len(), 1);
    assert_eq!(bom.bom["10kres"], BomEntry::Valid(BomLine::new("10k Resistor", 5)));
    assert_eq!(bom.purchase_urls.get("10kres").map(String::as_str), Some("https://shop.example/10k"));
}

#[test]
fn json_import_errors_are_descriptive() {
    assert!(matches!(parse_json_import("{not json"), Err(TransferError::Json(_))));
    assert!(matches!(parse_json_import("[1, 2]"), Err(TransferError::UnsupportedShape(_))));
    assert!(matches!(
        parse_json_import(r#"{"parts": {"a": 1}}"#),
        Err(TransferError::UnsupportedShape(_))
    ));
    assert!(matches!(
        parse_json_import(r#"{"inventory": [], "projects": {}}"#),
        Err(TransferError::UnsupportedShape(_))
    ));
}

const INVENTORY_CSV: &str = "\
Part ID,Name,Type,Quantity,Purchase URL,Projects
r10k,10k Resistor,Resistor,25,https://shop.example/r10k,fuzz:2;delay:1
,TL072,IC,4,,
,,Other,3,,
";

#[test]
fn inventory_table_rows_are_parsed() {
    let rows = parse_inventory_table(INVENTORY_CSV).expect("parse");

    assert_eq!(rows.len(), 2, "rows without a name are skipped");
    assert_eq!(rows[0].id.as_deref(), Some("r10k"));
    assert_eq!(rows[0].quantity, 25);
    let projects = rows[0].projects.as_ref().expect("projects");
    assert_eq!(projects.get("fuzz"), Some(&2));
    assert_eq!(projects.get("delay"), Some(&1));
    assert_eq!(rows[1].id, None);
    assert_eq!(rows[1].purchase_url, None);
    assert_eq!(rows[1].projects, None);
}

#[test]
fn applying_rows_upserts_and_mirrors_into_boms() {
    let rows = parse_inventory_table(INVENTORY_CSV).expect("parse");
    let mut inventory = Inventory::new();
    inventory.insert("tl-072".into(), Part::new("TL072 op amp", 1));
    let mut projects = Projects::new();
    projects.insert("fuzz".into(), Project::new("Fuzz"));

    let summary =
        apply_inventory_rows(rows, &mut inventory, &mut projects, &MatchPolicy::default());

    assert_eq!((summary.created, summary.updated, summary.skipped), (1, 1, 0));
    assert_eq!(inventory["r10k"].quantity, 25);
    // The id-less row resolved onto the existing entry.
    assert_eq!(inventory["tl-072"].quantity, 4);
    assert_eq!(inventory["tl-072"].name, "TL072");
    assert_eq!(projects["fuzz"].bom["r10k"], BomEntry::Valid(BomLine::new("10k Resistor", 2)));
    assert!(!projects.contains_key("delay"));
}

#[test]
fn table_errors_name_the_problem() {
    let err = parse_inventory_table("Part ID,Quantity\nr1,2\n").expect_err("no name column");
    assert!(matches!(err, TransferError::MissingColumn(_)));

    let err = parse_inventory_table("Name,Quantity\nR1,2\nR2,lots\n").expect_err("bad quantity");
    assert!(matches!(err, TransferError::Row { line: 3, .. }), "got {err:?}");

    let err = parse_inventory_table("Name,Quantity\nR1,2,extra\n").expect_err("ragged row");
    assert!(matches!(err, TransferError::Table { .. }));

    assert!(matches!(parse_table(""), Err(TransferError::MissingHeader)));
}

#[test]
fn headers_match_case_insensitively() {
    let table = parse_table("\u{feff}PART NAME , quantity\n 4n7 Cap , 3 \n").expect("parse");
    assert_eq!(table.headers, vec!["part name", "quantity"]);
    assert_eq!(table.records[0].get(&["part name"]), Some("4n7 Cap"));

    let bom = parse_bom_table("Part Name,Quantity\n100n Cap,2\n100N cap,1\n").expect("bom");
    assert_eq!(bom.bom["100ncap"], BomEntry::Valid(BomLine::new("100n Cap", 3)));
}

#[test]
fn project_quantity_cells() {
    let parsed = parse_project_quantities("fuzz:2; delay ;;").expect("parse");
    assert_eq!(parsed.get("fuzz"), Some(&2));
    assert_eq!(parsed.get("delay"), Some(&1));
    assert!(parse_project_quantities("fuzz:many").is_err());
}

#[test]
fn inventory_table_export_has_standard_header() {
    let (inventory, _) = sample_state();
    let text = export_inventory_table(&inventory).expect("export");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Part ID,Name,Type,Quantity,Purchase URL,Projects"));
    assert_eq!(lines.next(), Some("r10k,10k Resistor,Resistor,25,https://shop.example/r10k,fuzz:2"));
    assert_eq!(lines.next(), Some("tl072,TL072,,4,,"));

    // And the export reads back in.
    let rows = parse_inventory_table(&text).expect("re-parse");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].quantity, 25);
}

#[test]
fn bom_exports() {
    let (inventory, projects) = sample_state();
    let project = &projects["fuzz"];
    let policy = MatchPolicy::default();

    let table = export_bom_table(project, &inventory, &policy).expect("table");
    assert_eq!(
        table.lines().collect::<Vec<_>>(),
        vec![
            "Part Name,Quantity,Purchase URL",
            "2N3904,1,",
            "10k Resistor,2,https://shop.example/r10k",
        ]
    );

    let when = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("date");
    let json = export_bom_json(project, &inventory, &policy, when).expect("json");
    let doc: BomExport = serde_json::from_str(&json).expect("parse export");
    assert_eq!(doc.project_name, "Fuzz Face");
    assert_eq!(doc.export_date, "2024-03-01T12:00:00+00:00");
    assert_eq!(doc.parts.len(), 2);
    assert!(json.contains("\"projectName\""));
    assert!(json.contains("\"purchaseUrl\""));
}

#[test]
fn bom_export_links_come_from_id_matches_only() {
    let mut inventory = Inventory::new();
    inventory.insert(
        "zzzz".into(),
        Part::new("R1", 5).with_purchase_url(Some("https://shop.example/r1".into())),
    );
    let project = Project::new("P").with_line("a", BomLine::new("R1", 1));

    let table = export_bom_table(&project, &inventory, &MatchPolicy::default()).expect("table");
    assert_eq!(table.lines().nth(1), Some("R1,1,"));
}

#[test]
fn formats_from_extensions() {
    assert_eq!(BomFormat::from_extension("JSON"), Some(BomFormat::Json));
    assert_eq!(BomFormat::from_extension("csv"), Some(BomFormat::Table));
    assert_eq!(BomFormat::from_extension("xlsx"), None);
    assert_eq!(BomFormat::Table.extension(), "csv");
}
