use partbin_core::db::{
    load_workspace_config, save_workspace_config, StateStore, WorkspaceConfig, WorkspaceContext,
    WorkspaceLayout,
};
use partbin_core::store::NewPart;
use tempfile::tempdir;

fn init_workspace(root: &std::path::Path, name: &str) -> WorkspaceLayout {
    let layout = WorkspaceLayout::new(root);
    std::fs::create_dir_all(&layout.meta_dir).expect("meta dir");
    let config = WorkspaceConfig::new(name, layout.db_path_relative_string());
    save_workspace_config(&layout, &config).expect("save config");
    layout
}

#[test]
fn workspace_context_loads_config_and_store() {
    let temp = tempdir().expect("tempdir");
    init_workspace(temp.path(), "Bench");

    let mut ctx = WorkspaceContext::from_root(temp.path()).expect("context");
    assert_eq!(ctx.config.name, "Bench");
    assert!(ctx.db_path.is_file());
    assert!(ctx.store.inventory().is_empty());

    ctx.store.add_part(NewPart::new("Red LED", 10)).expect("add part");
    drop(ctx);

    let ctx = WorkspaceContext::from_root(temp.path()).expect("re-open");
    assert_eq!(ctx.store.part("redled").map(|p| p.quantity), Some(10));
    assert!(ctx.store.provider().get("inventory").expect("get").is_some());
}

#[test]
fn config_defaults_fill_missing_fields() {
    let temp = tempdir().expect("tempdir");
    let layout = WorkspaceLayout::new(temp.path());
    std::fs::create_dir_all(&layout.meta_dir).expect("meta dir");
    std::fs::write(
        &layout.config_path,
        r#"{"name":"Old","description":null,"config_version":"0.1.0","db":{"path":".partbin/state.db"}}"#,
    )
    .expect("write config");

    let config = load_workspace_config(&layout).expect("load");
    assert_eq!(config.policy.fuzzy_threshold, 2);
    assert_eq!(config.policy.generic_type, "Other");
    assert_eq!(config.compress_threshold, 64 * 1024);
}

#[test]
fn missing_config_reports_the_path() {
    let temp = tempdir().expect("tempdir");
    let err = WorkspaceContext::from_root(temp.path()).expect_err("no workspace");
    assert!(err.to_string().contains("Failed to read workspace config"));
}

#[test]
fn invalid_config_is_reported() {
    let temp = tempdir().expect("tempdir");
    let layout = WorkspaceLayout::new(temp.path());
    std::fs::create_dir_all(&layout.meta_dir).expect("meta dir");
    std::fs::write(&layout.config_path, "{ nope").expect("write");

    let err = load_workspace_config(&layout).expect_err("bad json");
    assert!(err.to_string().contains("Failed to parse workspace config JSON"));
}
