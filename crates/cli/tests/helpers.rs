use std::fs;
use std::path::Path;

use partbin::{canonicalize_or_current, infer_workspace_name};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");
    assert_eq!(result, expected);

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn canonicalize_or_current_resolves_existing_and_missing_paths() {
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("bench");
    fs::create_dir_all(&subdir).expect("create bench");

    let result = canonicalize_or_current(&subdir.to_string_lossy()).expect("canonicalize bench");
    assert_eq!(result, subdir.canonicalize().expect("canonicalize subdir"));

    let missing = canonicalize_or_current("not-created-yet").expect("missing path");
    assert!(missing.ends_with("not-created-yet"));
    assert!(missing.is_absolute());
}

#[test]
fn infer_workspace_name_uses_last_path_component() {
    assert_eq!(infer_workspace_name(Path::new("/home/me/pedal-parts")), "pedal-parts");
    assert_eq!(infer_workspace_name(Path::new("/tmp/bench")), "bench");
}

#[test]
fn infer_workspace_name_falls_back_when_missing() {
    assert_eq!(infer_workspace_name(Path::new("/")), "unnamed-workspace");
}
