use super::*;

#[test]
fn workspace_is_created_under_root_and_removed_on_drop() {
    let root = tempfile::tempdir().unwrap();
    let path = {
        let ws = Workspace::create(Some(root.path())).unwrap();
        assert!(ws.path().is_dir());
        assert!(ws.path().starts_with(root.path()));
        std::fs::write(ws.join("slide-0.png"), b"x").unwrap();
        ws.path().to_path_buf()
    };
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn close_reports_success_and_removes_nested_content() {
    let root = tempfile::tempdir().unwrap();
    let ws = Workspace::create(Some(root.path())).unwrap();
    std::fs::create_dir(ws.join("nested")).unwrap();
    std::fs::write(ws.join("nested").join("f"), b"x").unwrap();
    let path = ws.path().to_path_buf();
    assert!(ws.close());
    assert!(!path.exists());
}

#[test]
fn workspaces_never_share_a_directory() {
    let root = tempfile::tempdir().unwrap();
    let a = Workspace::create(Some(root.path())).unwrap();
    let b = Workspace::create(Some(root.path())).unwrap();
    assert_ne!(a.path(), b.path());
    let name = a.path().file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("cardreel-"));
}

#[test]
fn already_removed_directory_does_not_panic() {
    let root = tempfile::tempdir().unwrap();
    let ws = Workspace::create(Some(root.path())).unwrap();
    std::fs::remove_dir_all(ws.path()).unwrap();
    assert!(!ws.close());
}

#[test]
fn missing_root_is_a_workspace_error() {
    let root = tempfile::tempdir().unwrap();
    let err = Workspace::create(Some(&root.path().join("missing"))).unwrap_err();
    assert!(matches!(err, CardreelError::Workspace(_)));
}

#[test]
fn removed_on_unwind() {
    let root = tempfile::tempdir().unwrap();
    let root_path = root.path().to_path_buf();
    let result = std::panic::catch_unwind(move || {
        let _ws = Workspace::create(Some(&root_path)).unwrap();
        panic!("boom");
    });
    assert!(result.is_err());
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}
