use catalogue_cli::{commands::BuildCommand, utils::load_catalogue, CliError};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SWAGGER: &str = r#"
swagger: "2.0"
info:
  title: Widgets
  version: "1"
paths:
  /widgets/{id}:
    get:
      operationId: getWidget
      parameters:
        - name: id
          in: path
          required: true
          type: string
      responses:
        200:
          description: ok
          schema:
            type: object
            properties:
              id: { type: string }
"#;

fn fixture(manifest: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("widgets.yaml"), SWAGGER).unwrap();
    let path = dir.path().join("catalogue.yaml");
    fs::write(&path, manifest).unwrap();
    (dir, path)
}

#[test]
fn test_build_succeeds_for_clean_manifest() {
    let (_dir, path) = fixture(
        r#"
apps:
  - name: Widgets
    swagger:
      file: widgets.yaml
"#,
    );
    let catalogue = load_catalogue(&path).unwrap();
    assert_eq!(catalogue.len(), 1);
    assert!(catalogue.action("Widgets", "get_widget").is_ok());
    BuildCommand::run(&path, false).unwrap();
}

#[test]
fn test_build_fails_when_declared_operation_is_missing() {
    let (_dir, path) = fixture(
        r#"
apps:
  - name: Widgets
    swagger:
      file: widgets.yaml
    actions:
      - action: drop_widget
        swagger_path: "/widgets/{id}/DELETE"
"#,
    );
    let err = BuildCommand::run(&path, false).unwrap_err();
    assert!(matches!(err, CliError::BuildFailed(1)));
}
