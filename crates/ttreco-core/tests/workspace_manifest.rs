//! Manifest hygiene: member crates inherit the workspace version and take
//! every third-party dependency from `[workspace.dependencies]`.

use std::path::{Path, PathBuf};

const MEMBERS: [&str; 2] = ["crates/ttreco-core", "crates/ttreco-cli"];

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .unwrap()
        .to_path_buf()
}

fn manifest(dir: &Path) -> toml::Value {
    let text = std::fs::read_to_string(dir.join("Cargo.toml")).unwrap();
    text.parse().unwrap()
}

#[test]
fn test_members_use_workspace_version() {
    let root = workspace_root();
    for member in MEMBERS {
        let doc = manifest(&root.join(member));
        let inherits = doc["package"]["version"]
            .get("workspace")
            .and_then(toml::Value::as_bool);
        assert_eq!(
            inherits,
            Some(true),
            "{member} should use version.workspace = true"
        );
    }
}

#[test]
fn test_workspace_version_matches_cargo_pkg() {
    let doc = manifest(&workspace_root());
    let ws_version = doc["workspace"]["package"]["version"].as_str().unwrap();
    assert_eq!(ws_version, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_dependencies_come_from_workspace() {
    let root = workspace_root();
    for member in MEMBERS {
        let doc = manifest(&root.join(member));
        for table in ["dependencies", "dev-dependencies"] {
            let Some(deps) = doc.get(table).and_then(toml::Value::as_table) else {
                continue;
            };
            for (name, spec) in deps {
                let inherited = spec
                    .get("workspace")
                    .and_then(toml::Value::as_bool)
                    .unwrap_or(false);
                assert!(
                    inherited,
                    "{member} [{table}] {name} should use workspace = true"
                );
            }
        }
    }
}
