//! Crate discovery
//!
//! Every immediate subdirectory of a discovery root that holds a
//! `Cargo.toml` is a crate. Crate ids are paths relative to the workspace
//! root with `/` separators (`agent`, `collectors/cpu`, `proto/twamp`).

use crate::errors::ManifestError;
use crate::reader::read_manifest;
use crate::types::Crate;
use configure_config::{Layout, MANIFEST_FILE_NAME, WORKSPACE_ROOT};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Find the ids of all crates under the configured discovery roots
///
/// Missing roots are skipped. Ids are returned sorted and deduplicated.
pub fn discover_crate_ids(layout: &Layout) -> Result<Vec<String>, ManifestError> {
    let mut ids = BTreeSet::new();

    for root in &layout.discovery_roots {
        let dir = if root == WORKSPACE_ROOT {
            layout.root.clone()
        } else {
            layout.root.join(root)
        };
        if !dir.is_dir() {
            debug!("Skipping missing discovery root: {:?}", dir);
            continue;
        }

        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| ManifestError::Io {
                path: dir.clone(),
                source: e.into(),
            })?;
            if !entry.file_type().is_dir() || !entry.path().join(MANIFEST_FILE_NAME).is_file() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy();
            let id = if root == WORKSPACE_ROOT {
                dir_name.to_string()
            } else {
                format!("{}/{}", root.trim_end_matches('/'), dir_name)
            };
            ids.insert(id);
        }
    }

    Ok(ids.into_iter().collect())
}

/// Discover all crates and read their manifests
///
/// Any manifest failure aborts discovery; no partial crate list is
/// returned. Declared names must be unique across the workspace.
pub fn discover_crates(layout: &Layout) -> Result<Vec<Crate>, ManifestError> {
    let crates = discover_crate_ids(layout)?
        .iter()
        .map(|id| read_manifest(layout, id))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
    for krate in &crates {
        if let Some(first) = seen.insert(&krate.name, &krate.id) {
            return Err(ManifestError::DuplicateName {
                name: krate.name.clone(),
                first: first.to_string(),
                second: krate.id.clone(),
            });
        }
    }

    info!(
        "Discovered {} crates ({} plugins)",
        crates.len(),
        crates.iter().filter(|c| c.is_plugin).count()
    );
    Ok(crates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_crate(root: &Path, id: &str, name: &str) -> bool {
        let dir = root.join(id);
        fs::create_dir_all(&dir).is_ok()
            && fs::write(
                dir.join("Cargo.toml"),
                format!("[package]\nname = \"{}\"\n\n[dependencies]\n", name),
            )
            .is_ok()
    }

    fn create_workspace() -> Option<TempDir> {
        let temp_dir = TempDir::new().ok()?;
        let root = temp_dir.path();
        for (id, name) in [
            ("agent", "agent"),
            ("common", "common"),
            ("collectors/cpu", "cpu"),
            ("collectors/memory", "memory"),
            ("collectors/_template", "_template"),
            ("proto/twamp", "twamp"),
        ] {
            if !write_crate(root, id, name) {
                return None;
            }
        }
        // Directories without a manifest are not crates
        fs::create_dir_all(root.join("docs")).ok()?;
        fs::create_dir_all(root.join("collectors").join("wip")).ok()?;
        Some(temp_dir)
    }

    #[test]
    fn test_discover_crate_ids() {
        let Some(temp_dir) = create_workspace() else {
            return;
        };
        let layout = Layout::new(temp_dir.path());
        let ids = discover_crate_ids(&layout);
        assert!(ids.is_ok(), "Discovery failed");
        assert_eq!(
            ids.unwrap_or_default(),
            vec![
                "agent",
                "collectors/_template",
                "collectors/cpu",
                "collectors/memory",
                "common",
                "proto/twamp",
            ]
        );
    }

    #[test]
    fn test_discover_crates_classifies_plugins() {
        let Some(temp_dir) = create_workspace() else {
            return;
        };
        let layout = Layout::new(temp_dir.path());
        let crates = discover_crates(&layout).unwrap_or_default();
        let plugins: Vec<_> = crates
            .iter()
            .filter(|c| c.is_plugin)
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(plugins, vec!["collectors/cpu", "collectors/memory"]);
    }

    #[test]
    fn test_empty_workspace() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let layout = Layout::new(temp_dir.path());
        assert!(discover_crates(&layout).is_ok_and(|c| c.is_empty()));
    }

    #[test]
    fn test_malformed_manifest_aborts_discovery() {
        let Some(temp_dir) = create_workspace() else {
            return;
        };
        let broken = temp_dir.path().join("collectors").join("broken");
        assert!(fs::create_dir_all(&broken).is_ok());
        assert!(fs::write(broken.join("Cargo.toml"), "[package]\n").is_ok());

        let layout = Layout::new(temp_dir.path());
        assert!(matches!(
            discover_crates(&layout),
            Err(ManifestError::MalformedManifest { .. })
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let Some(temp_dir) = create_workspace() else {
            return;
        };
        assert!(write_crate(temp_dir.path(), "collectors/cpu2", "cpu"));

        let layout = Layout::new(temp_dir.path());
        assert!(matches!(
            discover_crates(&layout),
            Err(ManifestError::DuplicateName { ref name, .. }) if name == "cpu"
        ));
    }
}
