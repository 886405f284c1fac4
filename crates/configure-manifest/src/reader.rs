//! Component manifest reader
//!
//! Builds a [`Crate`] from `<crate>/Cargo.toml`. A manifest lacking
//! `[package].name` or the `[dependencies]` table is malformed, and so is a
//! dependency value that is neither a string nor a table.

use crate::errors::ManifestError;
use crate::types::{Crate, DependencySpec};
use configure_config::Layout;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read and parse the manifest of the crate `crate_id`
pub fn read_manifest(layout: &Layout, crate_id: &str) -> Result<Crate, ManifestError> {
    let path = layout.crate_manifest(crate_id);
    debug!("Reading manifest: {:?}", path);

    let content = fs::read_to_string(&path).map_err(|source| ManifestError::Io {
        path: path.clone(),
        source,
    })?;
    parse_manifest(crate_id, &path, &content, layout.is_plugin(crate_id))
}

/// Parse manifest text into a [`Crate`]
///
/// `path` is only used for error reporting.
pub fn parse_manifest(
    crate_id: &str,
    path: &Path,
    content: &str,
    is_plugin: bool,
) -> Result<Crate, ManifestError> {
    let malformed = |reason: String| ManifestError::MalformedManifest {
        path: path.to_path_buf(),
        reason,
    };

    let table: toml::Table = toml::from_str(content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let name = table
        .get("package")
        .and_then(|package| package.get("name"))
        .and_then(toml::Value::as_str)
        .ok_or_else(|| malformed("missing [package].name".to_string()))?;

    let raw_deps = table
        .get("dependencies")
        .ok_or_else(|| malformed("missing [dependencies] table".to_string()))?
        .as_table()
        .ok_or_else(|| malformed("[dependencies] is not a table".to_string()))?;

    let mut dependencies = BTreeMap::new();
    for (dep_name, value) in raw_deps {
        let spec = value
            .clone()
            .try_into::<DependencySpec>()
            .map_err(|e| malformed(format!("dependency `{}`: {}", dep_name, e)))?;
        dependencies.insert(dep_name.clone(), spec);
    }

    Ok(Crate {
        id: crate_id.to_string(),
        name: name.to_string(),
        dependencies,
        is_plugin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<Crate, ManifestError> {
        parse_manifest(
            "collectors/cpu",
            Path::new("collectors/cpu/Cargo.toml"),
            content,
            true,
        )
    }

    #[test]
    fn test_parse_mixed_dependency_forms() {
        let content = r#"
[package]
name = "cpu"
version = "0.1.0"

[dependencies]
serde = { version = "1.0", features = ["derive"] }
async-trait = "0.1"
common = { path = "../../common" }
tokio.workspace = true
"#;
        let parsed = parse(content);
        assert!(parsed.is_ok(), "Failed to parse manifest");
        let Ok(krate) = parsed else {
            return;
        };
        assert_eq!(krate.id, "collectors/cpu");
        assert_eq!(krate.name, "cpu");
        assert!(krate.is_plugin);
        assert_eq!(krate.dependencies.len(), 4);

        let constraints: Vec<_> = krate.version_constraints().collect();
        assert_eq!(constraints, vec![("async-trait", "0.1"), ("serde", "1.0")]);
        assert_eq!(
            krate.dependencies.get("common").and_then(|d| d.path()),
            Some("../../common")
        );
    }

    #[test]
    fn test_missing_package_name_is_malformed() {
        let result = parse("[package]\nversion = \"0.1.0\"\n\n[dependencies]\n");
        assert!(matches!(
            result,
            Err(ManifestError::MalformedManifest { ref reason, .. }) if reason.contains("name")
        ));
    }

    #[test]
    fn test_missing_dependencies_is_malformed() {
        let result = parse("[package]\nname = \"cpu\"\n");
        assert!(matches!(
            result,
            Err(ManifestError::MalformedManifest { ref reason, .. }) if reason.contains("dependencies")
        ));
    }

    #[test]
    fn test_invalid_dependency_value_is_malformed() {
        let result = parse("[package]\nname = \"cpu\"\n\n[dependencies]\nserde = 1\n");
        assert!(matches!(
            result,
            Err(ManifestError::MalformedManifest { .. })
        ));
    }

    #[test]
    fn test_unparseable_manifest() {
        let result = parse("[package\nname = ");
        assert!(matches!(result, Err(ManifestError::Parse { .. })));
    }

    #[test]
    fn test_read_manifest_from_disk() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let crate_dir = temp_dir.path().join("collectors").join("memory");
        assert!(fs::create_dir_all(&crate_dir).is_ok());
        assert!(fs::write(
            crate_dir.join("Cargo.toml"),
            "[package]\nname = \"memory\"\n\n[dependencies]\nserde = \"1.0\"\n",
        )
        .is_ok());

        let layout = Layout::new(temp_dir.path());
        let krate = read_manifest(&layout, "collectors/memory");
        assert!(krate.is_ok_and(|k| k.name == "memory" && k.is_plugin));

        let missing = read_manifest(&layout, "collectors/absent");
        assert!(matches!(
            missing,
            Err(ManifestError::Io { ref path, .. }) if path.ends_with(PathBuf::from("absent").join("Cargo.toml"))
        ));
    }
}
