//! Workspace layout shared by every configure component
//!
//! The layout names the directories scanned for crates, the plugin root and
//! its reserved template directory, the aggregator crate, the generated
//! registry file and the sentinels of its template regions.
//!
//! Defaults describe the monorepo the tool was written for. A
//! `configure.toml` at the workspace root overrides any subset of them:
//!
//! ```toml
//! plugin-root = "collectors"
//! aggregator = "agent"
//! registry = "agent/src/registry.rs"
//! formatter = []
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the optional layout file at the workspace root
pub const CONFIG_FILE_NAME: &str = "configure.toml";

/// Environment variable overriding the layout file location
pub const CONFIG_ENV_VAR: &str = "CONFIGURE_CONFIG";

/// Name of the component manifest inside every crate directory
pub const MANIFEST_FILE_NAME: &str = "Cargo.toml";

/// Entry of `discovery-roots` that stands for the workspace root itself
pub const WORKSPACE_ROOT: &str = ".";

/// Errors raised while loading the layout file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Sentinels of a template region
///
/// `begin` and `end` must each occupy a whole line; `line` prefixes every
/// template line stored inside the region.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub begin: String,
    pub end: String,
    pub line: String,
}

impl Default for Markers {
    fn default() -> Self {
        Markers {
            begin: "// @@@{{{".to_string(),
            end: "// @@@}}}".to_string(),
            line: "// | ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Layout {
    /// Workspace root every other path is relative to
    #[serde(skip)]
    pub root: PathBuf,
    /// Directories whose immediate subdirectories are crates
    pub discovery_roots: Vec<String>,
    /// Directory holding the plugin crates
    pub plugin_root: String,
    /// Reserved directory under the plugin root that is never a plugin
    pub template_dir: String,
    /// Crate id of the aggregator component
    pub aggregator: String,
    /// Generated registry source file
    pub registry: PathBuf,
    pub workspace_manifest: PathBuf,
    pub markers: Markers,
    /// Formatter command; the aggregator's name is appended. Empty disables it.
    pub formatter: Vec<String>,
    pub log_file: Option<PathBuf>,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            root: PathBuf::from(WORKSPACE_ROOT),
            discovery_roots: vec![
                WORKSPACE_ROOT.to_string(),
                "collectors".to_string(),
                "proto".to_string(),
            ],
            plugin_root: "collectors".to_string(),
            template_dir: "_template".to_string(),
            aggregator: "agent".to_string(),
            registry: PathBuf::from("agent").join("src").join("registry.rs"),
            workspace_manifest: PathBuf::from(MANIFEST_FILE_NAME),
            markers: Markers::default(),
            formatter: vec!["cargo".to_string(), "fmt".to_string(), "-p".to_string()],
            log_file: None,
        }
    }
}

impl Layout {
    /// Default layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Layout {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Location of the layout file for a workspace
    ///
    /// A non-empty `CONFIGURE_CONFIG` wins over `<root>/configure.toml`.
    pub fn config_path(root: &Path) -> PathBuf {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        root.join(CONFIG_FILE_NAME)
    }

    /// Load the layout for the workspace at `root`, falling back to defaults
    /// when no layout file exists
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = Self::config_path(root);
        if !path.exists() {
            return Ok(Layout::new(root));
        }
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(root, &content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Parse layout overrides from TOML text
    pub fn from_toml(root: &Path, content: &str) -> Result<Self, toml::de::Error> {
        let mut layout: Layout = toml::from_str(content)?;
        layout.root = root.to_path_buf();
        Ok(layout)
    }

    /// Crate id of the reserved template directory
    pub fn template_id(&self) -> String {
        format!("{}/{}", self.plugin_root, self.template_dir)
    }

    /// Whether a crate id names a plugin crate
    pub fn is_plugin(&self, crate_id: &str) -> bool {
        crate_id
            .strip_prefix(self.plugin_root.as_str())
            .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1)
            && crate_id != self.template_id()
    }

    /// Relative path from the aggregator directory back to the workspace root
    pub fn aggregator_to_root(&self) -> String {
        self.aggregator
            .split('/')
            .filter(|part| !part.is_empty() && *part != WORKSPACE_ROOT)
            .map(|_| "../")
            .collect()
    }

    /// Path dependency value for a plugin as written in the aggregator manifest
    pub fn plugin_dependency_path(&self, crate_id: &str) -> String {
        format!("{}{}", self.aggregator_to_root(), crate_id)
    }

    /// Whether a path dependency of the aggregator points into the plugin root
    pub fn points_into_plugin_root(&self, dep_path: &str) -> bool {
        let prefix = format!("{}{}/", self.aggregator_to_root(), self.plugin_root);
        dep_path.starts_with(&prefix)
    }

    /// Absolute path of a crate's manifest
    pub fn crate_manifest(&self, crate_id: &str) -> PathBuf {
        self.root.join(crate_id).join(MANIFEST_FILE_NAME)
    }

    pub fn aggregator_manifest(&self) -> PathBuf {
        self.crate_manifest(&self.aggregator)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.registry)
    }

    pub fn workspace_manifest_path(&self) -> PathBuf {
        self.root.join(&self.workspace_manifest)
    }
}
