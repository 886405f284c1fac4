//! Crate records built from component manifests

use crate::naming::snake_to_pascal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A dependency value from a `[dependencies]` table
///
/// Either a bare version string (`serde = "1.0"`) or a detailed table
/// (`serde = { version = "1.0", features = ["derive"] }`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DependencySpec {
    Simple(String),
    Detailed(DetailedDependency),
}

/// Detailed dependency table; keys other than the ones named here are kept
/// in `other`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DetailedDependency {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<bool>,
    #[serde(flatten)]
    pub other: BTreeMap<String, toml::Value>,
}

impl DependencySpec {
    /// Explicit version constraint, if any
    ///
    /// Path-only, git-only and workspace-inherited dependencies have none and
    /// take no part in the version audit.
    pub fn version_constraint(&self) -> Option<&str> {
        match self {
            DependencySpec::Simple(version) => Some(version.as_str()),
            DependencySpec::Detailed(detailed) => detailed.version.as_deref(),
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            DependencySpec::Simple(_) => None,
            DependencySpec::Detailed(detailed) => detailed.path.as_deref(),
        }
    }
}

/// A discovered workspace component
#[derive(Debug, Clone, PartialEq)]
pub struct Crate {
    /// Path relative to the workspace root, e.g. `collectors/cpu`
    pub id: String,
    /// `[package].name`
    pub name: String,
    pub dependencies: BTreeMap<String, DependencySpec>,
    pub is_plugin: bool,
}

impl Crate {
    /// Dependencies carrying an explicit version constraint
    pub fn version_constraints(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dependencies
            .iter()
            .filter_map(|(name, spec)| spec.version_constraint().map(|v| (name.as_str(), v)))
    }
}

/// Naming tokens of a plugin used for template substitution
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PluginDescriptor {
    /// snake_case crate name, substituted for `{name}`
    pub name: String,
    /// PascalCase variant, substituted for `{ename}`
    pub ename: String,
}

impl PluginDescriptor {
    pub fn new(name: &str) -> Self {
        PluginDescriptor {
            name: name.to_string(),
            ename: snake_to_pascal(name),
        }
    }
}

/// Descriptors of every plugin crate, sorted by name
pub fn plugin_descriptors(crates: &[Crate]) -> Vec<PluginDescriptor> {
    let mut plugins: Vec<PluginDescriptor> = crates
        .iter()
        .filter(|c| c.is_plugin)
        .map(|c| PluginDescriptor::new(&c.name))
        .collect();
    plugins.sort();
    plugins
}
