//! Aggregator manifest dependency injector
//!
//! The aggregator's `Cargo.toml` is split into three zones by a line scanner:
//!
//! - `Head`: everything before `[dependencies]`, kept verbatim
//! - `Deps`: the dependency entries, parsed as `name = value`
//! - `Tail`: everything from the next section header on, kept verbatim
//!
//! Path dependencies pointing into the plugin root are dropped and replaced
//! by one entry per discovered plugin; every other entry is kept as written.
//! Entries are emitted sorted by name, each preceded by the comment lines
//! that preceded it.

use crate::errors::CodegenError;
use crate::rewrite::{rewrite_file, RewriteStatus};
use configure_config::Layout;
use configure_manifest::{Crate, DependencySpec};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// Header opening the zone that gets rewritten
pub const DEPENDENCIES_HEADER: &str = "[dependencies]";

/// Scanner position inside the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Head,
    Deps,
    Tail,
}

/// What the scanner does with a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    KeepHead(&'a str),
    EnterDeps,
    Drop,
    Comment(&'a str),
    Entry { name: &'a str, value: &'a str },
    KeepTail(&'a str),
}

/// A dependency line with the comments written above it
#[derive(Debug, Clone, PartialEq, Eq)]
struct DepEntry {
    value: String,
    comments: Vec<String>,
}

/// Aggregator manifest split into its zones
#[derive(Debug, Default)]
pub struct ManifestZones {
    pub head: Vec<String>,
    deps: BTreeMap<String, DepEntry>,
    /// Comments after the last entry of the dependency zone
    trailing_comments: Vec<String>,
    /// Comments above dropped plugin entries, reattached if the plugin remains
    plugin_comments: BTreeMap<String, Vec<String>>,
    pub tail: Vec<String>,
    pub has_dependencies: bool,
}

impl ManifestZones {
    /// Dependency names in emission order
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.deps.keys().map(String::as_str)
    }

    /// Reassemble the manifest text
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        let head_len = self
            .head
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |i| i + 1);
        lines.extend(self.head[..head_len].iter().cloned());
        if head_len > 0 {
            lines.push(String::new());
        }

        lines.push(DEPENDENCIES_HEADER.to_string());
        for (name, entry) in &self.deps {
            lines.extend(entry.comments.iter().cloned());
            lines.push(format!("{} = {}", name, entry.value));
        }

        let tail_len = self
            .tail
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |i| i + 1);
        if !self.trailing_comments.is_empty() || tail_len > 0 {
            lines.push(String::new());
        }
        lines.extend(self.trailing_comments.iter().cloned());
        lines.extend(self.tail[..tail_len].iter().cloned());

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Rewrites the aggregator's dependency zone from the discovered crates
pub struct DependencyInjector<'a> {
    layout: &'a Layout,
    entry_pattern: Regex,
}

impl<'a> DependencyInjector<'a> {
    pub fn new(layout: &'a Layout) -> Result<Self, CodegenError> {
        Ok(DependencyInjector {
            layout,
            entry_pattern: Regex::new(r"^([^\s=]+)\s*=\s*(.+?)\s*$")?,
        })
    }

    /// Total transition function of the scanner
    ///
    /// Lines the scanner cannot place (a dependency that is not a single
    /// `name = value` line) are rejected rather than guessed at.
    pub fn step<'l>(
        &self,
        state: ScanState,
        line: &'l str,
        line_no: usize,
    ) -> Result<(ScanState, Action<'l>), CodegenError> {
        let trimmed = line.trim();
        match state {
            ScanState::Head if trimmed == DEPENDENCIES_HEADER => {
                Ok((ScanState::Deps, Action::EnterDeps))
            }
            ScanState::Head => Ok((ScanState::Head, Action::KeepHead(line))),
            ScanState::Deps if trimmed.is_empty() => Ok((ScanState::Deps, Action::Drop)),
            ScanState::Deps if trimmed.starts_with('[') => {
                Ok((ScanState::Tail, Action::KeepTail(line)))
            }
            ScanState::Deps if trimmed.starts_with('#') => {
                Ok((ScanState::Deps, Action::Comment(line)))
            }
            ScanState::Deps => {
                let invalid = |reason: &str| CodegenError::InvalidManifestStructure {
                    line_no,
                    line: line.to_string(),
                    reason: reason.to_string(),
                };
                let captures = self
                    .entry_pattern
                    .captures(trimmed)
                    .ok_or_else(|| invalid("expected `name = value`"))?;
                let (Some(name), Some(value)) = (captures.get(1), captures.get(2)) else {
                    return Err(invalid("expected `name = value`"));
                };
                if !is_balanced(value.as_str()) {
                    return Err(invalid("value spans multiple lines"));
                }
                Ok((
                    ScanState::Deps,
                    Action::Entry {
                        name: name.as_str(),
                        value: value.as_str(),
                    },
                ))
            }
            ScanState::Tail => Ok((ScanState::Tail, Action::KeepTail(line))),
        }
    }

    /// Split manifest text into zones, dropping stale plugin path dependencies
    pub fn scan(&self, content: &str) -> Result<ManifestZones, CodegenError> {
        let mut zones = ManifestZones::default();
        let mut state = ScanState::Head;
        let mut pending_comments = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let (next, action) = self.step(state, line, idx + 1)?;
            match action {
                Action::KeepHead(line) => zones.head.push(line.to_string()),
                Action::EnterDeps => zones.has_dependencies = true,
                Action::Drop => {}
                Action::Comment(line) => pending_comments.push(line.to_string()),
                Action::Entry { name, value } => {
                    let comments = std::mem::take(&mut pending_comments);
                    if self.is_stale_plugin_path(value) {
                        debug!("Dropping plugin path dependency: {}", name);
                        zones.plugin_comments.insert(name.to_string(), comments);
                    } else {
                        zones.deps.insert(
                            name.to_string(),
                            DepEntry {
                                value: value.to_string(),
                                comments,
                            },
                        );
                    }
                }
                Action::KeepTail(line) => zones.tail.push(line.to_string()),
            }
            state = next;
        }

        zones.trailing_comments = pending_comments;
        Ok(zones)
    }

    fn is_stale_plugin_path(&self, value: &str) -> bool {
        parse_dependency(value)
            .as_ref()
            .and_then(DependencySpec::path)
            .is_some_and(|path| self.layout.points_into_plugin_root(path))
    }

    /// Rewrite manifest text so its dependency zone lists every plugin crate
    ///
    /// Returns `None` when the manifest has no `[dependencies]` section.
    pub fn inject(&self, content: &str, crates: &[Crate]) -> Result<Option<String>, CodegenError> {
        let mut zones = self.scan(content)?;
        if !zones.has_dependencies {
            return Ok(None);
        }
        debug!(
            "Kept aggregator dependencies: {}",
            zones.dependency_names().collect::<Vec<_>>().join(", ")
        );

        for krate in crates.iter().filter(|c| c.is_plugin) {
            let value = format!(
                "{{path = \"{}\"}}",
                self.layout.plugin_dependency_path(&krate.id)
            );
            let comments = zones
                .deps
                .remove(&krate.name)
                .map(|e| e.comments)
                .or_else(|| zones.plugin_comments.remove(&krate.name))
                .unwrap_or_default();
            zones
                .deps
                .insert(krate.name.clone(), DepEntry { value, comments });
        }

        Ok(Some(zones.render()))
    }
}

/// Read an entry value as a dependency specification
///
/// Values that do not parse are never treated as plugin paths.
fn parse_dependency(value: &str) -> Option<DependencySpec> {
    let mut table: toml::Table = toml::from_str(&format!("value = {}", value)).ok()?;
    table.remove("value")?.try_into::<DependencySpec>().ok()
}

/// Braces, brackets and quotes all close on the same line
fn is_balanced(value: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for ch in value.chars() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '#' => break,
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }

    depth == 0 && !in_string
}

/// Rewrite the aggregator manifest of the layout
pub fn inject_aggregator_dependencies(
    layout: &Layout,
    crates: &[Crate],
    dry_run: bool,
) -> Result<RewriteStatus, CodegenError> {
    let injector = DependencyInjector::new(layout)?;
    rewrite_file(&layout.aggregator_manifest(), dry_run, |content| {
        injector.inject(content, crates)
    })
}
