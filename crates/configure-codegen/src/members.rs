//! Workspace member synchronizer
//!
//! The workspace member list is always re-derived as the sorted non-plugin
//! members already listed, followed by the sorted ids of the discovered
//! plugin crates. Only the `members = [...]` span is rewritten.

use crate::errors::CodegenError;
use crate::rewrite::{rewrite_file, RewriteStatus};
use configure_config::Layout;
use configure_manifest::Crate;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

/// Compute the canonical member list
pub fn canonical_members(layout: &Layout, existing: &[String], crates: &[Crate]) -> Vec<String> {
    let others: BTreeSet<&str> = existing
        .iter()
        .map(String::as_str)
        .filter(|m| !layout.is_plugin(m))
        .collect();
    let plugins: BTreeSet<&str> = crates
        .iter()
        .filter(|c| c.is_plugin)
        .map(|c| c.id.as_str())
        .collect();

    others
        .into_iter()
        .chain(plugins)
        .map(str::to_string)
        .collect()
}

/// Render a member list value, one member per line
pub fn render_members(members: &[String]) -> String {
    let mut out = String::from("members = [\n");
    for member in members {
        out.push_str(&format!("    \"{}\",\n", member));
    }
    out.push(']');
    out
}

/// Rewrites the member list of the workspace manifest
pub struct MemberSynchronizer<'a> {
    layout: &'a Layout,
    pattern: Regex,
}

impl<'a> MemberSynchronizer<'a> {
    pub fn new(layout: &'a Layout) -> Result<Self, CodegenError> {
        Ok(MemberSynchronizer {
            layout,
            pattern: Regex::new(r"(?m)^[ \t]*(members\s*=\s*\[[^\]]*\])")?,
        })
    }

    /// Rewrite manifest text with the canonical member list
    ///
    /// Returns `None` when no member list is present. More than one member
    /// list is rejected.
    pub fn sync(&self, content: &str, crates: &[Crate]) -> Result<Option<String>, CodegenError> {
        let spans: Vec<_> = self
            .pattern
            .captures_iter(content)
            .filter_map(|c| c.get(1))
            .collect();

        let span = match spans.as_slice() {
            [] => return Ok(None),
            [span] => *span,
            _ => {
                return Err(CodegenError::AmbiguousMemberList { count: spans.len() });
            }
        };

        let existing = parse_members(span.as_str())?;
        let members = canonical_members(self.layout, &existing, crates);
        debug!("Workspace members: {:?}", members);

        let mut out = String::with_capacity(content.len());
        out.push_str(&content[..span.start()]);
        out.push_str(&render_members(&members));
        out.push_str(&content[span.end()..]);
        Ok(Some(out))
    }
}

fn parse_members(span: &str) -> Result<Vec<String>, CodegenError> {
    let table: toml::Table =
        toml::from_str(span).map_err(|e| CodegenError::MalformedMemberList(e.to_string()))?;
    let members = table
        .get("members")
        .and_then(toml::Value::as_array)
        .ok_or_else(|| CodegenError::MalformedMemberList("not an array".to_string()))?;

    members
        .iter()
        .map(|m| {
            m.as_str()
                .map(str::to_string)
                .ok_or_else(|| CodegenError::MalformedMemberList(format!("{} is not a string", m)))
        })
        .collect()
}

/// Rewrite the workspace manifest of the layout
pub fn sync_workspace_members(
    layout: &Layout,
    crates: &[Crate],
    dry_run: bool,
) -> Result<RewriteStatus, CodegenError> {
    let synchronizer = MemberSynchronizer::new(layout)?;
    rewrite_file(&layout.workspace_manifest_path(), dry_run, |content| {
        synchronizer.sync(content, crates)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn make_crate(id: &str, is_plugin: bool) -> Crate {
        Crate {
            id: id.to_string(),
            name: id.rsplit('/').next().unwrap_or(id).to_string(),
            dependencies: BTreeMap::new(),
            is_plugin,
        }
    }

    fn discovered() -> Vec<Crate> {
        vec![
            make_crate("collectors/memory", true),
            make_crate("agent", false),
            make_crate("collectors/cpu", true),
            make_crate("collectors/_template", false),
        ]
    }

    const WORKSPACE: &str = "\
[workspace]
resolver = \"2\"
members = [
  \"main\",
  \"collectors/old\",
  \"agent\",
  \"collectors/cpu\",
  # comment
  \"agent\",
]
default-members = [\"main\"]

[profile.release]
lto = true
";

    #[test]
    fn test_canonical_member_list() {
        let layout = Layout::default();
        let Ok(sync) = MemberSynchronizer::new(&layout) else {
            return;
        };
        let result = sync.sync(WORKSPACE, &discovered());
        let expected = "\
[workspace]
resolver = \"2\"
members = [
    \"agent\",
    \"main\",
    \"collectors/cpu\",
    \"collectors/memory\",
]
default-members = [\"main\"]

[profile.release]
lto = true
";
        assert!(result.is_ok(), "Sync failed");
        assert_eq!(result.ok().flatten().as_deref(), Some(expected));
    }

    #[test]
    fn test_sync_is_idempotent_and_order_independent() {
        let layout = Layout::default();
        let Ok(sync) = MemberSynchronizer::new(&layout) else {
            return;
        };
        let crates = discovered();
        let first = sync.sync(WORKSPACE, &crates).ok().flatten().unwrap_or_default();
        let second = sync.sync(&first, &crates).ok().flatten();
        assert_eq!(second.as_deref(), Some(first.as_str()));

        let shuffled = "members = [\"collectors/cpu\", \"main\", \"agent\"]\n";
        let reordered = sync
            .sync(shuffled, &crates)
            .ok()
            .flatten()
            .unwrap_or_default();
        assert!(first.contains(&reordered));
    }

    #[test]
    fn test_empty_member_list() {
        let layout = Layout::default();
        let Ok(sync) = MemberSynchronizer::new(&layout) else {
            return;
        };
        let result = sync.sync("[workspace]\nmembers = []\n", &[make_crate("collectors/cpu", true)]);
        assert_eq!(
            result.ok().flatten().as_deref(),
            Some("[workspace]\nmembers = [\n    \"collectors/cpu\",\n]\n")
        );
    }

    #[test]
    fn test_missing_member_list_is_noop() {
        let layout = Layout::default();
        let Ok(sync) = MemberSynchronizer::new(&layout) else {
            return;
        };
        let result = sync.sync("[package]\nname = \"x\"\n", &discovered());
        assert!(result.is_ok_and(|r| r.is_none()));
    }

    #[test]
    fn test_multiple_member_lists_rejected() {
        let layout = Layout::default();
        let Ok(sync) = MemberSynchronizer::new(&layout) else {
            return;
        };
        let content = "[workspace]\nmembers = [\"a\"]\n\n[other]\nmembers = [\"b\"]\n";
        assert!(matches!(
            sync.sync(content, &discovered()),
            Err(CodegenError::AmbiguousMemberList { count: 2 })
        ));
    }

    #[test]
    fn test_non_string_member_rejected() {
        let layout = Layout::default();
        let Ok(sync) = MemberSynchronizer::new(&layout) else {
            return;
        };
        assert!(matches!(
            sync.sync("[workspace]\nmembers = [1]\n", &discovered()),
            Err(CodegenError::MalformedMemberList(_))
        ));
    }
}
