//! Dependency version auditor
//!
//! Cross-references the explicit version constraints every crate declares for
//! its external dependencies. A dependency name used with more than one
//! distinct constraint is a mismatch. Dependencies without an explicit
//! constraint (path, git, workspace-inherited) are ignored.

use crate::types::Crate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Crates sharing one constraint for a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintGroup {
    pub constraint: String,
    /// Crate ids, sorted
    pub crates: Vec<String>,
}

/// All constraints declared for a single dependency name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyUsage {
    pub name: String,
    /// Sorted by constraint
    pub groups: Vec<ConstraintGroup>,
}

impl DependencyUsage {
    pub fn is_mismatched(&self) -> bool {
        self.groups.len() > 1
    }
}

impl fmt::Display for DependencyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.name)?;
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{} [{}]", group.constraint, group.crates.join(", "))?;
        }
        Ok(())
    }
}

/// Result of auditing every discovered crate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Every constrained dependency, sorted by name
    pub dependencies: Vec<DependencyUsage>,
}

impl AuditReport {
    pub fn mismatches(&self) -> impl Iterator<Item = &DependencyUsage> {
        self.dependencies.iter().filter(|d| d.is_mismatched())
    }

    /// True iff no dependency name carries two distinct constraints
    pub fn is_consistent(&self) -> bool {
        self.mismatches().next().is_none()
    }
}

/// Audit the version constraints of all crates
///
/// Every dependency name is examined; a mismatch never stops the audit.
pub fn audit(crates: &[Crate]) -> AuditReport {
    let mut usage: BTreeMap<&str, BTreeMap<&str, Vec<String>>> = BTreeMap::new();
    for krate in crates {
        for (dep, constraint) in krate.version_constraints() {
            usage
                .entry(dep)
                .or_default()
                .entry(constraint)
                .or_default()
                .push(krate.id.clone());
        }
    }

    let dependencies = usage
        .into_iter()
        .map(|(name, groups)| DependencyUsage {
            name: name.to_string(),
            groups: groups
                .into_iter()
                .map(|(constraint, mut crates)| {
                    crates.sort();
                    ConstraintGroup {
                        constraint: constraint.to_string(),
                        crates,
                    }
                })
                .collect(),
        })
        .collect();

    AuditReport { dependencies }
}
