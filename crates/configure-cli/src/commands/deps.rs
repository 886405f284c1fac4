use crate::common::RunStatus;
use crate::logger;
use anyhow::Context;
use colored::Colorize;
use configure_config::Layout;
use configure_manifest::{audit, discover_crates, AuditReport, DependencyUsage};
use serde::Serialize;

/// JSON shape of `configure deps --json`
#[derive(Debug, Serialize)]
struct DepsListing<'a> {
    consistent: bool,
    dependencies: &'a [DependencyUsage],
}

/// List every external dependency with its constraints and users
pub fn list_deps(layout: &Layout, json: bool) -> anyhow::Result<RunStatus> {
    let crates = discover_crates(layout).context("Failed to read workspace crates")?;
    let report = audit(&crates);
    logger::debug(&format!(
        "Audited {} dependency name(s) across {} crate(s)",
        report.dependencies.len(),
        crates.len()
    ));

    if json {
        let listing = DepsListing {
            consistent: report.is_consistent(),
            dependencies: &report.dependencies,
        };
        let rendered =
            serde_json::to_string_pretty(&listing).context("Failed to serialize dependencies")?;
        println!("{}", rendered);
    } else {
        print!("{}", render_listing(&report));
    }

    if report.is_consistent() {
        Ok(RunStatus::Consistent)
    } else {
        Ok(RunStatus::Inconsistent)
    }
}

/// Render the human-readable listing
///
/// A consistent dependency shows its constraint and one user per line; a
/// mismatched one is flagged and shows each constraint group on its own line.
pub fn render_listing(report: &AuditReport) -> String {
    let mut out = String::new();
    for usage in &report.dependencies {
        match usage.groups.as_slice() {
            [group] => {
                out.push_str(&format!("* {} v{}:\n", usage.name.bold(), group.constraint));
                for krate in &group.crates {
                    out.push_str(&format!("    {}\n", krate));
                }
            }
            groups => {
                out.push_str(&format!("* {} {}\n", "!!!".red().bold(), usage.name.bold()));
                for group in groups {
                    out.push_str(&format!(
                        "  {}: {}\n",
                        group.constraint,
                        group.crates.join(", ")
                    ));
                }
            }
        }
    }
    if !report.is_consistent() {
        out.push_str(&format!("{}\n", "!!! Versions mismatch".red().bold()));
    }
    out
}
