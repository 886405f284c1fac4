use crate::common::RunStatus;
use crate::logger;
use anyhow::Context;
use colored::Colorize;
use configure_codegen::{
    expand_registry, inject_aggregator_dependencies, sync_workspace_members, RewriteStatus,
};
use configure_config::{Layout, MANIFEST_FILE_NAME};
use configure_manifest::{audit, discover_crates, plugin_descriptors, AuditReport};
use std::path::{Path, PathBuf};

/// Regenerated file and what happened to it
struct FileChange {
    path: PathBuf,
    status: RewriteStatus,
}

/// Bring the registry, aggregator manifest and workspace members in line
/// with the plugins on disk
///
/// Every step runs even when the audit finds mismatches; only the final
/// status reflects them. With `check` set nothing is written and stale
/// files also make the run inconsistent.
pub fn run_sync(layout: &Layout, check: bool) -> anyhow::Result<RunStatus> {
    let total_start = std::time::Instant::now();

    let crates = discover_crates(layout).context("Failed to read workspace crates")?;
    let plugins = plugin_descriptors(&crates);
    logger::info(&format!(
        "Discovered {} crate(s), {} plugin(s)",
        crates.len(),
        plugins.len()
    ));

    println!("# Checking dependencies");
    let report = audit(&crates);
    print_mismatches(&report);

    println!("# Expanding registry");
    let registry = expand_registry(layout, &crates, &plugins, check)
        .with_context(|| format!("Failed to expand {}", layout.registry.display()))?;

    println!("# Updating aggregator dependencies");
    let aggregator_path = Path::new(&layout.aggregator).join(MANIFEST_FILE_NAME);
    let aggregator = inject_aggregator_dependencies(layout, &crates, check)
        .with_context(|| format!("Failed to update {}", aggregator_path.display()))?;

    println!("# Checking workspace");
    let workspace = sync_workspace_members(layout, &crates, check).with_context(|| {
        format!("Failed to update {}", layout.workspace_manifest.display())
    })?;

    let changes = [
        FileChange {
            path: layout.registry.clone(),
            status: registry,
        },
        FileChange {
            path: aggregator_path,
            status: aggregator,
        },
        FileChange {
            path: layout.workspace_manifest.clone(),
            status: workspace,
        },
    ];
    let stale = report_changes(&changes, check);

    let elapsed_ms = total_start.elapsed().as_millis();
    println!(
        "{}",
        format!(
            "Synced {} crate(s), {} plugin(s) in {}ms",
            crates.len(),
            plugins.len(),
            elapsed_ms
        )
        .dimmed()
    );

    if report.is_consistent() && !(check && stale) {
        Ok(RunStatus::Consistent)
    } else {
        Ok(RunStatus::Inconsistent)
    }
}

/// Print every mismatched dependency with its constraint groups
pub fn print_mismatches(report: &AuditReport) {
    let mut mismatches = report.mismatches().peekable();
    if mismatches.peek().is_none() {
        return;
    }

    println!("{}", "!!! Mismatched versions for dependencies:".red().bold());
    for usage in mismatches {
        logger::info(&format!("Version mismatch: {}", usage));
        println!("{}:", usage.name.bold());
        for group in &usage.groups {
            println!("{:10}: {}", group.constraint, group.crates.join(", "));
        }
    }
}

/// Report rewritten files, returns true when any file was (or would be)
/// updated
fn report_changes(changes: &[FileChange], check: bool) -> bool {
    let mut stale = false;
    for change in changes {
        match change.status {
            RewriteStatus::Updated if check => {
                stale = true;
                logger::warn(&format!("{} is out of date", change.path.display()));
            }
            RewriteStatus::Updated => {
                stale = true;
                logger::success(&format!("Updated {}", change.path.display()));
            }
            RewriteStatus::Unchanged => {
                logger::debug(&format!("{} is up to date", change.path.display()));
            }
            RewriteStatus::Skipped => {
                logger::debug(&format!(
                    "{} has nothing to generate",
                    change.path.display()
                ));
            }
        }
    }
    stale
}
