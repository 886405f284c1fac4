//! Best-effort formatting of regenerated sources
//!
//! The formatter is an external command (by default `cargo fmt -p <crate>`)
//! whose outcome never affects the run.

use configure_config::Layout;
use configure_logger as logger;
use std::process::Command;
use which::which;

/// How the formatter invocation went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// No formatter command is configured
    Disabled,
    /// The formatter program is not on `PATH`
    NotFound,
    /// The formatter could not be spawned or exited non-zero
    Failed(Option<i32>),
    Formatted,
}

/// Run the configured formatter scoped to `package`
pub fn run_formatter(layout: &Layout, package: &str) -> FormatOutcome {
    let Some((program, args)) = layout.formatter.split_first() else {
        return FormatOutcome::Disabled;
    };

    let Ok(program_path) = which(program) else {
        logger::debug(&format!("Formatter '{}' not found; skipping", program));
        return FormatOutcome::NotFound;
    };

    let command_line = format!("{} {} {}", program, args.join(" "), package);
    logger::step(&format!("Running formatter: {}", command_line));

    let output = Command::new(&program_path)
        .args(args)
        .arg(package)
        .current_dir(&layout.root)
        .output();

    match output {
        Ok(output) => {
            logger::capture_output(&command_line, &output);
            if output.status.success() {
                FormatOutcome::Formatted
            } else {
                logger::debug(&format!(
                    "Formatter exited with {:?}; ignoring",
                    output.status.code()
                ));
                FormatOutcome::Failed(output.status.code())
            }
        }
        Err(e) => {
            logger::debug(&format!("Failed to run formatter: {}", e));
            FormatOutcome::Failed(None)
        }
    }
}
