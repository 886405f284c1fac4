//! Template region expander
//!
//! A template region sits between a begin and an end sentinel line. Lines
//! inside it that start with the template-line marker hold the template;
//! everything else in the region is generated and thrown away on each run:
//!
//! ```text
//!     // @@@{{{
//!     // | {ename}({name}::Collector),
//!     Cpu(cpu::Collector),
//!     Memory(memory::Collector),
//!     // @@@}}}
//! ```
//!
//! The template lines are written back right after the begin sentinel, so
//! the region stays self-describing. Each region of a file is expanded on
//! its own; text outside regions is preserved byte-for-byte.

use crate::errors::CodegenError;
use crate::formatter::run_formatter;
use crate::rewrite::{rewrite_file, RewriteStatus};
use configure_config::{Layout, Markers};
use configure_manifest::{Crate, PluginDescriptor};
use tracing::debug;

/// Token replaced by the plugin's snake_case name
pub const NAME_TOKEN: &str = "{name}";
/// Token replaced by the plugin's PascalCase identifier variant
pub const ENAME_TOKEN: &str = "{ename}";

/// Substitute plugin tokens into a template line
pub fn render_line(template: &str, plugin: &PluginDescriptor) -> String {
    template
        .replace(NAME_TOKEN, &plugin.name)
        .replace(ENAME_TOKEN, &plugin.ename)
}

/// Region currently being collected
struct OpenRegion<'a> {
    line_no: usize,
    indent: &'a str,
    newline: &'a str,
    /// Marker lines as written, without line ending
    raw_templates: Vec<&'a str>,
    /// Text following the marker on each template line
    templates: Vec<&'a str>,
}

/// Regenerate every template region in `content`
///
/// Returns `None` when the text holds no region. `plugins` must already be
/// sorted by name.
pub fn expand_regions(
    content: &str,
    markers: &Markers,
    plugins: &[PluginDescriptor],
) -> Result<Option<String>, CodegenError> {
    let mut out = String::with_capacity(content.len());
    let mut open: Option<OpenRegion<'_>> = None;
    let mut regions = 0;

    for (idx, line) in content.split_inclusive('\n').enumerate() {
        let (body, newline) = split_line_ending(line);

        match open.as_mut() {
            None => {
                if body.trim() == markers.begin {
                    open = Some(OpenRegion {
                        line_no: idx + 1,
                        indent: leading_whitespace(body),
                        newline,
                        raw_templates: Vec::new(),
                        templates: Vec::new(),
                    });
                } else {
                    out.push_str(line);
                }
            }
            Some(region) => {
                if body.trim() == markers.end {
                    emit_region(&mut out, region, markers, plugins, newline);
                    open = None;
                    regions += 1;
                } else if let Some(template) = body
                    .trim_start()
                    .strip_prefix(markers.line.as_str())
                    .filter(|t| !t.is_empty())
                {
                    region.raw_templates.push(body);
                    region.templates.push(template);
                }
            }
        }
    }

    if let Some(region) = open {
        return Err(CodegenError::UnterminatedRegion {
            line_no: region.line_no,
        });
    }

    debug!(
        "Expanded {} template region(s) for {} plugin(s)",
        regions,
        plugins.len()
    );
    Ok((regions > 0).then_some(out))
}

fn emit_region(
    out: &mut String,
    region: &OpenRegion<'_>,
    markers: &Markers,
    plugins: &[PluginDescriptor],
    end_newline: &str,
) {
    let newline = if region.newline.is_empty() {
        "\n"
    } else {
        region.newline
    };

    out.push_str(region.indent);
    out.push_str(&markers.begin);
    out.push_str(newline);

    for raw in &region.raw_templates {
        out.push_str(raw);
        out.push_str(newline);
    }

    for plugin in plugins {
        for template in &region.templates {
            out.push_str(region.indent);
            out.push_str(&render_line(template, plugin));
            out.push_str(newline);
        }
    }

    out.push_str(region.indent);
    out.push_str(&markers.end);
    out.push_str(end_newline);
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

/// Expand the registry file of the layout and run the formatter when it
/// changed
pub fn expand_registry(
    layout: &Layout,
    crates: &[Crate],
    plugins: &[PluginDescriptor],
    dry_run: bool,
) -> Result<RewriteStatus, CodegenError> {
    let path = layout.registry_path();
    let status = rewrite_file(&path, dry_run, |content| {
        expand_regions(content, &layout.markers, plugins)
    })?;

    if status == RewriteStatus::Updated && !dry_run {
        let package = crates
            .iter()
            .find(|c| c.id == layout.aggregator)
            .map_or(layout.aggregator.as_str(), |c| c.name.as_str());
        let outcome = run_formatter(layout, package);
        debug!("Formatter outcome: {:?}", outcome);
    }

    Ok(status)
}
