//! Generation of the plugin-derived files of the workspace
//!
//! Three files are derived from the discovered plugin set: the registry
//! source (template regions), the aggregator manifest (its dependency table)
//! and the workspace manifest (its member list). Each rewrite only touches
//! its own zone and leaves the rest of the file as written.

pub mod errors;
pub mod formatter;
pub mod injector;
pub mod members;
pub mod rewrite;
pub mod template;

pub use errors::CodegenError;
pub use formatter::{run_formatter, FormatOutcome};
pub use injector::{inject_aggregator_dependencies, DependencyInjector, ManifestZones, ScanState};
pub use members::{sync_workspace_members, MemberSynchronizer};
pub use rewrite::{rewrite_file, RewriteStatus};
pub use template::{expand_regions, expand_registry};
