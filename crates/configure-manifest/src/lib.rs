//! Workspace crate model for the configure tool
//!
//! This crate discovers the components of the monorepo, reads their
//! `Cargo.toml` manifests into [`Crate`] records and audits external
//! dependency version constraints across all of them.

pub mod audit;
pub mod discovery;
pub mod errors;
pub mod naming;
pub mod reader;
pub mod types;

pub use audit::{audit, AuditReport, ConstraintGroup, DependencyUsage};
pub use discovery::{discover_crate_ids, discover_crates};
pub use errors::ManifestError;
pub use naming::snake_to_pascal;
pub use reader::{parse_manifest, read_manifest};
pub use types::{plugin_descriptors, Crate, DependencySpec, DetailedDependency, PluginDescriptor};
