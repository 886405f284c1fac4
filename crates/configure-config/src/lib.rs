//! Configuration management for the configure tool
//!
//! Every component receives a [`Layout`] explicitly instead of reading
//! module-level constants, so each one can be exercised against a synthetic
//! workspace.

pub mod layout;

pub use layout::{
    ConfigError, Layout, Markers, CONFIG_ENV_VAR, CONFIG_FILE_NAME, MANIFEST_FILE_NAME,
    WORKSPACE_ROOT,
};
