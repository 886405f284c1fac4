use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while regenerating derived files
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("IO error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid manifest structure at line {line_no} ({reason}): `{line}`")]
    InvalidManifestStructure {
        line_no: usize,
        line: String,
        reason: String,
    },

    #[error("Template region opened at line {line_no} is never closed")]
    UnterminatedRegion { line_no: usize },

    #[error("Expected a single workspace member list, found {count}")]
    AmbiguousMemberList { count: usize },

    #[error("Malformed workspace member list: {0}")]
    MalformedMemberList(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use crate::errors::*;

    #[test]
    fn test_invalid_structure_display() {
        let err = CodegenError::InvalidManifestStructure {
            line_no: 7,
            line: "features = [".to_string(),
            reason: "unterminated value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid manifest structure at line 7 (unterminated value): `features = [`"
        );
    }

    #[test]
    fn test_io_display_omits_cause() {
        let err = CodegenError::Io {
            path: PathBuf::from("agent/src/registry.rs"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "IO error on agent/src/registry.rs");
    }
}
