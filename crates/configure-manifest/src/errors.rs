use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading component manifests
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse manifest {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Malformed manifest {}: {reason}", path.display())]
    MalformedManifest { path: PathBuf, reason: String },

    #[error("Crate name `{name}` is declared by both {first} and {second}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
}
