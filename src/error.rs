use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal failures of a `run` or `report` invocation.
///
/// Metadata probes never produce these; they fall back instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing benchmark binary: {}", .0.display())]
    MissingExecutable(PathBuf),

    #[error("no benchmark samples parsed, check the output format")]
    NoSamples,

    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` failed with {status}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("refusing to overwrite existing artifact {}", .0.display())]
    ArtifactExists(PathBuf),

    #[error("i/o error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed run record {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {what}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
