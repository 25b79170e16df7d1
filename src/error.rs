use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::value::Kind;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("cannot map unaddressable value of kind {kind}")]
    UnmappableRoot { kind: Kind },

    #[error("root slot {slot} is not allocated in the heap")]
    DanglingSlot { slot: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed settings ({origin}): {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unrecognized discard rule value ({value}) for key {key}")]
    UnknownDiscardRule { key: String, value: i64 },
}

impl ConfigError {
    pub fn is_missing_file(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
