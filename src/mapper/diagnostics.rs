use std::fmt;

use crate::graph::NodeId;

/// Non-fatal conditions met during a pass. They never change control flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    UnknownKind { type_name: String },
    UnresolvedKey { key: String },
    NilEdge { from: NodeId, port: String },
    DepthExceeded { depth: usize, type_name: String },
    UnknownDiscardRule { key: String, value: i64 },
}

impl Diagnostic {
    pub(super) fn emit(&self) {
        match self {
            Self::UnknownKind { .. } | Self::NilEdge { .. } => tracing::debug!("{self}"),
            Self::UnresolvedKey { .. }
            | Self::DepthExceeded { .. }
            | Self::UnknownDiscardRule { .. } => tracing::warn!("{self}"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind { type_name } => {
                write!(f, "unhandled kind for type {type_name}, rendering as text")
            }
            Self::UnresolvedKey { key } => write!(f, "node [{key}] was not updated"),
            Self::NilEdge { from, port } => {
                write!(f, "edge from {from}:{port} points at the nil node")
            }
            Self::DepthExceeded { depth, type_name } => {
                write!(f, "depth limit {depth} reached at {type_name}")
            }
            Self::UnknownDiscardRule { key, value } => {
                write!(f, "unrecognized discard value ({value}) for key ({key})")
            }
        }
    }
}
