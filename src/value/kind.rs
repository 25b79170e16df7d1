use std::fmt;

/// Structural kind of a [`Value`](super::Value), independent of its declared type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Pointer,
    Interface,
    Struct,
    Slice,
    Array,
    Map,
    Func,
    Chan,
    Unknown,
}

impl Kind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::String => "string",
            Self::Pointer => "ptr",
            Self::Interface => "interface",
            Self::Struct => "struct",
            Self::Slice => "slice",
            Self::Array => "array",
            Self::Map => "map",
            Self::Func => "func",
            Self::Chan => "chan",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_indirection(self) -> bool {
        matches!(self, Self::Pointer | Self::Interface)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Uint | Self::Float)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
