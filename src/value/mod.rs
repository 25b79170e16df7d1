//! The value graph a [`Mapper`](crate::mapper::Mapper) walks.
//!
//! Host data is converted into [`Value`] by an adapter (see [`from_json`]) before
//! the mapper sees it. Values that pointers can refer to live in a [`Heap`]; the
//! address of a borrowed value is its identity for the duration of one pass.

mod heap;
mod json;
mod kind;

use std::fmt;
use std::rc::Rc;

pub use heap::{Heap, Slot};
pub use json::from_json;
pub use kind::Kind;

#[derive(Clone, Debug, PartialEq)]
pub enum ScalarData {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scalar {
    pub type_name: String,
    pub data: ScalarData,
    /// Result of the host type's own textual conversion, when it has one.
    pub stringer: Option<String>,
}

impl Scalar {
    pub fn kind(&self) -> Kind {
        match self.data {
            ScalarData::Bool(_) => Kind::Bool,
            ScalarData::Int(_) => Kind::Int,
            ScalarData::Uint(_) => Kind::Uint,
            ScalarData::Float(_) => Kind::Float,
            ScalarData::Str(_) => Kind::String,
        }
    }

    pub fn is_zero(&self) -> bool {
        match &self.data {
            ScalarData::Bool(value) => !value,
            ScalarData::Int(value) => *value == 0,
            ScalarData::Uint(value) => *value == 0,
            ScalarData::Float(value) => *value == 0.0,
            ScalarData::Str(value) => value.is_empty(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub type_name: String,
    pub value: Value,
}

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceShape {
    Slice,
    Array,
}

/// Where a callable's code lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub file: String,
    pub line: u32,
    /// Entry address; two callables with the same entry are the same function.
    pub entry: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

impl fmt::Display for ChanDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Both => "chan",
            Self::Send => "chan<-",
            Self::Recv => "<-chan",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelState {
    pub len: usize,
    pub cap: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Pointer {
        type_name: String,
        target: Option<Slot>,
    },
    Interface {
        type_name: String,
        inner: Option<Box<Value>>,
    },
    Record {
        type_name: String,
        fields: Vec<Field>,
    },
    Sequence {
        type_name: String,
        shape: SequenceShape,
        items: Vec<Value>,
    },
    Map {
        type_name: String,
        entries: Vec<(Value, Value)>,
    },
    Callable {
        type_name: String,
        target: Option<Symbol>,
    },
    Channel {
        type_name: String,
        direction: ChanDir,
        state: Option<Rc<ChannelState>>,
    },
    Opaque {
        type_name: String,
        text: String,
    },
}

impl Value {
    fn scalar(type_name: impl Into<String>, data: ScalarData) -> Self {
        Self::Scalar(Scalar {
            type_name: type_name.into(),
            data,
            stringer: None,
        })
    }

    pub fn bool(value: bool) -> Self {
        Self::scalar("bool", ScalarData::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::scalar("int", ScalarData::Int(value))
    }

    pub fn typed_int(type_name: impl Into<String>, value: i64) -> Self {
        Self::scalar(type_name, ScalarData::Int(value))
    }

    pub fn uint(value: u64) -> Self {
        Self::scalar("uint", ScalarData::Uint(value))
    }

    pub fn typed_uint(type_name: impl Into<String>, value: u64) -> Self {
        Self::scalar(type_name, ScalarData::Uint(value))
    }

    pub fn float(value: f64) -> Self {
        Self::scalar("float64", ScalarData::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::scalar("string", ScalarData::Str(value.into()))
    }

    pub fn typed_string(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::scalar(type_name, ScalarData::Str(value.into()))
    }

    /// The untyped nil: an empty `any`.
    pub fn nil() -> Self {
        Self::interface("any", None)
    }

    pub fn pointer(type_name: impl Into<String>, target: Slot) -> Self {
        Self::Pointer {
            type_name: type_name.into(),
            target: Some(target),
        }
    }

    pub fn nil_pointer(type_name: impl Into<String>) -> Self {
        Self::Pointer {
            type_name: type_name.into(),
            target: None,
        }
    }

    pub fn interface(type_name: impl Into<String>, inner: Option<Value>) -> Self {
        Self::Interface {
            type_name: type_name.into(),
            inner: inner.map(Box::new),
        }
    }

    pub fn record(type_name: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> Self {
        Self::Record {
            type_name: type_name.into(),
            fields: fields.into_iter().collect(),
        }
    }

    pub fn slice(type_name: impl Into<String>, items: impl IntoIterator<Item = Value>) -> Self {
        Self::Sequence {
            type_name: type_name.into(),
            shape: SequenceShape::Slice,
            items: items.into_iter().collect(),
        }
    }

    pub fn array(type_name: impl Into<String>, items: impl IntoIterator<Item = Value>) -> Self {
        Self::Sequence {
            type_name: type_name.into(),
            shape: SequenceShape::Array,
            items: items.into_iter().collect(),
        }
    }

    pub fn map(
        type_name: impl Into<String>,
        entries: impl IntoIterator<Item = (Value, Value)>,
    ) -> Self {
        Self::Map {
            type_name: type_name.into(),
            entries: entries.into_iter().collect(),
        }
    }

    pub fn callable(type_name: impl Into<String>, target: Option<Symbol>) -> Self {
        Self::Callable {
            type_name: type_name.into(),
            target,
        }
    }

    pub fn channel(
        type_name: impl Into<String>,
        direction: ChanDir,
        state: Option<Rc<ChannelState>>,
    ) -> Self {
        Self::Channel {
            type_name: type_name.into(),
            direction,
            state,
        }
    }

    pub fn opaque(type_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Opaque {
            type_name: type_name.into(),
            text: text.into(),
        }
    }

    /// Attaches the text a scalar's own conversion produces. Non-scalars are returned
    /// unchanged.
    pub fn with_stringer(mut self, text: impl Into<String>) -> Self {
        if let Self::Scalar(scalar) = &mut self {
            scalar.stringer = Some(text.into());
        }
        self
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Scalar(scalar) => scalar.kind(),
            Self::Pointer { .. } => Kind::Pointer,
            Self::Interface { .. } => Kind::Interface,
            Self::Record { .. } => Kind::Struct,
            Self::Sequence {
                shape: SequenceShape::Slice,
                ..
            } => Kind::Slice,
            Self::Sequence {
                shape: SequenceShape::Array,
                ..
            } => Kind::Array,
            Self::Map { .. } => Kind::Map,
            Self::Callable { .. } => Kind::Func,
            Self::Channel { .. } => Kind::Chan,
            Self::Opaque { .. } => Kind::Unknown,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Scalar(scalar) => &scalar.type_name,
            Self::Pointer { type_name, .. }
            | Self::Interface { type_name, .. }
            | Self::Record { type_name, .. }
            | Self::Sequence { type_name, .. }
            | Self::Map { type_name, .. }
            | Self::Callable { type_name, .. }
            | Self::Channel { type_name, .. }
            | Self::Opaque { type_name, .. } => type_name,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Scalar(scalar) => scalar.is_zero(),
            Self::Pointer { target, .. } => target.is_none(),
            Self::Interface { inner, .. } => inner.is_none(),
            Self::Record { fields, .. } => fields.iter().all(|field| field.value.is_zero()),
            Self::Sequence {
                shape: SequenceShape::Slice,
                items,
                ..
            } => items.is_empty(),
            Self::Sequence {
                shape: SequenceShape::Array,
                items,
                ..
            } => items.iter().all(Value::is_zero),
            Self::Map { entries, .. } => entries.is_empty(),
            Self::Callable { target, .. } => target.is_none(),
            Self::Channel { state, .. } => state.is_none(),
            Self::Opaque { text, .. } => text.is_empty(),
        }
    }

    /// A pointer or interface with nothing behind it.
    pub fn is_nil_indirection(&self) -> bool {
        self.kind().is_indirection() && self.is_zero()
    }
}

/// Non-owning view of a value plus whether it occupies addressable memory.
#[derive(Clone, Copy, Debug)]
pub struct ValueRef<'h> {
    value: &'h Value,
    addressable: bool,
}

impl<'h> ValueRef<'h> {
    pub fn addressable(value: &'h Value) -> Self {
        Self {
            value,
            addressable: true,
        }
    }

    pub fn temporary(value: &'h Value) -> Self {
        Self {
            value,
            addressable: false,
        }
    }

    /// A value stored inline in this one (record field, array item) shares its
    /// addressability.
    pub fn inner(&self, value: &'h Value) -> Self {
        Self {
            value,
            addressable: self.addressable,
        }
    }

    pub fn value(&self) -> &'h Value {
        self.value
    }

    pub fn is_addressable(&self) -> bool {
        self.addressable
    }

    pub fn address(&self) -> usize {
        self.value as *const Value as usize
    }
}
