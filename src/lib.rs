//! Maps in-memory object graphs to Graphviz diagrams.
//!
//! Values are described with the closed [`Value`] model and live in a [`Heap`],
//! which gives them stable addresses. A [`Mapper`] walks them into a [`Graph`] of
//! table-shaped nodes, sharing nodes between references to the same object, and
//! [`render`] turns the graph into DOT.

pub mod demo;
pub mod error;
pub mod graph;
pub mod mapper;
pub mod render;
pub mod settings;
pub mod value;

mod util;

pub use error::{ConfigError, MapError};
pub use graph::{Cell, CellCategory, Edge, EdgeStyle, Graph, Node, NodeId, collapse_trivial_nodes};
pub use mapper::{Diagnostic, MapStats, Mapper, Resolver, Root, map_roots};
pub use render::{to_dot, write_dot};
pub use settings::Settings;
pub use value::{Field, Heap, Kind, Slot, Value, ValueRef};
