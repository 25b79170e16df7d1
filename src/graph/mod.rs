mod optimize;

use std::fmt;

use crate::value::Kind;

pub use optimize::collapse_trivial_nodes;

/// Port every node exposes on its header cell; edges land there.
pub const TITLE_PORT: &str = "name";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The canonical nil node. It is never emitted.
    pub const NIL: Self = Self(0);

    pub fn is_nil(self) -> bool {
        self == Self::NIL
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node_{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellCategory {
    Header,
    Footer,
    Key,
    Value,
    Blank,
    Info,
    Type,
    Default,
    ExternalResolver,
    StringResolver,
}

impl CellCategory {
    pub const ALL: [Self; 10] = [
        Self::Header,
        Self::Footer,
        Self::Key,
        Self::Value,
        Self::Blank,
        Self::Info,
        Self::Type,
        Self::Default,
        Self::ExternalResolver,
        Self::StringResolver,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Key => "key",
            Self::Value => "value",
            Self::Blank => "blank",
            Self::Info => "info",
            Self::Type => "type",
            Self::Default => "default",
            Self::ExternalResolver => "resolver.external",
            Self::StringResolver => "resolver.internal",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.label() == label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub port: Option<String>,
    pub text: String,
    pub category: CellCategory,
}

impl Cell {
    pub fn new(port: Option<String>, text: impl Into<String>, category: CellCategory) -> Self {
        Self {
            port,
            text: text.into(),
            category,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    /// Concatenated cell texts, mostly useful for assertions and logs.
    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|cell| cell.text.as_str()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub tooltip: String,
    pub rows: Vec<Row>,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, tooltip: impl Into<String>) -> Self {
        let node = Self {
            id,
            name: name.into(),
            tooltip: tooltip.into(),
            rows: Vec::new(),
        };
        tracing::trace!(id = %node.id, name = %node.name, "create node");
        node
    }

    /// A `key | value` row.
    pub fn add_inlined(
        &mut self,
        port: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        category: CellCategory,
    ) {
        self.rows.push(Row {
            cells: vec![
                Cell::new(Some(port.into()), key, CellCategory::Key),
                Cell::new(None, value, category),
            ],
        });
    }

    pub fn add_single(
        &mut self,
        port: impl Into<String>,
        text: impl Into<String>,
        category: CellCategory,
    ) {
        self.rows.push(Row {
            cells: vec![Cell::new(Some(port.into()), text, category)],
        });
    }

    pub fn add_cells(&mut self, cells: Vec<Cell>) {
        if cells.is_empty() {
            tracing::warn!(id = %self.id, "ignoring empty row");
            return;
        }
        self.rows.push(Row { cells });
    }

    pub fn colspan(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.cells.len())
            .max()
            .unwrap_or(1)
            .max(1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeStyle {
    Default,
    Pointer,
    Aggregate,
    Nested,
}

impl EdgeStyle {
    pub const ALL: [Self; 4] = [Self::Default, Self::Pointer, Self::Aggregate, Self::Nested];

    /// Style of an edge leading to a child of the given kind.
    pub fn for_kind(kind: Kind) -> Self {
        match kind {
            Kind::Pointer | Kind::Interface => Self::Pointer,
            Kind::Slice | Kind::Array => Self::Aggregate,
            Kind::Struct => Self::Nested,
            _ => Self::Default,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
            Self::Aggregate => "aggregate",
            Self::Nested => "nested",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "default" => Some(Self::Default),
            "pointer" => Some(Self::Pointer),
            "aggregate" | "array" => Some(Self::Aggregate),
            "nested" | "inner" => Some(Self::Nested),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub from_port: String,
    pub to: NodeId,
    pub to_port: String,
    pub tooltip: String,
    pub style: EdgeStyle,
}

/// Nodes and edges produced by one mapping session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub caption: Option<String>,
}

impl Graph {
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Appends an edge into the target's title port. Edges into the nil node are
    /// refused and reported back as `false`.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        from_port: impl Into<String>,
        to: NodeId,
        tooltip: impl Into<String>,
        style: EdgeStyle,
    ) -> bool {
        if to.is_nil() {
            return false;
        }

        self.edges.push(Edge {
            from,
            from_port: from_port.into(),
            to,
            to_port: TITLE_PORT.to_string(),
            tooltip: tooltip.into(),
            style,
        });
        true
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.from == id)
    }

    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.to == id)
    }
}
