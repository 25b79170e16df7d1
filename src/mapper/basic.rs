use super::{Diagnostic, IdentityKey, Mapper, NIL_SUMMARY};
use crate::graph::{CellCategory, EdgeStyle, Node, NodeId, TITLE_PORT};
use crate::util::truncate_middle;
use crate::value::{ChanDir, ChannelState, Kind, Scalar, ScalarData, Symbol, ValueRef};

impl<'h> Mapper<'h> {
    /// Indirections to live values are transparent: the pointee is mapped in their
    /// place. Only an indirection to a zero value gets a node of its own.
    pub(super) fn map_indirection(
        &mut self,
        value: ValueRef<'h>,
        key: &IdentityKey,
        parent: NodeId,
        inlineable: bool,
    ) -> (NodeId, String) {
        let Some(pointee) = self.heap.pointee(value.value()) else {
            self.registry.describe(key, NIL_SUMMARY);
            return self.nil();
        };

        if !pointee.value().is_zero() {
            let (node, summary) = self.map_value(pointee, parent, inlineable);
            self.registry.describe(key, summary.as_str());
            return (node, summary);
        }

        let (pointee_node, pointee_summary) = self.map_value(pointee, NodeId::NIL, inlineable);

        let summary = value.value().type_name().to_string();
        self.registry.describe(key, summary.as_str());

        if !inlineable {
            let id = self.registry.node_id(key);
            self.graph
                .add_node(Node::new(id, summary.as_str(), value.value().kind().label()));
            self.connect(id, TITLE_PORT, pointee_node, "", EdgeStyle::Pointer);
            return (id, summary);
        }

        if value.value().kind() == Kind::Pointer {
            (pointee_node, summary)
        } else {
            (pointee_node, pointee_summary)
        }
    }

    pub(super) fn map_scalar(
        &mut self,
        key: &IdentityKey,
        scalar: &Scalar,
        inlineable: bool,
    ) -> (NodeId, String) {
        let text = self.scalar_text(scalar);

        if inlineable {
            self.registry.describe(key, text.as_str());
            return (NodeId::NIL, text);
        }

        let summary = scalar.type_name.clone();
        self.registry.describe(key, summary.as_str());
        let id = self.registry.node_id(key);
        self.graph.add_node(Node::new(id, text, scalar.kind().label()));
        (id, summary)
    }

    fn scalar_text(&self, scalar: &Scalar) -> String {
        match &scalar.data {
            ScalarData::Bool(value) => value.to_string(),
            ScalarData::Int(value) => value.to_string(),
            ScalarData::Uint(value) => value.to_string(),
            ScalarData::Float(value) => format!("{value:?}"),
            ScalarData::Str(value) => {
                let quoted = format!("{:?}", value.trim_matches('"'));
                truncate_middle(&quoted, self.settings.max_string_length)
            }
        }
    }

    /// Unbound callables inline as their type; bound ones expose where they live.
    pub(super) fn map_callable(
        &mut self,
        key: &IdentityKey,
        type_name: &str,
        target: Option<&Symbol>,
    ) -> (NodeId, String) {
        self.registry.describe(key, type_name);

        let Some(symbol) = target else {
            return (NodeId::NIL, type_name.to_string());
        };

        let id = self.registry.node_id(key);
        let mut node = Node::new(id, type_name, "function");
        node.add_inlined("name", "name", symbol.name.as_str(), CellCategory::Info);
        node.add_inlined("file", "file", symbol.file.as_str(), CellCategory::Info);
        node.add_inlined("line", "line", symbol.line.to_string(), CellCategory::Info);
        self.graph.add_node(node);

        (id, type_name.to_string())
    }

    pub(super) fn map_channel(
        &mut self,
        key: &IdentityKey,
        type_name: &str,
        direction: ChanDir,
        state: Option<&ChannelState>,
        inlineable: bool,
    ) -> (NodeId, String) {
        self.registry.describe(key, type_name);

        let Some(state) = state else {
            return (NodeId::NIL, type_name.to_string());
        };
        if inlineable {
            return (NodeId::NIL, type_name.to_string());
        }

        let id = self.registry.node_id(key);
        let mut node = Node::new(id, type_name, "channel");
        node.add_inlined("len", "len", state.len.to_string(), CellCategory::Info);
        node.add_inlined("cap", "cap", state.cap.to_string(), CellCategory::Info);
        node.add_inlined("dir", "dir", direction.to_string(), CellCategory::Info);
        self.graph.add_node(node);

        (id, type_name.to_string())
    }

    pub(super) fn map_opaque(
        &mut self,
        key: &IdentityKey,
        type_name: &str,
        text: &str,
    ) -> (NodeId, String) {
        self.report(Diagnostic::UnknownKind {
            type_name: type_name.to_string(),
        });

        let summary = Kind::Unknown.label().to_string();
        self.registry.describe(key, summary.as_str());
        let id = self.registry.node_id(key);
        self.graph.add_node(Node::new(id, text, type_name));
        (id, summary)
    }
}
