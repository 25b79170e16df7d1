use super::inline::{is_empty, is_inlinable};
use super::{Diagnostic, IdentityKey, Mapper};
use crate::graph::{Cell, CellCategory, EdgeStyle, Node, NodeId};
use crate::settings::DiscardRule;
use crate::util::{
    display_type_name, element_type_name, is_anonymous_type, last_segment, map_value_type_name,
};
use crate::value::{Field, SequenceShape, Value, ValueRef};

const IGNORED_VALUE: &str = "***";

/// The aggregate a child is being attached to.
struct Collection<'a> {
    kind: &'static str,
    type_name: &'a str,
}

fn field_port(index: usize) -> String {
    format!("f{index}")
}

fn outgoing_port(index: usize) -> String {
    format!("o{index}")
}

fn footer_port(id: NodeId, index: usize) -> String {
    format!("{}i{index}", id.0)
}

impl<'h> Mapper<'h> {
    pub(super) fn map_record(
        &mut self,
        value: ValueRef<'h>,
        key: &IdentityKey,
        type_name: &str,
        fields: &'h [Field],
    ) -> (NodeId, String) {
        let id = self.registry.node_id(key);
        let summary = type_name.to_string();
        self.registry.describe(key, summary.as_str());

        let name = self.record_name(type_name);
        let mut node = Node::new(id, name, format!("struct: {type_name}"));
        let collection = Collection {
            kind: "struct",
            type_name,
        };

        for (index, field) in fields.iter().enumerate() {
            self.attach(
                &mut node,
                &collection,
                value.inner(&field.value),
                &field.type_name,
                &field.name,
                index,
            );
        }

        self.emit_unless_empty(node, value);
        (id, summary)
    }

    pub(super) fn map_sequence(
        &mut self,
        value: ValueRef<'h>,
        key: &IdentityKey,
        type_name: &str,
        shape: SequenceShape,
        items: &'h [Value],
        inlineable: bool,
    ) -> (NodeId, String) {
        if items.is_empty() {
            return self.map_empty_collection(value, key, type_name, inlineable);
        }

        let id = self.registry.node_id(key);
        let summary = type_name.to_string();
        self.registry.describe(key, summary.as_str());

        let mut node = Node::new(id, type_name, "[]");
        let collection = Collection {
            kind: "slice",
            type_name,
        };
        let declared = element_type_name(type_name);

        let total = items.len();
        let shown = total.min(self.settings.max_slice_length);
        let mut discarded = 0usize;

        for (index, item) in items.iter().take(shown).enumerate() {
            if self.settings.discard_nil_entries && item.is_nil_indirection() {
                discarded += 1;
                continue;
            }

            let child = match shape {
                SequenceShape::Slice => ValueRef::addressable(item),
                SequenceShape::Array => value.inner(item),
            };
            let declared = declared.unwrap_or_else(|| item.type_name());
            self.attach(&mut node, &collection, child, declared, &index.to_string(), index);
        }

        if total > shown {
            node.add_single(
                footer_port(id, total - 1),
                format!("{} more ...", total - shown),
                CellCategory::Footer,
            );
        }
        if discarded > 0 {
            node.add_single(
                footer_port(id, total - 1),
                format!("+ {discarded} nil entries"),
                CellCategory::Footer,
            );
        }

        self.emit_unless_empty(node, value);
        (id, summary)
    }

    pub(super) fn map_map(
        &mut self,
        value: ValueRef<'h>,
        key: &IdentityKey,
        type_name: &str,
        entries: &'h [(Value, Value)],
        inlineable: bool,
    ) -> (NodeId, String) {
        if entries.is_empty() {
            return self.map_empty_collection(value, key, type_name, inlineable);
        }

        let id = self.registry.node_id(key);
        let summary = type_name.to_string();
        self.registry.describe(key, summary.as_str());

        let mut node = Node::new(id, type_name, "map");
        let collection = Collection {
            kind: "map",
            type_name,
        };
        let declared = map_value_type_name(type_name);

        let total = entries.len();
        let shown = total.min(self.settings.max_map_entries);

        for (index, (entry_key, entry_value)) in entries.iter().take(shown).enumerate() {
            let (_, key_text) = self.map_value(ValueRef::temporary(entry_key), id, true);
            let declared = declared.unwrap_or_else(|| entry_value.type_name());
            self.attach(
                &mut node,
                &collection,
                ValueRef::temporary(entry_value),
                declared,
                &key_text,
                index,
            );
        }

        if total > shown {
            node.add_single(
                footer_port(id, total - 1),
                format!("{} more ...", total - shown),
                CellCategory::Footer,
            );
        }

        self.emit_unless_empty(node, value);
        (id, summary)
    }

    /// Empty sequences and maps are the literal `<type>{}`: inline when allowed,
    /// otherwise a node holding just that text.
    fn map_empty_collection(
        &mut self,
        value: ValueRef<'h>,
        key: &IdentityKey,
        type_name: &str,
        inlineable: bool,
    ) -> (NodeId, String) {
        let literal = format!("{type_name}{{}}");
        self.registry.describe(key, literal.as_str());

        if inlineable {
            return (NodeId::NIL, literal);
        }

        let id = self.registry.node_id(key);
        self.graph
            .add_node(Node::new(id, literal.as_str(), value.value().kind().label()));
        (id, literal)
    }

    /// Attaches one child to `node`, shared by records, sequences and maps: inlined
    /// children become a `name | value` row, materialized ones a `name | type` row
    /// plus an edge.
    fn attach(
        &mut self,
        node: &mut Node,
        collection: &Collection<'_>,
        child: ValueRef<'h>,
        declared_type: &str,
        name: &str,
        index: usize,
    ) {
        let row_port = field_port(index);

        match self.discard_rule(collection, name) {
            DiscardRule::Keep => {}
            DiscardRule::Drop => {
                tracing::trace!(collection = collection.type_name, name, "discarded field");
                return;
            }
            DiscardRule::Mask => {
                node.add_inlined(row_port, name, IGNORED_VALUE, CellCategory::Blank);
                return;
            }
        }

        let child_value = child.value();
        let child_is_empty = is_empty(self.heap, child_value);
        let inlineable = is_inlinable(self.heap, child_value);
        if !inlineable && child_is_empty && !self.settings.show_zero_fields {
            tracing::trace!(field = name, "not mapping empty field");
            return;
        }

        let (child_id, summary) = self.map_value(child, node.id, inlineable);

        if child_id.is_nil() {
            let interpreted = self
                .interpreter()
                .interpret(&summary, declared_type, child_value);
            let category = match interpreted.category {
                CellCategory::Default if interpreted.zero => CellCategory::Blank,
                CellCategory::Default => CellCategory::Value,
                category => category,
            };

            if !interpreted.zero || self.settings.show_nil_fields {
                node.add_inlined(row_port, name, interpreted.text, category);
            } else {
                tracing::trace!(field = name, "not showing nil field");
            }
        } else if self.settings.show_zero_fields || !child_is_empty {
            let outgoing = outgoing_port(index);
            node.add_cells(vec![
                Cell::new(Some(row_port), name, CellCategory::Key),
                Cell::new(
                    Some(outgoing.clone()),
                    display_type_name(declared_type),
                    CellCategory::Type,
                ),
            ]);
            self.connect(
                node.id,
                &outgoing,
                child_id,
                name,
                EdgeStyle::for_kind(child_value.kind()),
            );
        } else {
            tracing::trace!(field = name, "not showing empty field");
        }
    }

    fn discard_rule(&mut self, collection: &Collection<'_>, name: &str) -> DiscardRule {
        match self
            .settings
            .discard_rule(collection.kind, collection.type_name, name)
        {
            Ok(rule) => rule,
            Err(crate::error::ConfigError::UnknownDiscardRule { key, value }) => {
                self.report(Diagnostic::UnknownDiscardRule { key, value });
                DiscardRule::Keep
            }
            Err(err) => {
                tracing::warn!("{err}");
                DiscardRule::Keep
            }
        }
    }

    /// Empty aggregates are only drawn when configured, or when they are the root.
    fn emit_unless_empty(&mut self, node: Node, value: ValueRef<'h>) {
        if self.settings.show_zero_fields
            || !is_empty(self.heap, value.value())
            || self.is_root(value)
        {
            self.graph.add_node(node);
        } else {
            tracing::trace!(id = %node.id, "dropping empty node");
        }
    }

    fn record_name(&mut self, type_name: &str) -> String {
        if !is_anonymous_type(type_name) {
            return last_segment(type_name).to_string();
        }

        let index = match self
            .anonymous_types
            .iter()
            .position(|known| known == type_name)
        {
            Some(index) => index,
            None => {
                self.anonymous_types.push(type_name.to_string());
                self.anonymous_types.len() - 1
            }
        };
        format!("anonymous-{index}")
    }
}
