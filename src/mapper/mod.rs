//! The value-graph walker.
//!
//! One [`Mapper`] is one mapping session: it owns the identity registry, the summary
//! cache and the graph under construction. Roots mapped through the same session
//! share nodes, so two roots referring to one object produce one node with two
//! incoming edges.

mod basic;
mod collections;
mod diagnostics;
mod identity;
mod inline;
mod interpret;

use crate::error::MapError;
use crate::graph::{EdgeStyle, Graph, Node, NodeId, collapse_trivial_nodes};
use crate::settings::Settings;
use crate::value::{Heap, Slot, Value, ValueRef};

pub use diagnostics::Diagnostic;
pub use identity::{Entry, IdentityKey, Registry};
pub use inline::{is_empty, is_inlinable};
pub use interpret::{Interpretation, Resolver};

use identity::NIL_SUMMARY;
use interpret::Interpreter;

/// A value to start mapping from.
#[derive(Clone, Copy, Debug)]
pub enum Root<'h> {
    /// An addressable heap cell.
    Slot(Slot),
    /// A pointer or interface; the value behind it is mapped.
    Value(&'h Value),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapStats {
    /// Values dispatched to a kind-specific mapper.
    pub visits: usize,
    /// Values answered from the summary cache without recursing.
    pub cache_hits: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct RootMark {
    addr: usize,
    type_name: String,
}

pub struct Mapper<'h> {
    heap: &'h Heap,
    settings: &'h Settings,
    registry: Registry,
    graph: Graph,
    resolvers: Vec<Box<dyn Resolver>>,
    current_root: Option<RootMark>,
    anonymous_types: Vec<String>,
    depth: usize,
    stats: MapStats,
    diagnostics: Vec<Diagnostic>,
}

impl<'h> Mapper<'h> {
    pub fn new(heap: &'h Heap, settings: &'h Settings) -> Self {
        Self {
            heap,
            settings,
            registry: Registry::new(),
            graph: Graph::default(),
            resolvers: Vec::new(),
            current_root: None,
            anonymous_types: Vec::new(),
            depth: 0,
            stats: MapStats::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn add_resolver(&mut self, resolver: impl Resolver + 'static) {
        self.resolvers.push(Box::new(resolver));
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        let caption = caption.into();
        if self.graph.caption.is_none() && !caption.is_empty() {
            self.graph.caption = Some(caption);
        }
    }

    /// Maps one root. Only non-addressable, non-indirection roots are rejected.
    pub fn map_root(&mut self, root: Root<'h>) -> Result<NodeId, MapError> {
        let target = match root {
            Root::Slot(slot) => {
                let value = self
                    .heap
                    .get(slot)
                    .ok_or(MapError::DanglingSlot { slot: slot.index() })?;
                Some(ValueRef::addressable(value))
            }
            Root::Value(value) if value.kind().is_indirection() => self.heap.pointee(value),
            Root::Value(value) => {
                return Err(MapError::UnmappableRoot {
                    kind: value.kind(),
                });
            }
        };

        let Some(target) = target else {
            tracing::debug!("root points at nothing");
            return Ok(NodeId::NIL);
        };

        self.current_root = Some(RootMark {
            addr: target.address(),
            type_name: target.value().type_name().to_string(),
        });
        let (node, _) = self.map_value(target, NodeId::NIL, false);
        self.current_root = None;

        tracing::debug!(root = %node, nodes = self.graph.node_count(), "mapped root");
        Ok(node)
    }

    /// Maps `value`, returning its node (nil when inlined) and its summary text.
    pub fn map_value(
        &mut self,
        value: ValueRef<'h>,
        parent: NodeId,
        inlineable: bool,
    ) -> (NodeId, String) {
        let key = self.registry.key_for(value, self.heap);

        match self.registry.lookup(&key).cloned() {
            Some(Entry::Done { node, summary }) => {
                self.stats.cache_hits += 1;
                return (node, summary);
            }
            Some(Entry::InProgress {
                summary: Some(summary),
            }) => {
                self.stats.cache_hits += 1;
                tracing::trace!(%key, "back-reference to a value in progress");
                return (self.registry.node_id(&key), summary);
            }
            Some(Entry::InProgress { summary: None }) => {
                self.stats.cache_hits += 1;
                return self.indirection_back_reference(value, &key);
            }
            None => self.registry.reserve(key.clone()),
        }

        if self.depth >= self.settings.max_depth {
            return self.map_too_deep(value, key);
        }

        self.depth += 1;
        self.stats.visits += 1;
        tracing::trace!(%key, %parent, inlineable, "map value");
        let (node, summary) = self.dispatch(value, &key, parent, inlineable);
        self.depth -= 1;

        if self.registry.is_undescribed(&key) {
            self.report(Diagnostic::UnresolvedKey {
                key: key.to_string(),
            });
        }
        self.registry.resolve(key, node, summary.clone());
        (node, summary)
    }

    fn dispatch(
        &mut self,
        value: ValueRef<'h>,
        key: &IdentityKey,
        parent: NodeId,
        inlineable: bool,
    ) -> (NodeId, String) {
        match value.value() {
            Value::Pointer { .. } | Value::Interface { .. } => {
                self.map_indirection(value, key, parent, inlineable)
            }
            Value::Record { type_name, fields } => self.map_record(value, key, type_name, fields),
            Value::Sequence {
                type_name,
                shape,
                items,
            } => self.map_sequence(value, key, type_name, *shape, items, inlineable),
            Value::Map { type_name, entries } => {
                self.map_map(value, key, type_name, entries, inlineable)
            }
            Value::Scalar(scalar) => self.map_scalar(key, scalar, inlineable),
            Value::Callable { type_name, target } => {
                self.map_callable(key, type_name, target.as_ref())
            }
            Value::Channel {
                type_name,
                direction,
                state,
            } => self.map_channel(key, type_name, *direction, state.as_deref(), inlineable),
            Value::Opaque { type_name, text } => self.map_opaque(key, type_name, text),
        }
    }

    /// An indirection reached again while its pointee is still being mapped stands
    /// for that pointee.
    fn indirection_back_reference(
        &mut self,
        value: ValueRef<'h>,
        key: &IdentityKey,
    ) -> (NodeId, String) {
        let Some(pointee) = self.heap.pointee(value.value()) else {
            return self.nil();
        };
        let pointee_key = self.registry.key_for(pointee, self.heap);

        match self.registry.lookup(&pointee_key).cloned() {
            Some(Entry::Done { node, summary }) => (node, summary),
            Some(Entry::InProgress {
                summary: Some(summary),
            }) => (self.registry.node_id(&pointee_key), summary),
            _ => {
                tracing::trace!(%key, "indirection refers to itself");
                self.nil()
            }
        }
    }

    fn map_too_deep(&mut self, value: ValueRef<'h>, key: IdentityKey) -> (NodeId, String) {
        let type_name = value.value().type_name().to_string();
        self.report(Diagnostic::DepthExceeded {
            depth: self.depth,
            type_name: type_name.clone(),
        });

        let id = self.registry.node_id(&key);
        self.graph.add_node(Node::new(id, "...", type_name.as_str()));
        self.registry.resolve(key, id, type_name.clone());
        (id, type_name)
    }

    /// Runs the optimizer when configured and hands over the graph.
    pub fn finish(mut self) -> Graph {
        if self.settings.collapse_enabled() {
            collapse_trivial_nodes(&mut self.graph);
        }
        self.graph
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn stats(&self) -> MapStats {
        self.stats
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn nil(&self) -> (NodeId, String) {
        (NodeId::NIL, NIL_SUMMARY.to_string())
    }

    fn is_root(&self, value: ValueRef<'_>) -> bool {
        self.current_root.as_ref().is_some_and(|root| {
            root.addr == value.address() && root.type_name == value.value().type_name()
        })
    }

    fn interpreter(&self) -> Interpreter<'_> {
        Interpreter {
            settings: self.settings,
            resolvers: &self.resolvers,
        }
    }

    fn connect(
        &mut self,
        from: NodeId,
        port: &str,
        to: NodeId,
        tooltip: &str,
        style: EdgeStyle,
    ) {
        if !self.graph.add_edge(from, port, to, tooltip, style) {
            self.report(Diagnostic::NilEdge {
                from,
                port: port.to_string(),
            });
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }
}

/// Maps each root through one session and returns the finished graph.
pub fn map_roots<'h>(
    heap: &'h Heap,
    settings: &'h Settings,
    roots: &[Root<'h>],
    caption: Option<&str>,
) -> Result<Graph, MapError> {
    let mut mapper = Mapper::new(heap, settings);
    if let Some(caption) = caption {
        mapper.set_caption(caption);
    }

    for root in roots {
        mapper.map_root(*root)?;
    }
    Ok(mapper.finish())
}
