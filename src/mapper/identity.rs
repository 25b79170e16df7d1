use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::graph::NodeId;
use crate::value::{Heap, Kind, SequenceShape, Value, ValueRef};

pub(crate) const NIL_SUMMARY: &str = "nil";

/// Identity of a piece of memory within one mapping pass.
///
/// The declared type name is part of an addressed key because a record and its
/// first field may share an address in a host language.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Nil,
    Addressed {
        kind: Kind,
        addr: usize,
        type_name: String,
    },
    Pointer {
        kind: Kind,
        ptr: usize,
    },
    Fresh {
        kind: Kind,
        seq: u64,
    },
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil0"),
            Self::Addressed {
                kind,
                addr,
                type_name,
            } => write!(f, "{kind}:{addr:x}:{type_name}"),
            Self::Pointer { kind, ptr } => write!(f, "{kind}@{ptr:x}"),
            Self::Fresh { kind, seq } => write!(f, "{seq}={kind}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    /// Being mapped further up the stack. Kind mappers record the summary they
    /// will return before recursing so back-references can use it.
    InProgress { summary: Option<String> },
    Done { node: NodeId, summary: String },
}

#[derive(Debug)]
pub struct Registry {
    ids: HashMap<IdentityKey, NodeId>,
    entries: HashMap<IdentityKey, Entry>,
    next_fresh: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        let mut ids = HashMap::new();
        ids.insert(IdentityKey::Nil, NodeId::NIL);

        let mut entries = HashMap::new();
        entries.insert(
            IdentityKey::Nil,
            Entry::Done {
                node: NodeId::NIL,
                summary: NIL_SUMMARY.to_string(),
            },
        );

        Self {
            ids,
            entries,
            next_fresh: 0,
        }
    }

    pub fn key_for(&mut self, value: ValueRef<'_>, heap: &Heap) -> IdentityKey {
        let kind = value.value().kind();

        if value.is_addressable() {
            return IdentityKey::Addressed {
                kind,
                addr: value.address(),
                type_name: value.value().type_name().to_string(),
            };
        }

        if let Some(ptr) = reference_pointer(value.value(), heap).filter(|ptr| *ptr != 0) {
            return IdentityKey::Pointer { kind, ptr };
        }

        self.next_fresh += 1;
        IdentityKey::Fresh {
            kind,
            seq: self.next_fresh,
        }
    }

    /// Id for `key`, assigned in first-request order.
    pub fn node_id(&mut self, key: &IdentityKey) -> NodeId {
        if let Some(id) = self.ids.get(key) {
            return *id;
        }

        let id = NodeId(self.ids.len());
        self.ids.insert(key.clone(), id);
        id
    }

    pub fn lookup(&self, key: &IdentityKey) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn reserve(&mut self, key: IdentityKey) {
        self.entries.insert(key, Entry::InProgress { summary: None });
    }

    /// Records the summary of a value still in progress.
    pub fn describe(&mut self, key: &IdentityKey, text: impl Into<String>) {
        if let Some(Entry::InProgress { summary }) = self.entries.get_mut(key) {
            *summary = Some(text.into());
        }
    }

    pub fn resolve(&mut self, key: IdentityKey, node: NodeId, summary: impl Into<String>) {
        self.entries.insert(
            key,
            Entry::Done {
                node,
                summary: summary.into(),
            },
        );
    }

    pub fn is_in_progress(&self, key: &IdentityKey) -> bool {
        matches!(self.entries.get(key), Some(Entry::InProgress { .. }))
    }

    /// In progress with nothing recorded yet.
    pub(crate) fn is_undescribed(&self, key: &IdentityKey) -> bool {
        matches!(
            self.entries.get(key),
            Some(Entry::InProgress { summary: None })
        )
    }

    pub fn assigned_ids(&self) -> usize {
        self.ids.len()
    }
}

/// Address shared by every copy of a reference-like value: pointer target, slice
/// or map storage, callable entry, channel state.
fn reference_pointer(value: &Value, heap: &Heap) -> Option<usize> {
    match value {
        Value::Pointer {
            target: Some(slot), ..
        } => heap.address_of(*slot),
        Value::Sequence {
            shape: SequenceShape::Slice,
            items,
            ..
        } if !items.is_empty() => Some(items.as_ptr() as usize),
        Value::Map { entries, .. } if !entries.is_empty() => Some(entries.as_ptr() as usize),
        Value::Callable {
            target: Some(symbol),
            ..
        } => Some(symbol.entry),
        Value::Channel {
            state: Some(state), ..
        } => Some(Rc::as_ptr(state) as usize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Field;

    #[test]
    fn same_memory_same_key() {
        let mut heap = Heap::new();
        let slot = heap.alloc(Value::int(5));
        let value = heap.get(slot).expect("allocated");
        let mut registry = Registry::new();

        let first = registry.key_for(ValueRef::addressable(value), &heap);
        let second = registry.key_for(ValueRef::addressable(value), &heap);
        assert_eq!(first, second);
        assert_eq!(registry.node_id(&first), registry.node_id(&second));
    }

    #[test]
    fn record_and_first_field_differ() {
        let mut heap = Heap::new();
        let slot = heap.alloc(Value::record(
            "demo.Wrapper",
            [Field::new("Inner", "int", Value::int(1))],
        ));
        let record = ValueRef::addressable(heap.get(slot).expect("allocated"));
        let Value::Record { fields, .. } = record.value() else {
            panic!("record expected");
        };
        let mut registry = Registry::new();

        let outer = registry.key_for(record, &heap);
        let inner = registry.key_for(record.inner(&fields[0].value), &heap);
        assert_ne!(outer, inner);
    }

    #[test]
    fn pointers_to_one_slot_share_identity() {
        let mut heap = Heap::new();
        let slot = heap.alloc(Value::int(5));
        let a = Value::pointer("*int", slot);
        let b = Value::pointer("*int", slot);
        let mut registry = Registry::new();

        assert_eq!(
            registry.key_for(ValueRef::temporary(&a), &heap),
            registry.key_for(ValueRef::temporary(&b), &heap)
        );
    }

    #[test]
    fn temporaries_are_always_fresh() {
        let heap = Heap::new();
        let value = Value::int(5);
        let mut registry = Registry::new();

        let first = registry.key_for(ValueRef::temporary(&value), &heap);
        let second = registry.key_for(ValueRef::temporary(&value), &heap);
        assert_ne!(first, second);
        assert!(matches!(first, IdentityKey::Fresh { kind: Kind::Int, .. }));
    }

    #[test]
    fn nil_is_preassigned_and_entries_progress() {
        let mut registry = Registry::new();
        assert_eq!(registry.node_id(&IdentityKey::Nil), NodeId::NIL);
        assert!(matches!(
            registry.lookup(&IdentityKey::Nil),
            Some(Entry::Done { summary, .. }) if summary == NIL_SUMMARY
        ));

        let key = IdentityKey::Fresh { kind: Kind::Struct, seq: 99 };
        registry.reserve(key.clone());
        assert!(registry.is_in_progress(&key));
        assert!(registry.is_undescribed(&key));

        registry.describe(&key, "demo.Node");
        assert!(!registry.is_undescribed(&key));

        let id = registry.node_id(&key);
        assert_eq!(id, NodeId(1));
        registry.resolve(key.clone(), id, "demo.Node");
        assert!(!registry.is_in_progress(&key));
    }
}
