use super::{Value, ValueRef};

/// Handle to a heap cell. Cells are the addressable memory of a value graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Slot(usize);

impl Slot {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Arena owning every addressable value a pointer can refer to.
///
/// Pointers store a [`Slot`] instead of a reference, which lets a graph refer to
/// itself: reserve a slot, build a value pointing at it, then store the value.
#[derive(Debug, Default)]
pub struct Heap {
    cells: Vec<Value>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, value: Value) -> Slot {
        self.cells.push(value);
        Slot(self.cells.len() - 1)
    }

    /// Allocates a cell holding a nil interface, to be filled later with [`Heap::store`].
    pub fn reserve(&mut self) -> Slot {
        self.alloc(Value::nil())
    }

    pub fn store(&mut self, slot: Slot, value: Value) {
        if let Some(cell) = self.cells.get_mut(slot.0) {
            *cell = value;
        }
    }

    pub fn get(&self, slot: Slot) -> Option<&Value> {
        self.cells.get(slot.0)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Follows one level of indirection. Pointer targets are addressable, interface
    /// contents are not.
    pub fn pointee<'h>(&'h self, value: &'h Value) -> Option<ValueRef<'h>> {
        match value {
            Value::Pointer { target, .. } => target
                .and_then(|slot| self.get(slot))
                .map(ValueRef::addressable),
            Value::Interface { inner, .. } => inner.as_deref().map(ValueRef::temporary),
            _ => None,
        }
    }

    pub(crate) fn address_of(&self, slot: Slot) -> Option<usize> {
        self.get(slot).map(|value| value as *const Value as usize)
    }
}
