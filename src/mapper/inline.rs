use crate::value::{Heap, SequenceShape, Value};

/// Recursion cap for emptiness checks, which do not consult the identity registry.
const EMPTINESS_GUARD: usize = 100;

/// Whether a child's text can be folded into its parent's row.
pub fn is_inlinable(heap: &Heap, value: &Value) -> bool {
    if value.is_zero() {
        return true;
    }

    match value {
        Value::Interface { .. } => heap
            .pointee(value)
            .is_none_or(|inner| is_inlinable(heap, inner.value())),
        Value::Pointer { .. }
        | Value::Channel { .. }
        | Value::Callable { .. }
        | Value::Record { .. }
        | Value::Map { .. } => false,
        Value::Sequence { items, .. } => items.is_empty(),
        Value::Scalar(_) | Value::Opaque { .. } => true,
    }
}

/// Whether a value carries nothing worth drawing, looking through indirections.
pub fn is_empty(heap: &Heap, value: &Value) -> bool {
    is_empty_guarded(heap, value, 0)
}

fn is_empty_guarded(heap: &Heap, value: &Value, guard: usize) -> bool {
    if guard > EMPTINESS_GUARD {
        return false;
    }

    match value {
        Value::Pointer { .. } | Value::Interface { .. } => match heap.pointee(value) {
            Some(pointee) => is_empty_guarded(heap, pointee.value(), guard + 1),
            None => true,
        },
        Value::Record { fields, .. } => fields
            .iter()
            .all(|field| is_empty_guarded(heap, &field.value, guard + 1)),
        Value::Sequence {
            shape: SequenceShape::Array,
            items,
            ..
        } => items.is_empty() || value.is_zero(),
        Value::Sequence { items, .. } => items.is_empty(),
        Value::Map { entries, .. } => entries.is_empty(),
        Value::Scalar(_)
        | Value::Callable { .. }
        | Value::Channel { .. }
        | Value::Opaque { .. } => value.is_zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Field;

    #[test]
    fn zero_values_always_inline() {
        let heap = Heap::new();
        assert!(is_inlinable(&heap, &Value::nil_pointer("*demo.Node")));
        assert!(is_inlinable(&heap, &Value::record("demo.Empty", [])));
        assert!(is_inlinable(&heap, &Value::int(0)));
    }

    #[test]
    fn structured_values_get_their_own_node() {
        let mut heap = Heap::new();
        let slot = heap.alloc(Value::int(1));

        assert!(!is_inlinable(&heap, &Value::pointer("*int", slot)));
        let map = Value::map("map[string]int", [(Value::string("a"), Value::int(1))]);
        assert!(!is_inlinable(&heap, &map));
        assert!(!is_inlinable(&heap, &Value::slice("[]int", [Value::int(1)])));
        assert!(is_inlinable(&heap, &Value::int(9)));
    }

    #[test]
    fn interfaces_defer_to_their_content() {
        let heap = Heap::new();
        let boxed_int = Value::interface("any", Some(Value::int(3)));
        let boxed_record = Value::interface(
            "any",
            Some(Value::record("demo.Pair", [Field::new("A", "int", Value::int(1))])),
        );

        assert!(is_inlinable(&heap, &boxed_int));
        assert!(!is_inlinable(&heap, &boxed_record));
    }

    #[test]
    fn emptiness_looks_through_pointers() {
        let mut heap = Heap::new();
        let empty = heap.alloc(Value::record(
            "demo.Empty",
            [Field::new("A", "int", Value::int(0))],
        ));
        let full = heap.alloc(Value::record("demo.Full", [Field::new("A", "int", Value::int(1))]));

        assert!(is_empty(&heap, &Value::pointer("*demo.Empty", empty)));
        assert!(!is_empty(&heap, &Value::pointer("*demo.Full", full)));
        assert!(is_empty(&heap, &Value::nil()));
    }

    #[test]
    fn emptiness_terminates_on_cycles() {
        let mut heap = Heap::new();
        let slot = heap.reserve();
        heap.store(
            slot,
            Value::record(
                "demo.Loop",
                [Field::new("Next", "*demo.Loop", Value::pointer("*demo.Loop", slot))],
            ),
        );

        let looped = heap.get(slot).expect("allocated");
        assert!(!is_empty(&heap, looped));
    }
}
