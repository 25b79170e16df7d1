//! A small built-in object graph, handy for trying out settings and styles.

use std::rc::Rc;

use crate::value::{ChanDir, ChannelState, Field, Heap, Slot, Symbol, Value};

pub struct Demo {
    pub heap: Heap,
    pub roots: Vec<Slot>,
}

/// Two people who refer to each other, a team holding both, and a registry with
/// a callback and a work queue.
pub fn build() -> Demo {
    let mut heap = Heap::new();

    let ada = heap.reserve();
    let grace = heap.reserve();

    heap.store(ada, person("ada", 36, grace));
    heap.store(grace, person("grace", 85, ada));

    let team = heap.alloc(Value::record(
        "demo.Team",
        [
            Field::new("Title", "string", Value::string("compilers")),
            Field::new(
                "Members",
                "[]*demo.Person",
                Value::slice(
                    "[]*demo.Person",
                    [
                        Value::pointer("*demo.Person", ada),
                        Value::pointer("*demo.Person", grace),
                        Value::nil_pointer("*demo.Person"),
                    ],
                ),
            ),
            Field::new("Budget", "uint64", Value::typed_uint("uint64", 250_000)),
            Field::new("Archived", "bool", Value::bool(false)),
        ],
    ));

    let registry = heap.alloc(Value::record(
        "demo.Registry",
        [
            Field::new(
                "Teams",
                "map[string]*demo.Team",
                Value::map(
                    "map[string]*demo.Team",
                    [(Value::string("core"), Value::pointer("*demo.Team", team))],
                ),
            ),
            Field::new(
                "OnChange",
                "func(string)",
                Value::callable(
                    "func(string)",
                    Some(Symbol {
                        name: "demo.(*Registry).notify".to_string(),
                        file: "demo/registry.go".to_string(),
                        line: 42,
                        entry: 0x4a_1f20,
                    }),
                ),
            ),
            Field::new(
                "Queue",
                "chan demo.Job",
                Value::channel(
                    "chan demo.Job",
                    ChanDir::Both,
                    Some(Rc::new(ChannelState { len: 3, cap: 16 })),
                ),
            ),
            Field::new("Owner", "*demo.Person", Value::pointer("*demo.Person", ada)),
            Field::new("Tags", "[]string", Value::slice("[]string", [])),
        ],
    ));

    Demo {
        heap,
        roots: vec![registry, team],
    }
}

fn person(name: &str, age: i64, friend: Slot) -> Value {
    Value::record(
        "demo.Person",
        [
            Field::new("Name", "string", Value::string(name)),
            Field::new("Age", "int", Value::int(age)),
            Field::new("Friend", "*demo.Person", Value::pointer("*demo.Person", friend)),
            Field::new("Nickname", "string", Value::string("")),
        ],
    )
}
