use std::fs;

use memgraph::mapper::{Root, map_roots};
use memgraph::render::{DotWriter, ProcessInfo, to_dot};
use memgraph::settings::OPTIONS_FILE_NAME;
use memgraph::value::{Field, Heap, Value};
use memgraph::Settings;

fn linked_pair(heap: &mut Heap) -> memgraph::value::Slot {
    let first = heap.reserve();
    let second = heap.alloc(Value::record(
        "demo.Node",
        [
            Field::new("Name", "string", Value::string("grace")),
            Field::new("Next", "*demo.Node", Value::pointer("*demo.Node", first)),
        ],
    ));
    heap.store(
        first,
        Value::record(
            "demo.Node",
            [
                Field::new("Name", "string", Value::string("ada")),
                Field::new("Next", "*demo.Node", Value::pointer("*demo.Node", second)),
            ],
        ),
    );
    first
}

#[test]
fn mapped_graph_renders_as_dot() {
    let mut heap = Heap::new();
    let root = linked_pair(&mut heap);
    let settings = Settings {
        suppress_header: true,
        suppress_info: true,
        ..Settings::default()
    };

    let graph = map_roots(&heap, &settings, &[Root::Slot(root)], Some("pair")).expect("maps");
    let dot = to_dot(&graph, &settings);

    assert!(dot.starts_with("digraph \"memgraph\" {"));
    assert!(dot.contains("\tlabel=\"pair\""));
    assert!(dot.contains("\tbgcolor=\"transparent\""));
    assert!(dot.contains("\t\tfontname=\"Cascadia Code\""));
    assert_eq!(dot.matches("[shape=plaintext").count(), 2);
    assert!(dot.contains("\tNode_1:o1:e\t-> Node_2:name:w [color=\"red\" tooltip=\"Next\"];"));
    assert!(dot.contains("\tNode_2:o1:e\t-> Node_1:name:w [color=\"red\" tooltip=\"Next\"];"));
    assert!(dot.contains("TITLE=\"grace\">\"grace\"</TD>"));
    assert!(!dot.contains("/* ------ info ------ */"));
}

#[test]
fn info_table_lists_process_facts() {
    let heap = Heap::new();
    let settings = Settings::default();
    let graph = map_roots(&heap, &settings, &[], Some("empty")).expect("maps");

    let dot = DotWriter::new(&settings)
        .with_info(ProcessInfo::collect(graph.caption.as_deref()))
        .render(&graph);

    assert!(dot.contains("/* ------ info ------ */"));
    assert!(dot.contains(">Information</TD>"));
    assert!(dot.contains("TITLE=\"comment\">comment</TD>"));
    assert!(dot.contains("TITLE=\"empty\">empty</TD>"));
}

#[test]
fn options_file_drives_styling() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(OPTIONS_FILE_NAME);
    fs::write(
        &path,
        r#"{
            "suppressHeader": true,
            "suppresInfo": true,
            "colorBackground": "none",
            "fontName": "Iosevka",
            "colors": { "struct: demo.Node": "gold" },
            "connectors": { "pointer": { "color": "purple" } }
        }"#,
    )
    .expect("write options");

    let settings = Settings::load_from(&path).expect("options load");
    assert_eq!(settings.loaded_from.as_deref(), Some(path.as_path()));

    let mut heap = Heap::new();
    let root = linked_pair(&mut heap);
    let graph = map_roots(&heap, &settings, &[Root::Slot(root)], None).expect("maps");
    let dot = to_dot(&graph, &settings);

    assert!(!dot.starts_with("/*"));
    assert!(dot.contains("\tbgcolor=\"transparent\""));
    assert!(dot.contains("\t\tfontname=\"Iosevka\""));
    assert!(dot.contains("PORT=\"name\" BGCOLOR=\"gold\""));
    assert!(dot.contains("[color=\"purple\" tooltip=\"Next\"]"));
}
